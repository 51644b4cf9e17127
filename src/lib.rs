//! shopping-session: session and list-synchronization core for an
//! authenticated shopping list client.
//!
//! The crate owns one piece of client state, turns user intents into HTTP
//! requests, interprets the server's answers as state transitions, and keeps
//! the state in a session-scoped store so it survives restarts within a
//! session:
//! - Register, log in and log out against the server
//! - List, add, edit and remove shopping items
//! - Refetch the list after every accepted change, so the server stays the only source of truth
//! - Reset the session whenever the server reports an expired token (403)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Command-line front end (main.rs)                   │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Session (session.rs)                               │  ← Request protocol
//! │  - Sequence numbers, loading flag, cascades         │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← State machine
//! │  - Request dispatcher                               │
//! │  - Response handler                                 │
//! │  - State store                                      │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Domain        │   │ Storage Layer │   │ Transport     │
//! │ (domain/)     │   │ (storage/)    │   │ (transport/)  │
//! │ - Item, User  │   │ - JSON file   │   │ - reqwest     │
//! │ - Errors      │   │ - In-memory   │   │ - Scripted    │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure & Observability                     │
//! │  - Session paths (infrastructure/)                  │
//! │  - Rotating log file (observability/)               │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Configuration
//!
//! ```toml
//! # shopping-session.toml
//! base_url = "http://localhost:3000"
//! session_id = "work"
//! state_dir = "~/.cache/shopping-session"
//! trace_level = "debug"
//! request_timeout_secs = 10
//! ```
//!
//! # Example
//!
//! ```rust
//! use shopping_session::storage::MemoryStorage;
//! use shopping_session::transport::{HttpResponse, ScriptedTransport};
//! use shopping_session::{Session, ShoppingItem};
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
//! # rt.block_on(async {
//! let transport = ScriptedTransport::new();
//! transport.push(HttpResponse::new(201, "Created", ""));
//! transport.push(HttpResponse::ok(r#"[{"_id":"1","type":"milk","count":2,"price":1.25}]"#));
//!
//! let session = Session::new(Box::new(MemoryStorage::default()), transport)?;
//! session.add(&ShoppingItem::new("milk", 2, 1.25)).await?;
//!
//! assert_eq!(session.state()?.list[0].id, "1");
//! # Ok::<(), shopping_session::SessionError>(())
//! # }).unwrap();
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod observability;
pub mod session;
pub mod storage;
pub mod transport;

pub use app::{ActionTag, AppState, Outcome, PendingRequest};
pub use domain::{Credentials, Result, SessionError, ShoppingItem};
pub use session::Session;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root URL of the shopping API. Default: `http://localhost:3000`
    pub base_url: String,

    /// Session to attach to. Default: `SHOPPING_SESSION`, else the parent process id.
    pub session_id: Option<String>,

    /// Directory for session files and logs. Default: the runtime directory.
    ///
    /// A leading `~` is expanded.
    pub state_dir: Option<PathBuf>,

    /// Tracing filter, e.g. `debug` or `shopping_session=trace`. Default: `"info"`
    pub trace_level: Option<String>,

    /// Per-request timeout in seconds. Default: 30
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_id: None,
            state_dir: None,
            trace_level: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Parses configuration from a string map, e.g. environment-style settings.
    ///
    /// # Parsing Rules
    ///
    /// - `base_url`: trimmed; blank falls back to the default
    /// - `session_id`, `trace_level`: taken as-is when non-blank
    /// - `state_dir`: `~` expanded
    /// - `request_timeout_secs`: falls back to 30 on parse error or zero
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use shopping_session::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("base_url".to_string(), "https://shop.example ".to_string());
    /// map.insert("request_timeout_secs".to_string(), "nope".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.base_url, "https://shop.example");
    /// assert_eq!(config.request_timeout_secs, 30);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let non_blank = |key: &str| {
            map.get(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let request_timeout_secs = non_blank("request_timeout_secs")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            base_url: non_blank("base_url")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            session_id: non_blank("session_id"),
            state_dir: non_blank("state_dir")
                .map(|dir| PathBuf::from(infrastructure::expand_tilde(&dir))),
            trace_level: non_blank("trace_level"),
            request_timeout_secs,
        }
    }

    /// Reads a TOML configuration file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if the file cannot be read, or
    /// [`SessionError::Config`] if it is not valid TOML for this structure.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses TOML configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] on invalid TOML or a zero timeout.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(contents)
            .map_err(|e| SessionError::Config(format!("invalid configuration: {e}")))?;

        if config.request_timeout_secs == 0 {
            return Err(SessionError::Config("request_timeout_secs must be positive".to_string()));
        }
        config.state_dir = config
            .state_dir
            .map(|dir| PathBuf::from(infrastructure::expand_tilde(&dir.to_string_lossy())));
        Ok(config)
    }

    /// Directory holding session files and logs.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.state_dir
            .clone()
            .unwrap_or_else(infrastructure::get_data_dir)
    }

    /// File the current session's state is stored in.
    #[must_use]
    pub fn session_path(&self) -> PathBuf {
        let session_id = self
            .session_id
            .clone()
            .unwrap_or_else(infrastructure::default_session_id);
        infrastructure::session_file(&self.data_dir(), &session_id)
    }
}

/// Opens the session described by `config`.
///
/// Restores the session file if one exists, otherwise starts logged out, and
/// connects an HTTP transport to `base_url`.
///
/// # Errors
///
/// Returns an error if the session file cannot be opened or parsed, or the
/// HTTP client cannot be built.
pub fn initialize(config: &Config) -> Result<Session<transport::HttpTransport>> {
    let path = config.session_path();
    tracing::debug!(session_file = ?path, base_url = %config.base_url, "initializing session");

    let storage = storage::JsonSessionStorage::open(path)?;
    let transport = transport::HttpTransport::new(
        config.base_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?;

    Session::new(Box::new(storage), transport)
}
