//! JSON file-based session storage.
//!
//! One file per session holds a small versioned key/value document. Writes go
//! to a temporary file first and are renamed into place, so a crash never
//! leaves a half-written snapshot behind.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "entries": {
//!     "state": {
//!       "list": [],
//!       "isLogged": false,
//!       "token": "",
//!       "loading": false,
//!       "outcome": { "kind": "idle" },
//!       "user": ""
//!     }
//!   }
//! }
//! ```

use crate::app::AppState;
use crate::domain::error::{Result, SessionError};
use crate::storage::backend::{Storage, STATE_KEY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Current on-disk format version.
const FORMAT_VERSION: u32 = 1;

/// Top-level document written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    /// Version of the storage format for future migrations.
    version: u32,

    /// Stored values by key.
    #[serde(default)]
    entries: BTreeMap<String, serde_json::Value>,
}

impl Default for SessionFile {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

/// Session store backed by a JSON file.
///
/// The document is loaded once on creation and kept in memory; every `save`
/// rewrites the whole file.
#[derive(Debug)]
pub struct JsonSessionStorage {
    file_path: PathBuf,
    data: SessionFile,
}

impl JsonSessionStorage {
    /// Opens the session file, creating parent directories as needed.
    ///
    /// A missing file is an empty session.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory creation fails
    /// - The file exists but contains invalid JSON
    /// - File permissions prevent reading
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use shopping_session::storage::JsonSessionStorage;
    /// use std::path::PathBuf;
    ///
    /// let storage = JsonSessionStorage::open(PathBuf::from("/tmp/shopping/session-1.json"))?;
    /// # Ok::<(), shopping_session::SessionError>(())
    /// ```
    pub fn open(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "opening session storage");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = if file_path.exists() {
            Self::read_file(&file_path)?
        } else {
            tracing::debug!("no session file yet, starting empty");
            SessionFile::default()
        };

        Ok(Self { file_path, data })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn read_file(path: &Path) -> Result<SessionFile> {
        let contents = std::fs::read_to_string(path)?;
        let data: SessionFile = serde_json::from_str(&contents)
            .map_err(|e| SessionError::Storage(format!("failed to parse session file: {e}")))?;

        if data.version != FORMAT_VERSION {
            return Err(SessionError::Storage(format!(
                "unsupported session file version {}",
                data.version
            )));
        }

        tracing::debug!(entries = data.entries.len(), "loaded session file");
        Ok(data)
    }

    fn write_file(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.data)
            .map_err(|e| SessionError::Storage(format!("failed to serialize session file: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.file_path)?;

        tracing::trace!(path = ?self.file_path, "session file written");
        Ok(())
    }
}

impl Storage for JsonSessionStorage {
    fn save(&mut self, state: &AppState) -> Result<()> {
        let _span =
            tracing::debug_span!("json_save_state", items = state.list.len()).entered();

        let value = serde_json::to_value(state)
            .map_err(|e| SessionError::Storage(format!("failed to serialize state: {e}")))?;
        self.data.entries.insert(STATE_KEY.to_string(), value);
        self.write_file()
    }

    fn load(&self) -> Result<Option<AppState>> {
        self.data
            .entries
            .get(STATE_KEY)
            .map(|value| {
                serde_json::from_value(value.clone())
                    .map_err(|e| SessionError::Storage(format!("stored state is malformed: {e}")))
            })
            .transpose()
    }
}
