//! Error types for the shopping session core.
//!
//! This module defines the centralized error type [`SessionError`] and a type alias
//! [`Result`] used throughout the crate. Errors here are *local* failures only:
//! anything the server says (403, 409, other non-2xx, no response at all) is
//! recorded in [`AppState`](crate::app::AppState) as an outcome instead.

use thiserror::Error;

/// The main error type for session operations.
///
/// Variants cover the failures a caller can actually act on: the session store
/// could not be read or written, an intent was given unusable input, or the
/// configuration or HTTP client could not be set up.
///
/// # Examples
///
/// ```
/// use shopping_session::SessionError;
///
/// fn validate_type(item_type: &str) -> Result<(), SessionError> {
///     if item_type.trim().is_empty() {
///         return Err(SessionError::InvalidItem("type must not be empty".to_string()));
///     }
///     Ok(())
/// }
///
/// assert!(validate_type("").is_err());
/// ```
#[derive(Debug, Error)]
pub enum SessionError {
    /// Session store operation failed.
    ///
    /// Occurs when the persisted state cannot be serialized, parsed, or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An item handed to `add` or `edit` (or an id handed to `remove`) is unusable.
    ///
    /// Raised before any request is installed, so the session state is untouched.
    #[error("Invalid item: {0}")]
    InvalidItem(String),

    /// Configuration is invalid or could not be read.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The HTTP client could not be constructed or a request could not be built.
    #[error("HTTP client error: {0}")]
    Http(String),
}

/// A specialized `Result` type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
