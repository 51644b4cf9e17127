//! Infrastructure layer for filesystem and environment interactions.
//!
//! Resolves where session state and logs are kept and which session the
//! current process belongs to.

pub mod paths;

pub use paths::{default_session_id, expand_tilde, get_data_dir, session_file, SESSION_ENV};
