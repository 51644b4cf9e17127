//! Structured logging to a rotating file.
//!
//! Every transition of the session core emits `tracing` events and spans.
//! This module wires them to a `tracing-subscriber` fmt layer that writes to a
//! size-rotated log file in the data directory, keeping stdout free for the
//! command-line front end.
//!
//! ```text
//! tracing macros → EnvFilter → fmt layer → LogWriter → FileWriter → shopping-session.log
//! ```
//!
//! # Configuration
//!
//! Level is controlled via:
//! 1. `RUST_LOG` environment variable (highest priority)
//! 2. `trace_level` config option
//! 3. Default: `"info"`
//!
//! # Modules
//!
//! - `init`: Subscriber setup
//! - `file_writer`: Rotating file writer with size-based rotation

mod file_writer;
mod init;

pub use init::{init_tracing, LOG_FILE_NAME};
