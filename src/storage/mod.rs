//! Storage layer for the session-scoped state snapshot.
//!
//! # Modules
//!
//! - `backend`: Storage trait abstraction for backend implementations
//! - `json`: JSON file per session, written atomically
//! - `memory`: In-process map for tests and embedding

pub mod backend;
pub mod json;
pub mod memory;

pub use backend::{Storage, STATE_KEY};
pub use json::JsonSessionStorage;
pub use memory::MemoryStorage;
