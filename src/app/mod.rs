//! Application layer: state, requests and transitions.
//!
//! This module holds the request/response state machine of the session core,
//! sitting between the front end and the storage/transport layers.
//!
//! # Architecture
//!
//! ```text
//! Intent → RequestDispatcher → PendingRequest → Session (transport.send)
//!                                                   │
//!            StateStore ◄── handle_settlement ◄─────┘
//!                │                 │
//!            Storage::save     cascade list(token)
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Request descriptors and action tags
//! - [`dispatcher`]: One request builder per user intent
//! - [`handler`]: Transition logic applied when a request settles
//! - [`state`]: The session state record and its outcome slot
//! - [`store`]: State owner with write-through persistence

pub mod actions;
pub mod dispatcher;
pub mod handler;
pub mod state;
pub mod store;

pub use actions::{ActionTag, Method, PendingRequest};
pub use dispatcher::RequestDispatcher;
pub use handler::{handle_settlement, Settlement};
pub use state::{AppState, Outcome};
pub use store::StateStore;
