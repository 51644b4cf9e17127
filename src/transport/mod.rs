//! Network transport for pending requests.
//!
//! The session core never talks to the network directly; it hands each
//! [`PendingRequest`] to a [`Transport`] and awaits the result. That await is
//! the only suspension point of the whole request protocol.
//!
//! # Modules
//!
//! - [`http`]: reqwest-backed transport against a base URL
//! - [`scripted`]: canned responses and a request log, for tests and demos

pub mod http;
pub mod scripted;

pub use http::HttpTransport;
pub use scripted::ScriptedTransport;

use crate::app::PendingRequest;
use async_trait::async_trait;
use thiserror::Error;

/// A response as far as the state machine cares about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase, e.g. "Not Found".
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    /// A `200 OK` carrying `body`.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, "OK", body)
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// No response could be obtained.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

/// Performs one HTTP exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and waits for the complete response.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response was received at all
    /// (connection refused, DNS failure, timeout, unreadable body). Any HTTP
    /// status, including 4xx and 5xx, is a successful exchange.
    async fn send(&self, request: &PendingRequest) -> Result<HttpResponse, TransportError>;
}
