//! Scripted transport.
//!
//! Answers requests from a queue of canned results, in order, and records
//! every request it was asked to send. Lets the state machine be exercised
//! without a server.

use super::{HttpResponse, Transport, TransportError};
use crate::app::PendingRequest;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug)]
struct Reply {
    result: Result<HttpResponse, TransportError>,
    delay: Duration,
}

/// Transport that replays queued results.
///
/// # Examples
///
/// ```
/// use shopping_session::transport::{HttpResponse, ScriptedTransport};
///
/// let transport = ScriptedTransport::new();
/// transport.push(HttpResponse::ok(r#"{"token":"T"}"#));
/// transport.push(HttpResponse::ok("[]"));
/// assert_eq!(transport.remaining(), 2);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    sent: Mutex<Vec<PendingRequest>>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response delivered immediately.
    pub fn push(&self, response: HttpResponse) {
        self.push_delayed(response, Duration::ZERO);
    }

    /// Queues a response delivered after `delay`.
    pub fn push_delayed(&self, response: HttpResponse, delay: Duration) {
        self.enqueue(Ok(response), delay);
    }

    /// Queues a transport failure.
    pub fn push_failure(&self, reason: impl Into<String>) {
        self.enqueue(Err(TransportError(reason.into())), Duration::ZERO);
    }

    fn enqueue(&self, result: Result<HttpResponse, TransportError>, delay: Duration) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Reply { result, delay });
        }
    }

    /// Requests sent so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<PendingRequest> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    /// Number of queued results not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.replies
            .lock()
            .map(|replies| replies.len())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &PendingRequest) -> Result<HttpResponse, TransportError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(request.clone());
        }

        let reply = self
            .replies
            .lock()
            .map_err(|e| TransportError(format!("script lock poisoned: {e}")))?
            .pop_front();

        let Some(reply) = reply else {
            return Err(TransportError(format!(
                "no scripted reply for {} {}",
                request.method, request.path
            )));
        };

        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result
    }
}
