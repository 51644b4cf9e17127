//! HTTP transport built on reqwest.

use super::{HttpResponse, Transport, TransportError};
use crate::app::{Method, PendingRequest};
use crate::domain::error::{Result, SessionError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Sends pending requests to a server rooted at `base_url`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    base_url: String,
}

impl HttpTransport {
    /// Creates a transport with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Http`] if the client cannot be built, or
    /// [`SessionError::Config`] if `base_url` is empty.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(SessionError::Config("base_url must not be empty".to_string()));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SessionError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { http, base_url })
    }

    /// Full URL for a request path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &PendingRequest,
    ) -> std::result::Result<HttpResponse, TransportError> {
        let url = self.url(&request.path);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        tracing::debug!(
            method = %request.method,
            url = %url,
            tag = %request.tag,
            "sending request"
        );

        let mut builder = self.http.request(method, &url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError(format!("{} {url}: {e}", request.method)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(format!("failed to read response body from {url}: {e}")))?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "response received");

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}
