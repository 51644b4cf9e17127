//! Request descriptors produced by the dispatcher.
//!
//! A [`PendingRequest`] is everything needed to perform one HTTP exchange plus
//! the [`ActionTag`] that tells the response handler how to interpret the
//! answer. Requests are plain data: building one has no effect until a
//! [`Session`](crate::Session) installs it.
//!
//! # Example
//!
//! ```rust
//! use shopping_session::app::{ActionTag, Method, PendingRequest};
//!
//! let request = PendingRequest::new(ActionTag::List, Method::Get, "/api/shopping")
//!     .with_header("token", "T");
//! assert_eq!(request.header("token"), Some("T"));
//! assert!(request.body.is_none());
//! ```

use std::fmt;

/// Which server operation a request represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionTag {
    List,
    Add,
    Remove,
    Edit,
    Register,
    Login,
    Logout,
    /// Placeholder carried by the idle request installed at startup.
    None,
}

impl ActionTag {
    /// Whether the request carries the session token.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        !matches!(self, Self::Register | Self::Login | Self::None)
    }
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::List => "list",
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Edit => "edit",
            Self::Register => "register",
            Self::Login => "login",
            Self::Logout => "logout",
            Self::None => "none",
        };
        f.write_str(name)
    }
}

/// HTTP methods used by the shopping API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request descriptor paired with its action tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    /// How the response is interpreted.
    pub tag: ActionTag,
    pub method: Method,
    /// Path relative to the API base URL, starting with `/`.
    pub path: String,
    /// Header name/value pairs in insertion order.
    pub headers: Vec<(String, String)>,
    /// JSON-encoded body, if any.
    pub body: Option<String>,
}

impl PendingRequest {
    /// Creates a request with no headers and no body.
    pub fn new(tag: ActionTag, method: Method, path: impl Into<String>) -> Self {
        Self {
            tag,
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// The request installed before any intent has been dispatched.
    ///
    /// Settling it is a no-op.
    #[must_use]
    pub fn idle() -> Self {
        Self::new(ActionTag::None, Method::Get, "")
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    /// Looks up a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let request = PendingRequest::new(ActionTag::Add, Method::Post, "/api/shopping")
            .with_header("Content-Type", "application/json");
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("token"), None);
    }

    #[test]
    fn only_account_calls_skip_the_token() {
        assert!(ActionTag::List.is_authenticated());
        assert!(ActionTag::Logout.is_authenticated());
        assert!(!ActionTag::Login.is_authenticated());
        assert!(!ActionTag::Register.is_authenticated());
        assert!(!ActionTag::None.is_authenticated());
    }
}
