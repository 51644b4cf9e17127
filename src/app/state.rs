//! Session state record.
//!
//! This module defines [`AppState`], the single client-observable record of the
//! session, and [`Outcome`], the tagged message slot that tells the front end
//! what the last request produced. The front end renders purely from these
//! fields; nothing outside the store and the response handler writes them.
//!
//! # Persisted Shape
//!
//! ```json
//! {
//!   "list": [{ "_id": "a1", "type": "milk", "count": 2, "price": 1.25 }],
//!   "isLogged": true,
//!   "token": "T",
//!   "loading": false,
//!   "outcome": { "kind": "failed", "message": "Username already in use" },
//!   "user": "alice"
//! }
//! ```

use crate::domain::ShoppingItem;
use serde::{Deserialize, Serialize};

/// What the most recent request left for the user to read.
///
/// Keeps "the registration went through" and "a request failed" apart; both
/// used to travel in the same error string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Outcome {
    /// Nothing to report.
    #[default]
    Idle,
    /// Informational message, e.g. a completed registration.
    Succeeded(String),
    /// Failure reason shown to the user.
    Failed(String),
}

impl Outcome {
    /// Text carried by the outcome, or `""` when idle.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Idle => "",
            Self::Succeeded(message) | Self::Failed(message) => message,
        }
    }
}

/// The complete client-side session record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Shopping list exactly as the server last returned it.
    #[serde(default)]
    pub list: Vec<ShoppingItem>,

    /// Whether a login has succeeded and not been undone.
    #[serde(default)]
    pub is_logged: bool,

    /// Session token sent in the `token` header, empty when logged out.
    #[serde(default)]
    pub token: String,

    /// True while a request is in flight.
    #[serde(default)]
    pub loading: bool,

    /// Result message of the last settled request.
    #[serde(default)]
    pub outcome: Outcome,

    /// Display name of the (attempted) logged-in user.
    #[serde(default)]
    pub user: String,
}

impl AppState {
    /// The logged-out default record carrying the given outcome.
    ///
    /// Used for explicit logout and for every forced session reset.
    ///
    /// # Examples
    ///
    /// ```
    /// use shopping_session::{AppState, Outcome};
    ///
    /// let state = AppState::logged_out(Outcome::Failed("bye".to_string()));
    /// assert!(!state.is_logged);
    /// assert!(state.token.is_empty());
    /// assert_eq!(state.error(), Some("bye"));
    /// ```
    #[must_use]
    pub fn logged_out(outcome: Outcome) -> Self {
        Self {
            outcome,
            ..Self::default()
        }
    }

    /// Failure reason, if the last request failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Informational message, if the last request reported one.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Succeeded(message) => Some(message),
            _ => None,
        }
    }

    /// Whatever message is pending, or `""`.
    #[must_use]
    pub fn message(&self) -> &str {
        self.outcome.message()
    }

    /// Sum of all line totals in the list.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.list.iter().map(ShoppingItem::total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_front_end_field_names() {
        let state = AppState {
            is_logged: true,
            token: "T".to_string(),
            outcome: Outcome::Succeeded("Register success".to_string()),
            ..AppState::default()
        };

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["isLogged"], true);
        assert_eq!(json["outcome"]["kind"], "succeeded");
        assert_eq!(json["outcome"]["message"], "Register success");
    }

    #[test]
    fn outcome_accessors_keep_channels_apart() {
        let failed = AppState::logged_out(Outcome::Failed("nope".to_string()));
        assert_eq!(failed.error(), Some("nope"));
        assert_eq!(failed.notice(), None);

        let done = AppState::logged_out(Outcome::Succeeded("ok".to_string()));
        assert_eq!(done.error(), None);
        assert_eq!(done.message(), "ok");

        assert_eq!(AppState::default().message(), "");
    }

    #[test]
    fn total_sums_line_totals() {
        let state = AppState {
            list: vec![ShoppingItem::new("a", 2, 1.5), ShoppingItem::new("b", 1, 4.0)],
            ..AppState::default()
        };
        assert!((state.total() - 7.0).abs() < 1e-9);
    }
}
