//! Response handling and state transitions.
//!
//! This module is the state machine of the session core. Once the network
//! call of a request has settled, [`handle_settlement`] applies the transition
//! selected by (action tag × outcome) to the [`StateStore`] and returns the
//! cascade request, if the transition calls for one.
//!
//! # Transitions
//!
//! | Settlement    | Tag                 | Effect                                     |
//! |---------------|---------------------|--------------------------------------------|
//! | 2xx           | list                | replace list                               |
//! | 2xx           | add / remove / edit | cascade `list(token)`                      |
//! | 2xx           | register            | notice "Register success"                  |
//! | 2xx           | login               | logged in + token, cascade `list(token)`   |
//! | 2xx           | logout              | reset to logged-out default                |
//! | 403           | any                 | reset, "Your session has expired..."       |
//! | other non-2xx | logout              | reset, "Server responded with an error..." |
//! | other non-2xx | everything else     | error message (409 on register: taken)     |
//! | no response   | any                 | error "Server sent no response"            |
//!
//! Loading bookkeeping is left to the [`Session`](crate::Session), which knows
//! whether the settled request is still the latest one.

use crate::app::actions::{ActionTag, PendingRequest};
use crate::app::dispatcher::RequestDispatcher;
use crate::app::state::{AppState, Outcome};
use crate::app::store::StateStore;
use crate::domain::error::Result;
use crate::domain::ShoppingItem;
use crate::transport::{HttpResponse, TransportError};
use serde::Deserialize;

pub const REGISTER_SUCCESS: &str = "Register success";
pub const USERNAME_TAKEN: &str = "Username already in use";
pub const SESSION_EXPIRED: &str = "Your session has expired. Logging you out";
pub const LOGOUT_FAILED: &str = "Server responded with an error. Logging you out.";
pub const NO_RESPONSE: &str = "Server sent no response";
pub const UNREADABLE_RESPONSE: &str = "Server sent an unreadable response";

const STATUS_FORBIDDEN: u16 = 403;
const STATUS_CONFLICT: u16 = 409;

/// How a network call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// The server answered, with any status.
    Response(HttpResponse),
    /// No response could be obtained.
    NoResponse(TransportError),
}

impl Settlement {
    /// Whether this settlement reports an expired session.
    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::Response(response) if response.status == STATUS_FORBIDDEN)
    }
}

impl From<std::result::Result<HttpResponse, TransportError>> for Settlement {
    fn from(result: std::result::Result<HttpResponse, TransportError>) -> Self {
        match result {
            Ok(response) => Self::Response(response),
            Err(e) => Self::NoResponse(e),
        }
    }
}

#[derive(Deserialize)]
struct TokenBody {
    token: String,
}

/// Applies the transition for a settled request.
///
/// # Returns
///
/// The cascade request to install next: a list fetch after a successful
/// add/remove/edit or login, `None` otherwise.
///
/// # Errors
///
/// Returns an error only if the new state cannot be persisted.
///
/// # Example
///
/// ```rust
/// use shopping_session::app::{handle_settlement, ActionTag, Settlement, StateStore};
/// use shopping_session::storage::MemoryStorage;
/// use shopping_session::transport::HttpResponse;
///
/// let mut store = StateStore::open(Box::new(MemoryStorage::default()))?;
/// let next = handle_settlement(
///     &mut store,
///     ActionTag::Login,
///     &Settlement::Response(HttpResponse::ok(r#"{"token":"T"}"#)),
/// )?;
///
/// assert!(store.state().is_logged);
/// assert_eq!(next.unwrap().tag, ActionTag::List);
/// # Ok::<(), shopping_session::SessionError>(())
/// ```
pub fn handle_settlement(
    store: &mut StateStore,
    tag: ActionTag,
    settlement: &Settlement,
) -> Result<Option<PendingRequest>> {
    let _span = tracing::debug_span!("handle_settlement", tag = %tag).entered();

    if tag == ActionTag::None {
        return Ok(None);
    }

    match settlement {
        Settlement::NoResponse(e) => {
            tracing::warn!(error = %e, "server sent no response");
            store.set_error(NO_RESPONSE)?;
            Ok(None)
        }
        Settlement::Response(response) if response.is_success() => {
            handle_success(store, tag, response)
        }
        Settlement::Response(response) => {
            handle_failure(store, tag, response)?;
            Ok(None)
        }
    }
}

fn handle_success(
    store: &mut StateStore,
    tag: ActionTag,
    response: &HttpResponse,
) -> Result<Option<PendingRequest>> {
    match tag {
        ActionTag::List => {
            let Ok(list) = serde_json::from_str::<Vec<ShoppingItem>>(&response.body) else {
                tracing::warn!(
                    body_len = response.body.len(),
                    "list response is not a list of items"
                );
                store.set_error(UNREADABLE_RESPONSE)?;
                return Ok(None);
            };

            tracing::debug!(items = list.len(), "list replaced");
            store.update(|state| state.list = list)?;
            Ok(None)
        }
        ActionTag::Add | ActionTag::Remove | ActionTag::Edit => {
            tracing::debug!("mutation accepted, refetching list");
            let token = store.state().token.clone();
            Ok(Some(RequestDispatcher::new(store).list(&token)))
        }
        ActionTag::Register => {
            store.set_notice(REGISTER_SUCCESS)?;
            Ok(None)
        }
        ActionTag::Login => {
            let Ok(TokenBody { token }) = serde_json::from_str::<TokenBody>(&response.body) else {
                tracing::warn!("login response carries no token");
                store.set_error(UNREADABLE_RESPONSE)?;
                return Ok(None);
            };

            store.update(|state| {
                state.is_logged = true;
                state.token.clone_from(&token);
            })?;
            tracing::debug!("logged in, fetching list");
            Ok(Some(RequestDispatcher::new(store).list(&token)))
        }
        ActionTag::Logout => {
            tracing::debug!("logged out");
            store.replace(AppState::logged_out(Outcome::Idle))?;
            Ok(None)
        }
        ActionTag::None => Ok(None),
    }
}

fn handle_failure(store: &mut StateStore, tag: ActionTag, response: &HttpResponse) -> Result<()> {
    tracing::debug!(
        status = response.status,
        status_text = %response.status_text,
        "request failed"
    );

    if response.status == STATUS_FORBIDDEN {
        tracing::debug!("session expired, resetting");
        return store.replace(AppState::logged_out(Outcome::Failed(SESSION_EXPIRED.to_string())));
    }

    let message = format!(
        "Server responded with a status {} {}",
        response.status, response.status_text
    );

    match tag {
        ActionTag::Register if response.status == STATUS_CONFLICT => {
            store.set_error(USERNAME_TAKEN)
        }
        ActionTag::Register
        | ActionTag::Login
        | ActionTag::List
        | ActionTag::Add
        | ActionTag::Remove
        | ActionTag::Edit => store.set_error(message),
        ActionTag::Logout => store.replace(AppState::logged_out(Outcome::Failed(
            LOGOUT_FAILED.to_string(),
        ))),
        ActionTag::None => Ok(()),
    }
}
