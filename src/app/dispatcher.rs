//! Intent-to-request translation.
//!
//! [`RequestDispatcher`] exposes one operation per user intent and builds the
//! matching [`PendingRequest`]. It reads the session token from the store; the
//! only state it ever writes is the optimistic user name set by
//! [`login`](RequestDispatcher::login).
//!
//! # Endpoints
//!
//! | Intent   | Method | Path                 | Token | JSON body      |
//! |----------|--------|----------------------|-------|----------------|
//! | list     | GET    | `/api/shopping`      | yes   | -              |
//! | add      | POST   | `/api/shopping`      | yes   | item (no `_id`)|
//! | remove   | DELETE | `/api/shopping/{id}` | yes   | -              |
//! | edit     | PUT    | `/api/shopping/{id}` | yes   | item           |
//! | register | POST   | `/register`          | no    | credentials    |
//! | login    | POST   | `/login`             | no    | credentials    |
//! | logout   | POST   | `/logout`            | yes   | -              |

use crate::app::actions::{ActionTag, Method, PendingRequest};
use crate::app::store::StateStore;
use crate::domain::error::{Result, SessionError};
use crate::domain::{Credentials, ShoppingItem};
use serde::Serialize;

const SHOPPING_PATH: &str = "/api/shopping";
const CONTENT_TYPE: &str = "Content-Type";
const JSON: &str = "application/json";
const TOKEN_HEADER: &str = "token";

/// Builds tagged requests for each user intent.
pub struct RequestDispatcher<'a> {
    store: &'a mut StateStore,
}

impl<'a> RequestDispatcher<'a> {
    pub fn new(store: &'a mut StateStore) -> Self {
        Self { store }
    }

    fn request(&self, tag: ActionTag, method: Method, path: impl Into<String>) -> PendingRequest {
        authorize(PendingRequest::new(tag, method, path), &self.store.state().token)
    }

    /// Fetch the list with an explicit token.
    ///
    /// Takes the token as an argument because the login cascade fetches with
    /// the token it just received.
    #[must_use]
    pub fn list(&self, token: &str) -> PendingRequest {
        authorize(PendingRequest::new(ActionTag::List, Method::Get, SHOPPING_PATH), token)
    }

    /// Create an item on the server.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidItem`] if the item fails validation.
    pub fn add(&self, item: &ShoppingItem) -> Result<PendingRequest> {
        item.validate()?;
        let body = ShoppingItem {
            id: String::new(),
            ..item.clone()
        };

        Ok(self
            .request(ActionTag::Add, Method::Post, SHOPPING_PATH)
            .with_header(CONTENT_TYPE, JSON)
            .with_body(encode(&body)?))
    }

    /// Delete the item with the given server id.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidItem`] if `id` is empty.
    pub fn remove(&self, id: &str) -> Result<PendingRequest> {
        let path = item_path(id)?;
        Ok(self.request(ActionTag::Remove, Method::Delete, path))
    }

    /// Replace a stored item.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidItem`] if the item has no id or fails validation.
    pub fn edit(&self, item: &ShoppingItem) -> Result<PendingRequest> {
        let path = item_path(&item.id)?;
        item.validate()?;

        Ok(self
            .request(ActionTag::Edit, Method::Put, path)
            .with_header(CONTENT_TYPE, JSON)
            .with_body(encode(item)?))
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials cannot be encoded.
    pub fn register(&self, credentials: &Credentials) -> Result<PendingRequest> {
        Ok(self
            .request(ActionTag::Register, Method::Post, "/register")
            .with_header(CONTENT_TYPE, JSON)
            .with_body(encode(credentials)?))
    }

    /// Log in, showing the submitted user name right away.
    ///
    /// The name is stored before any answer arrives so the front end can show
    /// who is being logged in while the request is loading.
    ///
    /// # Errors
    ///
    /// Returns an error if the user name cannot be persisted or the
    /// credentials cannot be encoded.
    pub fn login(&mut self, credentials: &Credentials) -> Result<PendingRequest> {
        self.store.set_user(credentials.username.clone())?;

        Ok(self
            .request(ActionTag::Login, Method::Post, "/login")
            .with_header(CONTENT_TYPE, JSON)
            .with_body(encode(credentials)?))
    }

    /// End the session on the server.
    #[must_use]
    pub fn logout(&self) -> PendingRequest {
        self.request(ActionTag::Logout, Method::Post, "/logout")
            .with_header(CONTENT_TYPE, JSON)
    }
}

/// Attaches the session token to requests that need one.
fn authorize(request: PendingRequest, token: &str) -> PendingRequest {
    if request.tag.is_authenticated() {
        request.with_header(TOKEN_HEADER, token)
    } else {
        request
    }
}

fn item_path(id: &str) -> Result<String> {
    if id.is_empty() {
        return Err(SessionError::InvalidItem("item has no server id".to_string()));
    }
    Ok(format!("{SHOPPING_PATH}/{id}"))
}

fn encode<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| SessionError::Http(format!("failed to encode request body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn logged_in_store() -> StateStore {
        let mut store = StateStore::open(Box::new(MemoryStorage::default())).unwrap();
        store
            .update(|s| {
                s.is_logged = true;
                s.token = "T".to_string();
            })
            .unwrap();
        store
    }

    fn body(request: &PendingRequest) -> serde_json::Value {
        serde_json::from_str(request.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn list_uses_given_token() {
        let mut store = logged_in_store();
        let request = RequestDispatcher::new(&mut store).list("fresh");

        assert_eq!(request.tag, ActionTag::List);
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "/api/shopping");
        assert_eq!(request.header("token"), Some("fresh"));
        assert!(request.body.is_none());
    }

    #[test]
    fn add_sends_item_without_id() {
        let mut store = logged_in_store();
        let item = ShoppingItem::new("milk", 2, 1.25).with_id("stale");
        let request = RequestDispatcher::new(&mut store).add(&item).unwrap();

        assert_eq!(request.tag, ActionTag::Add);
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.header("token"), Some("T"));
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(
            body(&request),
            serde_json::json!({"type": "milk", "count": 2.0, "price": 1.25})
        );
    }

    #[test]
    fn add_rejects_invalid_item() {
        let mut store = logged_in_store();
        let err = RequestDispatcher::new(&mut store)
            .add(&ShoppingItem::new("", 1, 1.0))
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidItem(_)));
    }

    #[test]
    fn remove_and_edit_target_item_path() {
        let mut store = logged_in_store();
        let dispatcher = RequestDispatcher::new(&mut store);

        let remove = dispatcher.remove("abc").unwrap();
        assert_eq!(remove.method, Method::Delete);
        assert_eq!(remove.path, "/api/shopping/abc");
        assert_eq!(remove.header("token"), Some("T"));
        assert!(remove.header("content-type").is_none());

        let edit = dispatcher
            .edit(&ShoppingItem::new("tea", 4, 2.0).with_id("abc"))
            .unwrap();
        assert_eq!(edit.tag, ActionTag::Edit);
        assert_eq!(edit.method, Method::Put);
        assert_eq!(edit.path, "/api/shopping/abc");
        assert_eq!(body(&edit)["_id"], "abc");

        assert!(dispatcher.remove("").is_err());
        assert!(dispatcher.edit(&ShoppingItem::new("tea", 1, 1.0)).is_err());
    }

    #[test]
    fn login_sets_user_before_any_response() {
        let mut store = StateStore::open(Box::new(MemoryStorage::default())).unwrap();
        let request = RequestDispatcher::new(&mut store)
            .login(&Credentials::new("u", "p"))
            .unwrap();

        assert_eq!(store.state().user, "u");
        assert!(!store.state().is_logged);
        assert_eq!(request.tag, ActionTag::Login);
        assert_eq!(request.path, "/login");
        assert!(request.header("token").is_none());
        assert_eq!(body(&request), serde_json::json!({"username": "u", "password": "p"}));
    }

    #[test]
    fn token_follows_the_action_tag() {
        let mut store = logged_in_store();
        let credentials = Credentials::new("u", "p");
        let item = ShoppingItem::new("tea", 1, 1.0).with_id("abc");

        let mut dispatcher = RequestDispatcher::new(&mut store);
        let requests = [
            dispatcher.list("T"),
            dispatcher.add(&item).unwrap(),
            dispatcher.remove("abc").unwrap(),
            dispatcher.edit(&item).unwrap(),
            dispatcher.register(&credentials).unwrap(),
            dispatcher.logout(),
            dispatcher.login(&credentials).unwrap(),
        ];

        for request in requests {
            let expected = request.tag.is_authenticated().then_some("T");
            assert_eq!(request.header("token"), expected, "{}", request.tag);
        }
    }

    #[test]
    fn register_and_logout_shapes() {
        let mut store = logged_in_store();
        let dispatcher = RequestDispatcher::new(&mut store);

        let register = dispatcher.register(&Credentials::new("new", "pw")).unwrap();
        assert_eq!(register.tag, ActionTag::Register);
        assert_eq!(register.path, "/register");
        assert!(register.header("token").is_none());

        let logout = dispatcher.logout();
        assert_eq!(logout.tag, ActionTag::Logout);
        assert_eq!(logout.method, Method::Post);
        assert_eq!(logout.header("token"), Some("T"));
        assert_eq!(logout.header("content-type"), Some("application/json"));
        assert!(logout.body.is_none());
    }
}
