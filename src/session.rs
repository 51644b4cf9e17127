//! Session driver: installs requests and runs the transition protocol.
//!
//! A [`Session`] is the explicit context object that ties the state store, the
//! transport and the request sequence together. Each intent method builds a
//! request through the [`RequestDispatcher`], installs it, and drives it
//! through the protocol:
//!
//! ```text
//! install (seq n) → loading = true → transport.send().await → settle
//!                                                         │
//!        latest?  yes → loading = false → handle_settlement → cascade? ─┐
//!                 no  → discard (unless 403)                          │
//!        ◄────────────────────────── install list(token) ◄────────────┘
//! ```
//!
//! Several intents may be awaited concurrently on one session. Each installed
//! request takes the next sequence number; when a response settles after a
//! newer request was installed it is dropped, so an older answer can never
//! overwrite a fresher one. A 403 is still honored, since it means the token
//! is dead no matter which request found out; it also retires every request
//! still in flight, so nothing sent with the dead token lands afterwards.

use crate::app::{
    handle_settlement, AppState, PendingRequest, RequestDispatcher, Settlement, StateStore,
};
use crate::domain::error::{Result, SessionError};
use crate::domain::{Credentials, ShoppingItem};
use crate::storage::Storage;
use crate::transport::Transport;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

/// One client session against the shopping API.
///
/// # Example
///
/// ```rust
/// use shopping_session::storage::MemoryStorage;
/// use shopping_session::transport::{HttpResponse, ScriptedTransport};
/// use shopping_session::{Credentials, Session};
///
/// # let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
/// # rt.block_on(async {
/// let transport = ScriptedTransport::new();
/// transport.push(HttpResponse::ok(r#"{"token":"T"}"#));
/// transport.push(HttpResponse::ok("[]"));
///
/// let session = Session::new(Box::new(MemoryStorage::default()), transport)?;
/// session.login(&Credentials::new("u", "p")).await?;
///
/// let state = session.state()?;
/// assert!(state.is_logged);
/// assert_eq!(state.token, "T");
/// assert!(state.list.is_empty());
/// # Ok::<(), shopping_session::SessionError>(())
/// # }).unwrap();
/// ```
pub struct Session<T: Transport> {
    store: Mutex<StateStore>,
    transport: T,
    latest: AtomicU64,
}

impl<T: Transport> Session<T> {
    /// Opens a session, seeding state from the storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored snapshot exists but cannot be read.
    pub fn new(storage: Box<dyn Storage>, transport: T) -> Result<Self> {
        let store = StateStore::open(storage)?;
        Ok(Self {
            store: Mutex::new(store),
            transport,
            latest: AtomicU64::new(0),
        })
    }

    /// Snapshot of the current state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock was poisoned.
    pub fn state(&self) -> Result<AppState> {
        Ok(self.lock()?.state().clone())
    }

    /// The transport requests are sent through.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Shows a message produced outside the request cycle, e.g. a form check.
    ///
    /// An empty message clears the current one.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be persisted.
    pub fn set_error(&self, message: impl Into<String>) -> Result<()> {
        self.lock()?.set_error(message)
    }

    /// Fetches the list with the given token.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be persisted.
    pub async fn list(&self, token: &str) -> Result<()> {
        let request = self.with_dispatcher(|dispatcher| Ok(dispatcher.list(token)))?;
        self.dispatch(request).await
    }

    /// Fetches the list with the session's own token.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be persisted.
    pub async fn refresh(&self) -> Result<()> {
        let token = self.lock()?.state().token.clone();
        self.list(&token).await
    }

    /// Adds an item; the list is refetched once the server accepts it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidItem`] without contacting the server if
    /// the item is invalid, or an error if the state cannot be persisted.
    pub async fn add(&self, item: &ShoppingItem) -> Result<()> {
        let request = self.with_dispatcher(|dispatcher| dispatcher.add(item))?;
        self.dispatch(request).await
    }

    /// Removes the item with the given id; the list is refetched afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidItem`] if `id` is empty, or an error if
    /// the state cannot be persisted.
    pub async fn remove(&self, id: &str) -> Result<()> {
        let request = self.with_dispatcher(|dispatcher| dispatcher.remove(id))?;
        self.dispatch(request).await
    }

    /// Replaces a stored item; the list is refetched afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidItem`] if the item has no id or is
    /// invalid, or an error if the state cannot be persisted.
    pub async fn edit(&self, item: &ShoppingItem) -> Result<()> {
        let request = self.with_dispatcher(|dispatcher| dispatcher.edit(item))?;
        self.dispatch(request).await
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be persisted.
    pub async fn register(&self, credentials: &Credentials) -> Result<()> {
        let request = self.with_dispatcher(|dispatcher| dispatcher.register(credentials))?;
        self.dispatch(request).await
    }

    /// Logs in and, on success, fetches the list.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be persisted.
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        let request = self.with_dispatcher(|dispatcher| dispatcher.login(credentials))?;
        self.dispatch(request).await
    }

    /// Logs out. The state ends up logged out whatever the server answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be persisted.
    pub async fn logout(&self) -> Result<()> {
        let request = self.with_dispatcher(|dispatcher| Ok(dispatcher.logout()))?;
        self.dispatch(request).await
    }

    /// Installs a request and runs it, plus any cascade, to completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be persisted.
    pub async fn dispatch(&self, request: PendingRequest) -> Result<()> {
        let mut next = Some(request);
        while let Some(request) = next.take() {
            next = self.run(request).await?;
        }
        Ok(())
    }

    async fn run(&self, request: PendingRequest) -> Result<Option<PendingRequest>> {
        if request.tag == crate::app::ActionTag::None {
            return Ok(None);
        }

        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(
            seq,
            tag = %request.tag,
            method = %request.method,
            path = %request.path,
            "request installed"
        );

        self.lock()?.set_loading(true);

        let settlement = Settlement::from(self.transport.send(&request).await);

        let mut store = self.lock()?;
        if self.latest.load(Ordering::SeqCst) == seq {
            store.set_loading(false);
        } else if settlement.is_session_expired() {
            tracing::warn!(seq, tag = %request.tag, "stale response reports expired session");
            // Requests still in flight carry the dead token.
            self.latest.fetch_add(1, Ordering::SeqCst);
        } else {
            tracing::debug!(seq, tag = %request.tag, "discarding stale response");
            return Ok(None);
        }

        handle_settlement(&mut store, request.tag, &settlement)
    }

    fn with_dispatcher<F>(&self, build: F) -> Result<PendingRequest>
    where
        F: FnOnce(&mut RequestDispatcher<'_>) -> Result<PendingRequest>,
    {
        let mut store = self.lock()?;
        let mut dispatcher = RequestDispatcher::new(&mut store);
        build(&mut dispatcher)
    }

    fn lock(&self) -> Result<MutexGuard<'_, StateStore>> {
        self.store
            .lock()
            .map_err(|_| SessionError::Storage("session state lock poisoned".to_string()))
    }
}

impl<T: Transport + std::fmt::Debug> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("transport", &self.transport)
            .field("latest", &self.latest.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
