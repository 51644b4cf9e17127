//! State store with write-through persistence.
//!
//! [`StateStore`] is the single owner of [`AppState`]. Every setter that touches
//! a field worth restoring writes the new snapshot through to the [`Storage`]
//! backend before returning, so the durable copy never lags the in-memory one.
//! The loading flag is the exception: it is ephemeral and never persisted.

use crate::app::state::{AppState, Outcome};
use crate::domain::error::Result;
use crate::storage::Storage;

/// Holds the current session state and its persistence backend.
pub struct StateStore {
    state: AppState,
    storage: Box<dyn Storage>,
}

impl StateStore {
    /// Creates a store seeded from the backend's snapshot, if there is one.
    ///
    /// This is the only time the backend is read. A restored snapshot always
    /// comes back with `loading = false`: no request survives a restart.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored snapshot exists but cannot be read.
    ///
    /// # Examples
    ///
    /// ```
    /// use shopping_session::app::StateStore;
    /// use shopping_session::storage::MemoryStorage;
    ///
    /// let store = StateStore::open(Box::new(MemoryStorage::default()))?;
    /// assert!(!store.state().is_logged);
    /// # Ok::<(), shopping_session::SessionError>(())
    /// ```
    pub fn open(storage: Box<dyn Storage>) -> Result<Self> {
        let state = match storage.load()? {
            Some(mut restored) => {
                tracing::debug!(
                    is_logged = restored.is_logged,
                    items = restored.list.len(),
                    "restored session state"
                );
                restored.loading = false;
                restored
            }
            None => {
                tracing::debug!("no stored session state, starting logged out");
                AppState::default()
            }
        };

        Ok(Self { state, storage })
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Sets the loading flag. Not persisted.
    ///
    /// Entering the loading state also clears any pending message, so a stale
    /// error is not shown while the next request runs.
    pub fn set_loading(&mut self, loading: bool) {
        self.state.loading = loading;
        if loading {
            self.state.outcome = Outcome::Idle;
        }
    }

    /// Records a failure message; an empty message clears the outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be persisted.
    pub fn set_error(&mut self, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        self.state.outcome = if message.is_empty() {
            Outcome::Idle
        } else {
            Outcome::Failed(message)
        };
        self.persist()
    }

    /// Records an informational message.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be persisted.
    pub fn set_notice(&mut self, message: impl Into<String>) -> Result<()> {
        self.state.outcome = Outcome::Succeeded(message.into());
        self.persist()
    }

    /// Sets the display name of the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be persisted.
    pub fn set_user(&mut self, user: impl Into<String>) -> Result<()> {
        self.state.user = user.into();
        self.persist()
    }

    /// Replaces the whole record.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be persisted.
    pub fn replace(&mut self, state: AppState) -> Result<()> {
        self.state = state;
        self.persist()
    }

    /// Applies `f` to the record and persists the result as one transition.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be persisted.
    pub fn update<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut AppState),
    {
        f(&mut self.state);
        self.persist()
    }

    fn persist(&mut self) -> Result<()> {
        self.storage.save(&self.state).inspect_err(|e| {
            tracing::error!(error = %e, "failed to persist session state");
        })
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::SessionError;
    use crate::domain::ShoppingItem;
    use crate::storage::MemoryStorage;
    use std::sync::{Arc, Mutex};

    /// Storage that shares its contents with the test so writes can be observed.
    #[derive(Clone, Default)]
    struct SharedStorage(Arc<Mutex<MemoryStorage>>);

    impl Storage for SharedStorage {
        fn save(&mut self, state: &AppState) -> Result<()> {
            self.0.lock().unwrap().save(state)
        }

        fn load(&self) -> Result<Option<AppState>> {
            self.0.lock().unwrap().load()
        }
    }

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn save(&mut self, _state: &AppState) -> Result<()> {
            Err(SessionError::Storage("disk full".to_string()))
        }

        fn load(&self) -> Result<Option<AppState>> {
            Ok(None)
        }
    }

    fn stored(storage: &SharedStorage) -> Option<AppState> {
        storage.load().unwrap()
    }

    #[test]
    fn open_restores_snapshot_with_loading_cleared() {
        let storage = SharedStorage::default();
        let mut seeded = storage.clone();
        seeded
            .save(&AppState {
                is_logged: true,
                token: "T".to_string(),
                loading: true,
                list: vec![ShoppingItem::new("milk", 1, 1.0).with_id("m")],
                ..AppState::default()
            })
            .unwrap();

        let store = StateStore::open(Box::new(storage)).unwrap();
        assert!(store.state().is_logged);
        assert_eq!(store.state().list.len(), 1);
        assert!(!store.state().loading);
    }

    #[test]
    fn loading_is_never_persisted() {
        let storage = SharedStorage::default();
        let mut store = StateStore::open(Box::new(storage.clone())).unwrap();

        store.set_loading(true);
        assert!(store.state().loading);
        assert_eq!(stored(&storage), None);
    }

    #[test]
    fn entering_loading_clears_the_message() {
        let mut store = StateStore::open(Box::new(MemoryStorage::default())).unwrap();
        store.set_error("boom").unwrap();

        store.set_loading(true);
        assert_eq!(store.state().outcome, Outcome::Idle);

        store.set_error("again").unwrap();
        store.set_loading(false);
        assert_eq!(store.state().error(), Some("again"));
    }

    #[test]
    fn setters_write_through() {
        let storage = SharedStorage::default();
        let mut store = StateStore::open(Box::new(storage.clone())).unwrap();

        store.set_user("alice").unwrap();
        assert_eq!(stored(&storage).unwrap().user, "alice");

        store.set_error("bad").unwrap();
        assert_eq!(stored(&storage).unwrap().error(), Some("bad"));

        store.set_notice("Register success").unwrap();
        assert_eq!(stored(&storage).unwrap().notice(), Some("Register success"));

        store.update(|s| s.token = "T".to_string()).unwrap();
        assert_eq!(stored(&storage).unwrap().token, "T");

        store.replace(AppState::default()).unwrap();
        assert_eq!(stored(&storage).unwrap(), AppState::default());
    }

    #[test]
    fn empty_error_clears_outcome() {
        let mut store = StateStore::open(Box::new(MemoryStorage::default())).unwrap();
        store.set_error("bad").unwrap();
        store.set_error("").unwrap();
        assert_eq!(store.state().outcome, Outcome::Idle);
    }

    #[test]
    fn failed_save_keeps_in_memory_change() {
        let mut store = StateStore::open(Box::new(FailingStorage)).unwrap();
        assert!(store.set_user("carol").is_err());
        assert_eq!(store.state().user, "carol");
    }
}
