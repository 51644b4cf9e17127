//! Storage backend abstraction.
//!
//! This module defines the [`Storage`] trait, the persistence adapter behind the
//! state store. A backend keeps exactly one value, the serialized
//! [`AppState`], under the fixed key [`STATE_KEY`] in a store that lives for one
//! session only.

use crate::app::AppState;
use crate::domain::error::Result;

/// Key the state snapshot is stored under.
pub const STATE_KEY: &str = "state";

/// Session-scoped persistence of the state record.
///
/// # Implementations
///
/// - [`JsonSessionStorage`](crate::storage::JsonSessionStorage): one JSON file per session
/// - [`MemoryStorage`](crate::storage::MemoryStorage): in-process map, for tests and embedding
///
/// # Examples
///
/// ```
/// use shopping_session::storage::{MemoryStorage, Storage};
/// use shopping_session::AppState;
///
/// let mut storage = MemoryStorage::default();
/// assert!(storage.load()?.is_none());
///
/// storage.save(&AppState::default())?;
/// assert_eq!(storage.load()?, Some(AppState::default()));
/// # Ok::<(), shopping_session::SessionError>(())
/// ```
pub trait Storage: Send {
    /// Writes a complete snapshot, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be serialized or written.
    fn save(&mut self, state: &AppState) -> Result<()>;

    /// Reads the stored snapshot, or `None` if nothing was saved this session.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored value exists but cannot be read or parsed.
    fn load(&self) -> Result<Option<AppState>>;
}
