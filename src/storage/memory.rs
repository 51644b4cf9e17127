//! In-process session storage.

use crate::app::AppState;
use crate::domain::error::{Result, SessionError};
use crate::storage::backend::{Storage, STATE_KEY};
use std::collections::HashMap;

/// Keeps serialized snapshots in a map for the lifetime of the value.
///
/// Values are stored as JSON text, like the file backend, so a round trip
/// exercises the same serialization path.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    /// Raw JSON stored under the state key, if any.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.entries.get(STATE_KEY).map(String::as_str)
    }
}

impl Storage for MemoryStorage {
    fn save(&mut self, state: &AppState) -> Result<()> {
        let json = serde_json::to_string(state)
            .map_err(|e| SessionError::Storage(format!("failed to serialize state: {e}")))?;
        self.entries.insert(STATE_KEY.to_string(), json);
        Ok(())
    }

    fn load(&self) -> Result<Option<AppState>> {
        self.raw()
            .map(|json| {
                serde_json::from_str(json)
                    .map_err(|e| SessionError::Storage(format!("stored state is malformed: {e}")))
            })
            .transpose()
    }
}
