//! In-memory storage, used by tests and ephemeral sessions

use super::KeyValueStorage;
use crate::state::PersistenceError;
use std::collections::HashMap;
use std::sync::Mutex;

/// Process-local storage backed by a `HashMap`
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-populated with raw slot values
    pub fn with_slots<I, K, V>(slots: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            slots: Mutex::new(
                slots
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, PersistenceError> {
        self.slots
            .lock()
            .map_err(|_| PersistenceError::Unavailable("memory storage lock poisoned".to_string()))
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.lock()?.remove(key);
        Ok(())
    }
}
