// Store persistence
// Loads and saves the three store slots through a key/value backend

use crate::storage::KeyValueStorage;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Slot holding the serialized agent list
pub const AGENTS_SLOT: &str = "agents";
/// Slot holding the serialized agent id -> messages mapping
pub const CONVERSATIONS_SLOT: &str = "conversations";
/// Slot holding the serialized user record
pub const USER_SLOT: &str = "user";

/// Error types for persistence operations
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// File I/O error
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization/deserialization error
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    /// Invalid data format
    #[error("Invalid Data: {0}")]
    InvalidData(String),
    /// Storage backend cannot be used
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Load one slot, falling back to the default value
///
/// A missing slot is normal (first run). An unreadable or unparsable slot is
/// logged and replaced by the default; it never affects the other slots.
pub fn load_slot<T>(storage: &dyn KeyValueStorage, slot: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match storage.get(slot) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(slot = %slot, error = %e, "Discarding unparsable slot, using default");
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            warn!(slot = %slot, error = %e, "Failed to read slot, using default");
            T::default()
        }
    }
}

/// Serialize `value` and replace the slot contents with it
pub fn save_slot<T>(
    storage: &dyn KeyValueStorage,
    slot: &str,
    value: &T,
) -> Result<(), PersistenceError>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value)?;
    storage.set(slot, &json)
}
