//! Durable key/value storage
//!
//! The store persists each collection as one serialized blob under a fixed
//! slot name. Backends only need to get, replace and remove whole values.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::state::PersistenceError;

/// A durable string-keyed, string-valued storage backend
///
/// Writes replace the whole value for a key. Implementations must make a
/// successful `set` visible to the next `get` on the same key.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// Remove the value stored under `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}
