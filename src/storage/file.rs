//! File-backed storage
//!
//! One JSON file per slot inside a data directory.

use super::KeyValueStorage;
use crate::state::PersistenceError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, PersistenceError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory holding the slot files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    ///
    /// Keys are plain slot names; anything that could escape the data
    /// directory is rejected.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PersistenceError::InvalidData(format!(
                "Invalid storage key: {:?}",
                key
            )));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        // Write next to the target and rename so readers never see a torn file
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!(key = %key, bytes = value.len(), "Wrote storage slot");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_missing_key_returns_none() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        assert_eq!(storage.get("agents").unwrap(), None);
    }

    #[test]
    fn test_set_replaces_whole_value() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        storage.set("agents", "[1,2,3]").unwrap();
        storage.set("agents", "[]").unwrap();

        assert_eq!(storage.get("agents").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("agents.json").exists());
        assert!(!dir.path().join(".agents.json.tmp").exists());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        storage.set("user", "{}").unwrap();
        storage.remove("user").unwrap();
        storage.remove("user").unwrap();
        assert_eq!(storage.get("user").unwrap(), None);
    }

    #[test]
    fn test_new_creates_nested_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = FileStorage::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(storage.dir(), nested.as_path());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        for key in ["", "../agents", "a/b", "a.b"] {
            match storage.set(key, "x") {
                Err(PersistenceError::InvalidData(_)) => {}
                other => panic!("Expected InvalidData for {:?}, got: {:?}", key, other),
            }
        }
    }
}
