//! Durable key-value storage port

use std::collections::HashMap;

use parking_lot::Mutex;
use thiserror::Error;

/// Errors that can occur while touching client-side storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Port for small string values that survive restarts.
///
/// Operations are synchronous: they back local reads that happen on every
/// request, and implementations are expected to be cheap.
pub trait KeyValueStorage: Send + Sync {
    /// Reads a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes several values as one update.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError>;

    /// Removes several keys as one update. Missing keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError>;

    /// Writes a single value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_many(&[(key, value)])
    }

    /// Removes a single key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.remove_many(&[key])
    }
}

/// Process-local storage, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut values = self.values.lock();
        for (key, value) in entries {
            values.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut values = self.values.lock();
        for key in keys {
            values.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        storage.set("a", "1").unwrap();
        storage.set_many(&[("b", "2"), ("c", "3")]).unwrap();
        assert_eq!(storage.get("b").unwrap().as_deref(), Some("2"));
        assert_eq!(storage.len(), 3);

        storage.remove_many(&["a", "b", "missing"]).unwrap();
        assert_eq!(storage.get("a").unwrap(), None);
        assert_eq!(storage.len(), 1);
    }
}
