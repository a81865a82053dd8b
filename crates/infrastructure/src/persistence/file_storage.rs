//! File-backed key-value storage.
//!
//! The session lives in a single JSON object file:
//! ```json
//! {
//!   "accessToken": "...",
//!   "refreshToken": "...",
//!   "user": "{\"id\":\"...\"}"
//! }
//! ```
//! The file is read once and cached; every write replaces it atomically.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bookverse_application::ports::{KeyValueStorage, StorageError};
use parking_lot::Mutex;

use crate::serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};

type Entries = BTreeMap<String, String>;

fn to_storage_error(e: SerializationError) -> StorageError {
    match e {
        SerializationError::Io(io_err) => StorageError::Io(io_err),
        other => StorageError::Serialization(other.to_string()),
    }
}

/// Key-value storage persisted to a JSON file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    cache: Mutex<Option<Entries>>,
}

impl FileStorage {
    /// Creates a storage backed by `path`. Nothing is read until first use.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<Entries, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Entries::new()),
            Ok(bytes) => from_json_bytes(&bytes).map_err(to_storage_error),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn write_file(&self, entries: &Entries) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let bytes = to_json_stable_bytes(entries).map_err(to_storage_error)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        restrict_permissions(&tmp)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Applies `change` to the stored entries and persists the result.
    ///
    /// An unparseable file is replaced rather than blocking every write.
    /// The cache is only updated once the file has been written.
    fn update(&self, change: impl FnOnce(&mut Entries)) -> Result<(), StorageError> {
        let mut cache = self.cache.lock();
        let mut entries = match cache.as_ref() {
            Some(entries) => entries.clone(),
            None => match self.read_file() {
                Err(StorageError::Serialization(e)) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Discarding unreadable session file"
                    );
                    Entries::new()
                }
                other => other?,
            },
        };
        change(&mut entries);
        self.write_file(&entries)?;
        *cache = Some(entries);
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut cache = self.cache.lock();
        if cache.is_none() {
            *cache = Some(self.read_file()?);
        }
        Ok(cache.as_ref().and_then(|entries| entries.get(key).cloned()))
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        self.update(|stored| {
            for (key, value) in entries {
                stored.insert((*key).to_string(), (*value).to_string());
            }
        })
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        self.update(|stored| {
            for key in keys {
                stored.remove(*key);
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn storage() -> (TempDir, FileStorage) {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("session.json"));
        (dir, storage)
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let (_dir, storage) = storage();
        assert_eq!(storage.get("accessToken").unwrap(), None);
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_values_survive_reopen() {
        let (_dir, storage) = storage();
        storage
            .set_many(&[("accessToken", "A1"), ("refreshToken", "R1")])
            .unwrap();

        let reopened = FileStorage::new(storage.path());
        assert_eq!(reopened.get("accessToken").unwrap().as_deref(), Some("A1"));
        assert_eq!(reopened.get("refreshToken").unwrap().as_deref(), Some("R1"));
    }

    #[test]
    fn test_file_is_stable_json() {
        let (_dir, storage) = storage();
        storage.set("refreshToken", "R1").unwrap();
        storage.set("accessToken", "A1").unwrap();

        let content = fs::read_to_string(storage.path()).unwrap();
        assert_eq!(
            content,
            "{\n  \"accessToken\": \"A1\",\n  \"refreshToken\": \"R1\"\n}\n"
        );
    }

    #[test]
    fn test_remove_many() {
        let (_dir, storage) = storage();
        storage
            .set_many(&[("accessToken", "A1"), ("refreshToken", "R1"), ("user", "{}")])
            .unwrap();
        storage.remove_many(&["accessToken", "user"]).unwrap();

        let reopened = FileStorage::new(storage.path());
        assert_eq!(reopened.get("accessToken").unwrap(), None);
        assert_eq!(reopened.get("refreshToken").unwrap().as_deref(), Some("R1"));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let (_dir, storage) = storage();
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(storage.path(), "not json").unwrap();

        assert!(matches!(
            storage.get("accessToken"),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn test_truncated_file_is_replaced_on_write() {
        let (_dir, storage) = storage();
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(storage.path(), r#"{"accessToken": "A1", trunc"#).unwrap();

        storage.remove_many(&["accessToken", "refreshToken"]).unwrap();
        assert_eq!(storage.get("accessToken").unwrap(), None);
        storage
            .set_many(&[("accessToken", "A2"), ("refreshToken", "R2")])
            .unwrap();

        let reopened = FileStorage::new(storage.path());
        assert_eq!(reopened.get("accessToken").unwrap().as_deref(), Some("A2"));
        assert_eq!(reopened.get("refreshToken").unwrap().as_deref(), Some("R2"));
    }

    #[test]
    fn test_session_recovers_from_truncated_file() {
        use std::sync::Arc;

        use bookverse_application::TokenStore;

        let (_dir, storage) = storage();
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(storage.path(), r#"{"accessToken": "A1", trunc"#).unwrap();
        let path = storage.path().to_path_buf();
        let tokens = TokenStore::new(Arc::new(storage));

        tokens.clear_session();
        tokens.set_session("A2", "R2");

        assert_eq!(tokens.access_token().as_deref(), Some("A2"));
        let reopened = FileStorage::new(path);
        assert_eq!(reopened.get("refreshToken").unwrap().as_deref(), Some("R2"));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, storage) = storage();
        storage.set("accessToken", "A1").unwrap();
        let mode = fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
