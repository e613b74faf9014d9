//! Durable client-side session storage.
//!
//! The session lives under three keys: `token`, `refreshToken` and `user`
//! (JSON). Writes are single-key and atomic; only the session manager and the
//! client's refresh path write them.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use hire_models::User;
use thiserror::Error;
use tracing::{debug, warn};

pub const TOKEN_KEY: &str = "token";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const USER_KEY: &str = "user";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Corrupt session file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Key-value store that survives restarts (or not, for the in-memory one).
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Typed helpers over any [`SessionStore`].
pub trait SessionStoreExt: SessionStore {
    fn access_token(&self) -> Option<String> {
        self.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    fn refresh_token(&self) -> Option<String> {
        self.get(REFRESH_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Stored user, or an error when the stored JSON does not parse.
    fn user(&self) -> Result<Option<User>, serde_json::Error> {
        self.get(USER_KEY)
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
    }

    fn store_user(&self, user: &User) -> Result<(), StorageError> {
        let raw = serde_json::to_string(user).map_err(|source| StorageError::Corrupt {
            path: PathBuf::from(USER_KEY),
            source,
        })?;
        self.set(USER_KEY, &raw)
    }

    /// Remove `token`, `refreshToken` and `user`. Every key is attempted;
    /// the first failure is returned.
    fn clear_session(&self) -> Result<(), StorageError> {
        let mut first_error = None;
        for key in [TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.remove(key) {
                warn!(key, "Failed to clear session key: {}", e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl<S: SessionStore + ?Sized> SessionStoreExt for S {}

/// Process-lifetime store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Poisoned)?
            .remove(key);
        Ok(())
    }
}

/// JSON file store. Every write rewrites the file through a temp file and a
/// rename so a crash never leaves a half-written session.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A corrupt file is an error; callers decide whether to discard it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        debug!(path = %path.display(), keys = entries.len(), "Opened session store");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Open the store, discarding a corrupt file instead of failing.
    pub fn open_or_reset(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        match Self::open(&path) {
            Err(StorageError::Corrupt { .. }) => {
                warn!(path = %path.display(), "Session file is corrupt, starting fresh");
                let store = Self {
                    path,
                    entries: Mutex::new(BTreeMap::new()),
                };
                store.persist(&BTreeMap::new())?;
                Ok(store)
            }
            other => other,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let raw = serde_json::to_string_pretty(entries).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }

    fn update<F>(&self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        let mut next = entries.clone();
        f(&mut next);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hire_models::Role;

    fn user() -> User {
        User {
            id: "u1".to_string(),
            email: "r@example.com".to_string(),
            role: Role::Recruiter,
            email_verified: true,
            first_name: None,
            last_name: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        store.set(TOKEN_KEY, "abc").unwrap();
        assert_eq!(store.access_token().as_deref(), Some("abc"));
        store.remove(TOKEN_KEY).unwrap();
        assert!(store.access_token().is_none());
    }

    #[test]
    fn test_clear_session_removes_all_keys() {
        let store = MemoryStore::new();
        store.set(TOKEN_KEY, "a").unwrap();
        store.set(REFRESH_TOKEN_KEY, "r").unwrap();
        store.store_user(&user()).unwrap();
        store.set("theme", "dark").unwrap();

        store.clear_session().unwrap();

        assert!(store.get(TOKEN_KEY).is_none());
        assert!(store.get(REFRESH_TOKEN_KEY).is_none());
        assert!(store.get(USER_KEY).is_none());
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_user_parse_error_surfaces() {
        let store = MemoryStore::new();
        store.set(USER_KEY, "{not json").unwrap();
        assert!(store.user().is_err());
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileStore::open(&path).unwrap();
        store.set(TOKEN_KEY, "persisted").unwrap();
        store.store_user(&user()).unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.access_token().as_deref(), Some("persisted"));
        assert_eq!(reopened.user().unwrap().unwrap().role, Role::Recruiter);
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "garbage").unwrap();

        assert!(matches!(
            FileStore::open(&path),
            Err(StorageError::Corrupt { .. })
        ));

        let store = FileStore::open_or_reset(&path).unwrap();
        assert!(store.get(TOKEN_KEY).is_none());
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "{}");
    }
}
