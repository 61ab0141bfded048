// Session persistence module
// Caches the backend-issued token on disk so a restart skips the login screen

use crate::error::StorageError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the session record inside the data directory
pub const SESSION_FILE_NAME: &str = "session.json";

/// Persisted session record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque token issued by the backend
    pub token: String,
    /// Expiry in epoch milliseconds
    pub expires_at: i64,
    /// When the login happened, in epoch milliseconds
    pub login_time: i64,
}

impl Session {
    /// A session is valid strictly before its expiry
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at
    }
}

/// Current time in epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// File-backed session store
///
/// Holds an in-memory mirror of the persisted record. The token is opaque
/// and trusted as-is; no integrity protection is applied.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    token: Option<String>,
    expires_at: Option<i64>,
    authenticated: bool,
}

impl SessionStore {
    /// Store backed by `<data_dir>/session.json`
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self::with_path(data_dir.as_ref().join(SESSION_FILE_NAME))
    }

    /// Store backed by an explicit file path
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            token: None,
            expires_at: None,
            authenticated: false,
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Token of the authenticated session, if any
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Expiry of the in-memory session, if any
    pub fn expires_at(&self) -> Option<i64> {
        self.expires_at
    }

    /// Whether the in-memory mirror holds an authenticated session
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Persist a fresh session and mark the store authenticated
    ///
    /// # Errors
    /// * `StorageError::Io` if the directory or file cannot be written
    pub fn save(&mut self, token: &str, expires_at: i64) -> Result<Session, StorageError> {
        let session = Session {
            token: token.to_string(),
            expires_at,
            login_time: now_millis(),
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&session)?;
        fs::write(&self.path, json)?;

        self.token = Some(session.token.clone());
        self.expires_at = Some(expires_at);
        self.authenticated = true;
        tracing::info!(expires_at = expires_at, "Session saved");
        Ok(session)
    }

    /// Read the persisted session
    ///
    /// An expired or unreadable record is removed and reported as absent.
    pub fn load(&self) -> Option<Session> {
        self.load_at(now_millis())
    }

    /// [`load`](Self::load) against an explicit clock
    pub fn load_at(&self, now_ms: i64) -> Option<Session> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read session");
                return None;
            }
        };

        let session: Session = match serde_json::from_str(&json) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding corrupt session record");
                self.remove_file();
                return None;
            }
        };

        if !session.is_valid_at(now_ms) {
            tracing::info!(expires_at = session.expires_at, "Stored session expired");
            self.remove_file();
            return None;
        }

        Some(session)
    }

    /// Remove the persisted session and reset the in-memory mirror
    pub fn clear(&mut self) {
        self.remove_file();
        self.token = None;
        self.expires_at = None;
        self.authenticated = false;
        tracing::info!("Session cleared");
    }

    /// Re-read storage, sync the in-memory mirror, and report validity
    pub fn is_valid(&mut self) -> bool {
        self.is_valid_at(now_millis())
    }

    /// [`is_valid`](Self::is_valid) against an explicit clock
    pub fn is_valid_at(&mut self, now_ms: i64) -> bool {
        match self.load_at(now_ms) {
            Some(session) => {
                self.token = Some(session.token);
                self.expires_at = Some(session.expires_at);
                self.authenticated = true;
                true
            }
            None => {
                self.token = None;
                self.expires_at = None;
                self.authenticated = false;
                false
            }
        }
    }

    fn remove_file(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove session");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::new(dir.path());

        let far_future = now_millis() + 60_000;
        store.save("tok-1", far_future).unwrap();

        assert!(store.is_authenticated());
        assert_eq!(store.token(), Some("tok-1"));

        let loaded = store.load().unwrap();
        assert_eq!(loaded.token, "tok-1");
        assert_eq!(loaded.expires_at, far_future);
        assert!(loaded.login_time <= now_millis());
    }

    #[test]
    fn test_save_creates_data_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut store = SessionStore::new(&nested);
        store.save("tok", now_millis() + 1_000).unwrap();
        assert!(nested.join(SESSION_FILE_NAME).exists());
    }

    #[test]
    fn test_expired_session_is_purged_on_read() {
        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::new(dir.path());
        store.save("old", 1_000).unwrap();

        assert!(store.load_at(2_000).is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let session = Session {
            token: "t".to_string(),
            expires_at: 5_000,
            login_time: 0,
        };
        assert!(session.is_valid_at(4_999));
        assert!(!session.is_valid_at(5_000));
    }

    #[test]
    fn test_is_valid_rehydrates_memory() {
        let dir = TempDir::new().unwrap();
        let expires = now_millis() + 60_000;
        SessionStore::new(dir.path()).save("persisted", expires).unwrap();

        // A fresh store knows nothing until it reads storage
        let mut store = SessionStore::new(dir.path());
        assert!(!store.is_authenticated());
        assert!(store.is_valid());
        assert_eq!(store.token(), Some("persisted"));
        assert_eq!(store.expires_at(), Some(expires));
    }

    #[test]
    fn test_is_valid_drops_memory_when_storage_expired() {
        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::new(dir.path());
        store.save("tok", 10_000).unwrap();

        assert!(!store.is_valid_at(10_001));
        assert!(!store.is_authenticated());
        assert_eq!(store.token(), None);
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::new(dir.path());
        store.save("tok", now_millis() + 60_000).unwrap();

        store.clear();
        assert!(!store.is_authenticated());
        assert!(store.load().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_corrupt_record_is_discarded() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());
        std::fs::write(store.path(), "{not json").unwrap();

        assert!(store.load().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_record_uses_camel_case() {
        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::new(dir.path());
        store.save("tok", 42).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"expiresAt\""));
        assert!(raw.contains("\"loginTime\""));
    }
}
