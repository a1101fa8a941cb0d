//! Bearer-token persistence.
//!
//! The transport attaches `Authorization: Bearer {token}` to every call
//! when a token is present in the injected [`TokenStore`]; an absent token
//! is not an error at this layer (authorization is the server's call).
//!
//! Two implementations: [`MemoryTokenStore`] for tests and embedded use,
//! [`FileTokenStore`] for the CLI, which keeps the credential in a plain
//! file across invocations.

use std::path::PathBuf;
use std::sync::RwLock;

use log::warn;

/// Persistent storage for the bearer credential.
pub trait TokenStore: Send + Sync {
    /// Current token, if any.
    fn token(&self) -> Option<String>;
    /// Persist a new token, replacing any previous one.
    fn store(&self, token: &str);
    /// Drop the stored token.
    fn clear(&self);
}

/// In-memory token store.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct with a token already present.
    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        self.token.read().unwrap().clone()
    }

    fn store(&self, token: &str) {
        *self.token.write().unwrap() = Some(token.to_string());
    }

    fn clear(&self) {
        *self.token.write().unwrap() = None;
    }
}

/// File-backed token store used by the CLI.
///
/// Reads are best-effort: a missing or unreadable file means "no token".
/// Write failures are logged rather than propagated — losing the cached
/// credential only forces a re-login.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(token.to_string())
                }
            }
            Err(_) => None,
        }
    }

    fn store(&self, token: &str) {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                let _ = std::fs::create_dir_all(parent);
            }
        }
        if let Err(e) = std::fs::write(&self.path, token) {
            warn!("failed to persist token to {}: {}", self.path.display(), e);
        }
    }

    fn clear(&self) {
        if self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!("failed to remove token file {}: {}", self.path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.token(), None);
        store.store("abc123");
        assert_eq!(store.token(), Some("abc123".to_string()));
        store.clear();
        assert_eq!(store.token(), None);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("token"));
        assert_eq!(store.token(), None);
        store.store("tok-1");
        assert_eq!(store.token(), Some("tok-1".to_string()));
        store.store("tok-2");
        assert_eq!(store.token(), Some("tok-2".to_string()));
        store.clear();
        assert_eq!(store.token(), None);
    }

    #[test]
    fn test_file_store_ignores_whitespace() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "  tok-3\n").unwrap();
        let store = FileTokenStore::new(path);
        assert_eq!(store.token(), Some("tok-3".to_string()));
    }

    #[test]
    fn test_file_store_empty_file_is_no_token() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "\n").unwrap();
        let store = FileTokenStore::new(path);
        assert_eq!(store.token(), None);
    }
}
