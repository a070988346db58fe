use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::errors::AdvisorError;

/// The fixed key under which the bearer token is persisted.
pub const TOKEN_KEY: &str = "token";

/// Durable client-side storage for the bearer token. Nothing else is persisted.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, AdvisorError>;
    fn save(&self, token: &str) -> Result<(), AdvisorError>;
    /// Removes the persisted token. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), AdvisorError>;
}

/// Persists the token as `{"token": "..."}` in a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, AdvisorError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        // An unreadable file is treated as no session so that a fresh login can overwrite it
        let mut entries: BTreeMap<String, String> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Ignoring unreadable session file {}: {e}", self.path.display());
                return Ok(None);
            }
        };
        Ok(entries.remove(TOKEN_KEY).filter(|token| !token.is_empty()))
    }

    fn save(&self, token: &str) -> Result<(), AdvisorError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let entries = BTreeMap::from([(TOKEN_KEY, token)]);
        std::fs::write(&self.path, serde_json::to_vec(&entries)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), AdvisorError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, AdvisorError> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, token: &str) -> Result<(), AdvisorError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), AdvisorError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
