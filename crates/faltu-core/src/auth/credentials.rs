use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};

/// Credential file name in cache directory
const CREDENTIAL_FILE: &str = "credential.json";

const SERVICE_NAME: &str = "faltu";

/// Keychain account under which the bearer token is stored
const KEYRING_ACCOUNT: &str = "bearer-token";

/// Persistence for the bearer token.
///
/// Only `AuthGate` writes through this trait; everything else reads the
/// token from the gate.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCredential {
    token: String,
    stored_at: DateTime<Utc>,
}

/// Stores the token as JSON in the cache directory.
pub struct FileCredentialStore {
    cache_dir: PathBuf,
}

impl FileCredentialStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    fn credential_path(&self) -> PathBuf {
        self.cache_dir.join(CREDENTIAL_FILE)
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<String>> {
        let path = self.credential_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents =
            std::fs::read_to_string(&path).context("Failed to read credential file")?;
        let stored: StoredCredential =
            serde_json::from_str(&contents).context("Failed to parse credential file")?;
        Ok(Some(stored.token))
    }

    fn save(&self, token: &str) -> Result<()> {
        let path = self.credential_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let stored = StoredCredential {
            token: token.to_string(),
            stored_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&stored)?;
        std::fs::write(&path, contents).context("Failed to write credential file")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.credential_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove credential file")?;
        }
        Ok(())
    }
}

/// Stores the token in the OS keychain.
pub struct KeyringCredentialStore {
    account: String,
}

impl KeyringCredentialStore {
    pub fn new() -> Self {
        Self {
            account: KEYRING_ACCOUNT.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(SERVICE_NAME, &self.account).context("Failed to create keyring entry")
    }
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn load(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        self.entry()?
            .set_password(token)
            .context("Failed to store token in keychain")
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

/// Process-local store, for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<String>> {
        let guard = self
            .token
            .lock()
            .map_err(|_| anyhow::anyhow!("Credential lock poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|_| anyhow::anyhow!("Credential lock poisoned"))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|_| anyhow::anyhow!("Credential lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested"));
        assert_eq!(store.load().unwrap(), None);

        store.save("tok-1").unwrap();
        let reopened = FileCredentialStore::new(dir.path().join("nested"));
        assert_eq!(reopened.load().unwrap().as_deref(), Some("tok-1"));

        reopened.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CREDENTIAL_FILE), "{not json").unwrap();
        let store = FileCredentialStore::new(dir.path().to_path_buf());
        assert!(store.load().is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryCredentialStore::with_token("abc");
        assert_eq!(store.load().unwrap().as_deref(), Some("abc"));
        store.save("def").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("def"));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
