//! Application configuration management.
//!
//! This module handles loading the application configuration:
//! the backend URL, the job poll interval, the history page size, and
//! where the bearer token is kept.
//!
//! Configuration is stored at `~/.config/faltu/config.json`. The
//! `FALTU_BACKEND_URL` and `FALTU_POLL_INTERVAL_SECS` environment variables
//! override the file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::{CredentialStore, FileCredentialStore, KeyringCredentialStore};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "faltu";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Seconds between job status fetches
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Number of recent analyses shown in history listings
const DEFAULT_HISTORY_LIMIT: usize = 5;

const BACKEND_URL_ENV: &str = "FALTU_BACKEND_URL";
const POLL_INTERVAL_ENV: &str = "FALTU_POLL_INTERVAL_SECS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend_url: String,
    pub poll_interval_secs: u64,
    pub history_limit: usize,
    pub credential_backend: CredentialBackend,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            credential_backend: CredentialBackend::File,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(BACKEND_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.backend_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(POLL_INTERVAL_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.poll_interval_secs = secs,
                Err(_) => warn!(value = %raw, "Ignoring invalid {}", POLL_INTERVAL_ENV),
            }
        }
    }

    /// Poll interval, never shorter than one second
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn credential_store(&self) -> Result<Box<dyn CredentialStore>> {
        Ok(match self.credential_backend {
            CredentialBackend::File => Box::new(FileCredentialStore::new(self.cache_dir()?)),
            CredentialBackend::Keyring => Box::new(KeyringCredentialStore::new()),
        })
    }
}
