//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: which API
//! to talk to, how long to wait for it, whether to serve mock data, and where
//! credentials are kept.
//!
//! Configuration is stored at `~/.config/pandalhop/config.json`. A few fields
//! can be overridden from the environment (see `apply_env`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::RefreshPolicy;
use crate::auth::{CredentialStore, KeyringCredentialStore, MemoryCredentialStore};

/// Application name used for config directory paths
const APP_NAME: &str = "pandalhop";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/v1";

/// HTTP request timeout in seconds
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Simulated network delay for mock data
const DEFAULT_MOCK_LATENCY_MS: u64 = 500;

pub const ENV_API_URL: &str = "PANDALHOP_API_URL";
pub const ENV_USE_MOCK_DATA: &str = "PANDALHOP_USE_MOCK_DATA";
pub const ENV_REFRESH_POLICY: &str = "PANDALHOP_REFRESH_POLICY";

/// Where the credential pair is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    #[default]
    Keyring,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub use_mock_data: bool,
    pub mock_latency_ms: u64,
    pub refresh_policy: RefreshPolicy,
    pub credential_backend: CredentialBackend,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            use_mock_data: false,
            mock_latency_ms: DEFAULT_MOCK_LATENCY_MS,
            refresh_policy: RefreshPolicy::default(),
            credential_backend: CredentialBackend::default(),
            last_email: None,
        }
    }
}

impl Config {
    /// Load from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from a specific file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Override fields from environment-style lookups. Unparseable values are
    /// ignored with a warning.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }

        if let Some(value) = lookup(ENV_USE_MOCK_DATA) {
            match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.use_mock_data = true,
                "0" | "false" | "no" => self.use_mock_data = false,
                other => warn!(value = other, "Ignoring invalid {}", ENV_USE_MOCK_DATA),
            }
        }

        if let Some(value) = lookup(ENV_REFRESH_POLICY) {
            match value.parse::<RefreshPolicy>() {
                Ok(policy) => self.refresh_policy = policy,
                Err(e) => warn!(error = %e, "Ignoring invalid {}", ENV_REFRESH_POLICY),
            }
        }
    }

    /// Build the credential store selected by `credential_backend`
    pub fn credential_store(&self) -> Arc<dyn CredentialStore> {
        match self.credential_backend {
            CredentialBackend::Keyring => Arc::new(KeyringCredentialStore::new()),
            CredentialBackend::Memory => Arc::new(MemoryCredentialStore::new()),
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}
