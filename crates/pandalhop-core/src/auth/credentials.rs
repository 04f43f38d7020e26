use std::sync::Mutex;

use keyring::Entry;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Keychain service name
const SERVICE_NAME: &str = "pandalhop";

/// Keychain account holding the serialized credential pair
const ACCOUNT_NAME: &str = "session";

/// Access/refresh token pair as issued by the login and refresh endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Secure storage unavailable: {0}")]
    Unavailable(String),

    #[error("Stored credentials could not be encoded: {0}")]
    Encoding(String),
}

/// Holds at most one credential pair. A save always replaces the previous pair.
pub trait CredentialStore: Send + Sync {
    fn save(&self, pair: &CredentialPair) -> Result<(), StorageError>;

    /// Absence is the normal logged-out state, so this never fails.
    fn load(&self) -> Option<CredentialPair>;

    /// Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Credential store backed by the OS keychain.
///
/// Both tokens live in a single keychain secret so one write replaces the
/// whole pair.
pub struct KeyringCredentialStore {
    service: String,
    account: String,
}

impl KeyringCredentialStore {
    pub fn new() -> Self {
        Self::with_names(SERVICE_NAME, ACCOUNT_NAME)
    }

    pub fn with_names(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: account.into(),
        }
    }

    fn entry(&self) -> Result<Entry, StorageError> {
        Entry::new(&self.service, &self.account)
            .map_err(|e| StorageError::Unavailable(format!("Failed to create keyring entry: {}", e)))
    }
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn save(&self, pair: &CredentialPair) -> Result<(), StorageError> {
        let secret =
            serde_json::to_string(pair).map_err(|e| StorageError::Encoding(e.to_string()))?;
        self.entry()?
            .set_password(&secret)
            .map_err(|e| StorageError::Unavailable(format!("Failed to store credentials in keychain: {}", e)))
    }

    fn load(&self) -> Option<CredentialPair> {
        let entry = match self.entry() {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Keychain unavailable, treating as logged out");
                return None;
            }
        };

        let secret = match entry.get_password() {
            Ok(secret) => secret,
            Err(keyring::Error::NoEntry) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read credentials from keychain");
                return None;
            }
        };

        match serde_json::from_str(&secret) {
            Ok(pair) => Some(pair),
            Err(e) => {
                warn!(error = %e, "Stored credentials are unreadable, ignoring");
                None
            }
        }
    }

    fn clear(&self) -> Result<(), StorageError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StorageError::Unavailable(format!(
                "Failed to delete credentials from keychain: {}",
                e
            ))),
        }
    }
}

/// Process-local credential store for mock mode and tests.
#[derive(Default)]
pub struct MemoryCredentialStore {
    pair: Mutex<Option<CredentialPair>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pair(pair: CredentialPair) -> Self {
        Self {
            pair: Mutex::new(Some(pair)),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<CredentialPair>> {
        // A panic while holding the lock cannot leave a half-written pair
        self.pair.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save(&self, pair: &CredentialPair) -> Result<(), StorageError> {
        *self.slot() = Some(pair.clone());
        Ok(())
    }

    fn load(&self) -> Option<CredentialPair> {
        self.slot().clone()
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.slot() = None;
        Ok(())
    }
}
