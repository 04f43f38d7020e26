//! Authentication module for managing sessions and credentials.
//!
//! This module provides:
//! - `CredentialStore`: secure storage for the access/refresh token pair,
//!   backed by the OS keychain (`KeyringCredentialStore`) or process memory
//!   (`MemoryCredentialStore`)
//! - `SessionManager`: login, registration and logout on top of the store

pub mod credentials;
pub mod session;

pub use credentials::{
    CredentialPair, CredentialStore, KeyringCredentialStore, MemoryCredentialStore, StorageError,
};
pub use session::SessionManager;
