//! Core library for pandalhop.
//!
//! Provides everything a front end needs to talk to the pandal-hopping API:
//!
//! - `api`: typed REST client, the bearer-token pipeline with one-shot
//!   refresh-and-retry, and the transport seam it dispatches through
//! - `auth`: secure credential storage and the login/logout session lifecycle
//! - `models`: pandals, districts, food stops, routes, administrative regions
//! - `services`: swappable mock/real data service
//! - `config`: user configuration with environment overrides

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod services;

pub use api::{ApiClient, ApiError, AuthPipeline, HttpTransport, RefreshPolicy, Transport};
pub use auth::{
    CredentialPair, CredentialStore, KeyringCredentialStore, MemoryCredentialStore,
    SessionManager, StorageError,
};
pub use config::{Config, CredentialBackend};
pub use services::{data_service, ApiDataService, DataService, MockDataService};
