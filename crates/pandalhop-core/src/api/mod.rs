//! REST API client module for the pandal-hopping service.
//!
//! This module provides the `ApiClient` for listing, submitting and approving
//! pandals and for reading food stops, routes and administrative regions.
//!
//! Every resource call goes through the `AuthPipeline`, which attaches the
//! stored bearer token and transparently refreshes it once on a 401.

pub mod client;
pub mod error;
pub mod pipeline;
pub mod transport;

pub use client::{ApiClient, NearbyQuery, RegisterResponse};
pub use error::ApiError;
pub use pipeline::{AuthPipeline, RefreshPolicy};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
