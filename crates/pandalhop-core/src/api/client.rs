//! API client for the pandal-hopping REST API.
//!
//! This module provides the `ApiClient` struct: token endpoints go straight
//! to the transport, resource endpoints go through the `AuthPipeline`.

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::auth::{CredentialPair, CredentialStore};
use crate::config::Config;
use crate::models::{
    AdministrativeData, CreatePandalInput, DataEnvelope, District, FoodStop, InsertedPandal, Pandal,
    Route, RouteWithStops,
};

use super::pipeline::{AuthPipeline, RefreshPolicy};
use super::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";
const REFRESH_PATH: &str = "/auth/refresh";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisteredUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterResponse {
    pub message: String,
    pub user: Option<RegisteredUser>,
}

/// Restrict pandal listings to a radius around a point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyQuery {
    pub longitude: f64,
    pub latitude: f64,
    /// Search radius in meters
    pub radius: f64,
}

impl NearbyQuery {
    fn query_string(&self) -> String {
        format!(
            "?lng={}&lat={}&radius={}",
            self.longitude, self.latitude, self.radius
        )
    }
}

/// API client for the pandal-hopping service.
/// Clone is cheap - the pipeline and its transport are shared behind `Arc`.
#[derive(Clone)]
pub struct ApiClient {
    pipeline: Arc<AuthPipeline>,
    base_url: String,
}

impl ApiClient {
    /// Create a client talking HTTP to the configured API
    pub fn new(config: &Config, store: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self::with_transport(
            &config.api_base_url,
            Arc::new(transport),
            store,
            config.refresh_policy,
        ))
    }

    /// Create a client over any transport
    pub fn with_transport(
        base_url: &str,
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        policy: RefreshPolicy,
    ) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let refresh_url = format!("{}{}", base_url, REFRESH_PATH);
        Self {
            pipeline: Arc::new(AuthPipeline::new(transport, store, refresh_url, policy)),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credential_store(&self) -> &Arc<dyn CredentialStore> {
        self.pipeline.store()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ===== Token Endpoints =====

    /// Exchange email and password for a credential pair. Does not persist it.
    pub async fn login(&self, email: &str, password: &str) -> Result<CredentialPair, ApiError> {
        let body = serde_json::to_value(LoginRequest { email, password })
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        let response = self.unauthenticated(ApiRequest::post(self.url(LOGIN_PATH), body)).await?;
        response.error_for_status()?.json()
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse, ApiError> {
        let body = serde_json::to_value(RegisterRequest { name, email, password })
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        let response = self
            .unauthenticated(ApiRequest::post(self.url(REGISTER_PATH), body))
            .await?;
        response.error_for_status()?.json()
    }

    /// Token endpoints bypass the pipeline so a rejected login never
    /// triggers a refresh attempt.
    async fn unauthenticated(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.pipeline.transport().dispatch(&request).await
    }

    // ===== Request Helpers =====

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let url = request.url.clone();
        let response = self.pipeline.send(request).await?.error_for_status()?;
        let envelope: DataEnvelope<T> = response.json()?;
        debug!(url = %url, "Fetched resource");
        Ok(envelope.data)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.fetch(ApiRequest::get(self.url(path))).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)
            .map_err(|e| ApiError::Validation(format!("Failed to encode request body: {}", e)))?;
        self.fetch(ApiRequest::post(self.url(path), body)).await
    }

    async fn put<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.fetch(ApiRequest::put(self.url(path))).await
    }

    // ===== Pandals =====

    /// Approved pandals, optionally limited to a radius around a point
    pub async fn list_approved(&self, near: Option<NearbyQuery>) -> Result<Vec<Pandal>, ApiError> {
        let query = near.map(|n| n.query_string()).unwrap_or_default();
        self.get(&format!("/pandals/{}", query)).await
    }

    /// Pandals waiting for community approval
    pub async fn list_pending(&self) -> Result<Vec<Pandal>, ApiError> {
        self.get("/pandals/pending").await
    }

    /// Submit a new pandal; it starts out pending. Returns the assigned id.
    pub async fn create_pandal(&self, input: &CreatePandalInput) -> Result<String, ApiError> {
        let input = input.normalized()?;
        let inserted: InsertedPandal = self.post("/pandals/", &input).await?;
        Ok(inserted.inserted_id)
    }

    pub async fn list_districts(&self) -> Result<Vec<District>, ApiError> {
        self.get("/pandals/districts").await
    }

    /// Cast the current user's approval vote
    pub async fn approve_pandal(&self, id: &str) -> Result<Pandal, ApiError> {
        if id.trim().is_empty() {
            return Err(ApiError::Validation("Pandal id is required".to_string()));
        }
        self.put(&format!("/pandals/{}/approve", id.trim())).await
    }

    // ===== Food =====

    pub async fn list_food_stops(&self) -> Result<Vec<FoodStop>, ApiError> {
        self.get("/food/").await
    }

    pub async fn get_food_stop(&self, id: &str) -> Result<FoodStop, ApiError> {
        self.get(&format!("/food/{}", id)).await
    }

    // ===== Routes =====

    pub async fn list_routes(&self) -> Result<Vec<Route>, ApiError> {
        self.get("/routes/").await
    }

    /// Route detail with its stops expanded
    pub async fn get_route(&self, id: &str) -> Result<RouteWithStops, ApiError> {
        self.get(&format!("/routes/{}", id)).await
    }

    // ===== Locations =====

    /// Supported regions, optionally filtered by country and state code
    pub async fn administrative_data(
        &self,
        country: Option<&str>,
        state: Option<&str>,
    ) -> Result<AdministrativeData, ApiError> {
        let params: Vec<String> = [("country", country), ("state", state)]
            .iter()
            .filter_map(|(key, value)| value.map(|v| format!("{}={}", key, v)))
            .collect();
        let path = if params.is_empty() {
            "/locations/administrative".to_string()
        } else {
            format!("/locations/administrative?{}", params.join("&"))
        };
        self.get(&path).await
    }
}
