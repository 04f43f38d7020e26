//! Request/response types and the transport the pipeline dispatches through.
//!
//! `Transport` is the only place the network is touched. `HttpTransport` is the
//! reqwest-backed implementation; tests substitute scripted fakes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::ApiError;

/// An outbound call. Created per request and discarded once it settles.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: header::HeaderMap,
    pub body: Option<serde_json::Value>,
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: header::HeaderMap::new(),
            body: None,
            retried: false,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::POST, url).with_body(body)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach a bearer credential, replacing any previous one.
    /// Returns false (and leaves the request unauthenticated) if the token
    /// cannot be encoded as a header value.
    pub fn set_bearer(&mut self, token: &str) -> bool {
        match header::HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                self.headers.insert(header::AUTHORIZATION, value);
                true
            }
            Err(_) => {
                self.headers.remove(header::AUTHORIZATION);
                false
            }
        }
    }

    /// The bearer token currently attached, if any
    pub fn bearer(&self) -> Option<&str> {
        self.headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }

    /// Check-and-set the retry flag. Returns true only the first time.
    pub fn mark_retried(&mut self) -> bool {
        if self.retried {
            return false;
        }
        self.retried = true;
        true
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }

    /// Pass successful responses through, map everything else to an `ApiError`
    pub fn error_for_status(self) -> Result<Self, ApiError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ApiError::from_status(self.status, &self.body))
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON response: {}", e)))
    }
}

/// Dispatches a single request and reports whatever the server answered.
/// Non-2xx statuses are responses, not errors; only transport failures are `Err`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// reqwest-backed transport.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport whose every dispatch fails with `ApiError::Network`
    /// after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone())
            .header(header::ACCEPT, "application/json");
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(method = %request.method, url = %request.url, status = status.as_u16(), "Request completed");

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_retried_is_single_use() {
        let mut request = ApiRequest::get("http://localhost/pandals/");
        assert!(!request.is_retried());
        assert!(request.mark_retried());
        assert!(!request.mark_retried());
        assert!(request.is_retried());
    }

    #[test]
    fn test_set_bearer_replaces_previous_token() {
        let mut request = ApiRequest::get("http://localhost/pandals/");
        assert_eq!(request.bearer(), None);

        assert!(request.set_bearer("old"));
        assert!(request.set_bearer("new"));
        assert_eq!(request.bearer(), Some("new"));
        assert_eq!(request.headers.get_all(header::AUTHORIZATION).iter().count(), 1);
    }

    #[test]
    fn test_set_bearer_rejects_unencodable_token() {
        let mut request = ApiRequest::get("http://localhost/pandals/");
        request.set_bearer("good");
        assert!(!request.set_bearer("bad\ntoken"));
        assert_eq!(request.bearer(), None);
    }

    #[test]
    fn test_error_for_status() {
        let ok = ApiResponse::new(StatusCode::OK, "{}");
        assert!(ok.error_for_status().is_ok());

        let denied = ApiResponse::new(StatusCode::UNAUTHORIZED, "");
        assert!(denied.is_unauthorized());
        assert!(matches!(denied.error_for_status(), Err(ApiError::AuthExpired)));
    }
}
