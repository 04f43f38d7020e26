//! Authenticated request pipeline.
//!
//! Every resource request flows attach -> dispatch -> (on 401) refresh ->
//! redispatch. Each request is retried at most once; a failed refresh purges
//! the stored credentials and hands the original 401 back to the caller.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::auth::{CredentialPair, CredentialStore};

use super::transport::{ApiRequest, ApiResponse, Transport};
use super::ApiError;

/// How concurrent 401s coordinate their refresh calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Each request refreshes on its own; concurrent siblings may each hit the
    /// refresh endpoint and the last saved pair wins.
    #[default]
    Independent,
    /// Refreshes are serialized; a request that finds the pair already rotated
    /// by a sibling reuses it instead of refreshing again.
    SingleFlight,
}

impl std::str::FromStr for RefreshPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "independent" => Ok(RefreshPolicy::Independent),
            "single_flight" => Ok(RefreshPolicy::SingleFlight),
            other => Err(format!("unknown refresh policy: {}", other)),
        }
    }
}

pub struct AuthPipeline {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    refresh_url: String,
    policy: RefreshPolicy,
    refresh_lock: Mutex<()>,
}

impl AuthPipeline {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        refresh_url: impl Into<String>,
        policy: RefreshPolicy,
    ) -> Self {
        Self {
            transport,
            store,
            refresh_url: refresh_url.into(),
            policy,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// Send a request with the stored bearer token, refreshing once on 401.
    ///
    /// Any HTTP status comes back as `Ok`; only transport failures are `Err`.
    /// A 401 returned from here means the session could not be recovered.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let sent_token = self.attach_credentials(&mut request);
        let response = self.transport.dispatch(&request).await?;

        if !response.is_unauthorized() {
            return Ok(response);
        }

        if !request.mark_retried() {
            debug!(url = %request.url, "401 on retried request, giving up");
            return Ok(response);
        }

        let access_token = match self.recover(sent_token.as_deref()).await {
            Some(token) => token,
            None => return Ok(response),
        };

        if !request.set_bearer(&access_token) {
            warn!(url = %request.url, "Refreshed access token is not a valid header value");
            return Ok(response);
        }

        debug!(method = %request.method, url = %request.url, "Retrying with refreshed token");
        self.transport.dispatch(&request).await
    }

    /// Attach the stored access token if there is one; returns what was sent.
    fn attach_credentials(&self, request: &mut ApiRequest) -> Option<String> {
        let pair = self.store.load()?;
        if request.set_bearer(&pair.access_token) {
            Some(pair.access_token)
        } else {
            warn!("Stored access token is not a valid header value, sending unauthenticated");
            None
        }
    }

    /// Obtain a fresh access token after a 401, per the configured policy.
    async fn recover(&self, sent_token: Option<&str>) -> Option<String> {
        match self.policy {
            RefreshPolicy::Independent => self.refresh().await,
            RefreshPolicy::SingleFlight => {
                let _guard = self.refresh_lock.lock().await;
                if let Some(current) = self.store.load() {
                    if sent_token != Some(current.access_token.as_str()) {
                        debug!("Credentials already rotated by a concurrent request");
                        return Some(current.access_token);
                    }
                }
                self.refresh().await
            }
        }
    }

    async fn refresh(&self) -> Option<String> {
        let refresh_token = match self.store.load() {
            Some(pair) => pair.refresh_token,
            None => {
                debug!("No refresh token stored, session cannot be recovered");
                self.purge();
                return None;
            }
        };

        match self.exchange(&refresh_token).await {
            Ok(pair) => {
                if let Err(e) = self.store.save(&pair) {
                    warn!(error = %e, "Failed to persist refreshed credentials");
                }
                debug!(expires_in = pair.expires_in, "Access token refreshed");
                Some(pair.access_token)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, clearing stored credentials");
                self.purge();
                None
            }
        }
    }

    /// Trade a refresh token for a new pair. Goes straight to the transport so
    /// the refresh call itself is never intercepted.
    async fn exchange(&self, refresh_token: &str) -> Result<CredentialPair, ApiError> {
        let request = ApiRequest::post(
            self.refresh_url.as_str(),
            serde_json::json!({ "refresh_token": refresh_token }),
        );
        let response = self.transport.dispatch(&request).await?.error_for_status()?;
        response.json()
    }

    fn purge(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear stored credentials");
        }
    }
}
