use std::sync::Arc;

use tracing::info;

use super::{CredentialPair, CredentialStore};
use crate::api::{ApiClient, ApiError, RegisterResponse};

/// Login state on top of the credential store. Being logged in means the
/// store holds a pair; the pipeline keeps it fresh from there.
pub struct SessionManager {
    client: ApiClient,
    store: Arc<dyn CredentialStore>,
}

impl SessionManager {
    pub fn new(client: ApiClient) -> Self {
        let store = client.credential_store().clone();
        Self { client, store }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Log in and persist the issued pair
    pub async fn login(&self, email: &str, password: &str) -> Result<CredentialPair, ApiError> {
        let pair = self.client.login(email, password).await?;
        self.store.save(&pair)?;
        info!(email = email, "Logged in");
        Ok(pair)
    }

    /// Create an account, then log straight into it
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(RegisterResponse, CredentialPair), ApiError> {
        let registered = self.client.register(name, email, password).await?;
        let pair = self.login(email, password).await?;
        Ok((registered, pair))
    }

    /// Forget the stored credentials. Safe to call when already logged out.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.store.clear()?;
        info!("Logged out");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.load().is_some()
    }

    /// Lifetime in seconds of the stored access token when it was issued
    pub fn token_lifetime(&self) -> Option<i64> {
        self.store.load().map(|p| p.expires_in)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use reqwest::StatusCode;

    use super::*;
    use crate::api::{ApiRequest, ApiResponse, RefreshPolicy, Transport};
    use crate::auth::{MemoryCredentialStore, StorageError};

    #[derive(Default)]
    struct Replies {
        queue: Mutex<VecDeque<ApiResponse>>,
        urls: Mutex<Vec<String>>,
    }

    impl Replies {
        fn with(replies: Vec<ApiResponse>) -> Self {
            Self {
                queue: Mutex::new(replies.into()),
                urls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for Replies {
        async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
            self.urls.lock().unwrap().push(request.url.clone());
            Ok(self.queue.lock().unwrap().pop_front().expect("no reply queued"))
        }
    }

    struct LockedKeychain;

    impl CredentialStore for LockedKeychain {
        fn save(&self, _pair: &CredentialPair) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("keychain locked".to_string()))
        }

        fn load(&self) -> Option<CredentialPair> {
            None
        }

        fn clear(&self) -> Result<(), StorageError> {
            Ok(())
        }
    }

    const TOKENS: &str = r#"{"access_token":"a1","refresh_token":"r1","expires_in":3599}"#;

    fn session(transport: Arc<Replies>, store: Arc<dyn CredentialStore>) -> SessionManager {
        SessionManager::new(ApiClient::with_transport(
            "http://api.test/api/v1",
            transport,
            store,
            RefreshPolicy::Independent,
        ))
    }

    #[tokio::test]
    async fn test_login_persists_pair() {
        let transport = Arc::new(Replies::with(vec![ApiResponse::new(StatusCode::OK, TOKENS)]));
        let store = Arc::new(MemoryCredentialStore::new());
        let session = session(transport.clone(), store.clone());

        assert!(!session.is_authenticated());
        let pair = session.login("mou@example.com", "secret").await.unwrap();

        assert_eq!(pair.access_token, "a1");
        assert_eq!(store.load(), Some(pair));
        assert!(session.is_authenticated());
        assert_eq!(session.token_lifetime(), Some(3599));
        assert_eq!(
            transport.urls.lock().unwrap().as_slice(),
            ["http://api.test/api/v1/auth/login"]
        );
    }

    #[tokio::test]
    async fn test_failed_login_does_not_refresh() {
        let transport = Arc::new(Replies::with(vec![ApiResponse::new(
            StatusCode::UNAUTHORIZED,
            r#"{"error":"invalid email or password"}"#,
        )]));
        let store = Arc::new(MemoryCredentialStore::new());
        let session = session(transport.clone(), store.clone());

        let err = session.login("mou@example.com", "wrong").await.unwrap_err();
        assert!(err.is_auth_expired());
        assert_eq!(transport.urls.lock().unwrap().len(), 1);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_surfaces_storage_error() {
        let transport = Arc::new(Replies::with(vec![ApiResponse::new(StatusCode::OK, TOKENS)]));
        let session = session(transport, Arc::new(LockedKeychain));

        let err = session.login("mou@example.com", "secret").await.unwrap_err();
        assert!(matches!(err, ApiError::Storage(StorageError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_register_logs_in_afterwards() {
        let transport = Arc::new(Replies::with(vec![
            ApiResponse::new(
                StatusCode::CREATED,
                r#"{"message":"user registered successfully","user":{"id":"u1","name":"Mou","email":"mou@example.com"}}"#,
            ),
            ApiResponse::new(StatusCode::OK, TOKENS),
        ]));
        let store = Arc::new(MemoryCredentialStore::new());
        let session = session(transport.clone(), store.clone());

        let (registered, pair) = session.register("Mou", "mou@example.com", "secret").await.unwrap();
        assert_eq!(registered.user.map(|u| u.id), Some("u1".to_string()));
        assert_eq!(store.load(), Some(pair));
        assert_eq!(
            transport.urls.lock().unwrap().as_slice(),
            [
                "http://api.test/api/v1/auth/register",
                "http://api.test/api/v1/auth/login"
            ]
        );
    }

    #[tokio::test]
    async fn test_register_conflict_skips_login() {
        let transport = Arc::new(Replies::with(vec![ApiResponse::new(
            StatusCode::CONFLICT,
            r#"{"error":"email already in use"}"#,
        )]));
        let session = session(transport.clone(), Arc::new(MemoryCredentialStore::new()));

        let err = session.register("Mou", "mou@example.com", "secret").await.unwrap_err();
        assert_eq!(err.to_string(), "Request rejected: email already in use");
        assert_eq!(transport.urls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_logout_is_idempotent() {
        let store = Arc::new(MemoryCredentialStore::with_pair(CredentialPair {
            access_token: "a1".to_string(),
            refresh_token: "r1".to_string(),
            expires_in: 3600,
        }));
        let session = session(Arc::new(Replies::default()), store);

        session.logout().unwrap();
        assert!(!session.is_authenticated());
        session.logout().unwrap();
    }
}
