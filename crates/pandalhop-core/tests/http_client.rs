//! End-to-end tests for `ApiClient` over real HTTP against a mock server.

use std::sync::Arc;
use std::time::Duration;

use pandalhop_core::api::{ApiClient, ApiError, HttpTransport, NearbyQuery, RefreshPolicy};
use pandalhop_core::auth::{CredentialPair, CredentialStore, MemoryCredentialStore};
use pandalhop_core::models::{CreatePandalInput, Location};
use pandalhop_core::services::{ApiDataService, DataService};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pair(access: &str, refresh: &str) -> CredentialPair {
    CredentialPair {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        expires_in: 3600,
    }
}

fn client(server: &MockServer, store: Arc<MemoryCredentialStore>, timeout: Duration) -> ApiClient {
    ApiClient::with_transport(
        &format!("{}/api/v1", server.uri()),
        Arc::new(HttpTransport::new(timeout).unwrap()),
        store,
        RefreshPolicy::Independent,
    )
}

fn pandals_body() -> serde_json::Value {
    json!({
        "data": [{
            "id": "p1",
            "name": "Suruchi Sangha",
            "area": "New Alipore",
            "location": {"type": "Point", "coordinates": [88.3308, 22.5186]},
            "status": "approved"
        }]
    })
}

#[tokio::test]
async fn test_unauthenticated_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/pandals/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pandals_body()))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let pandals = client(&server, store, Duration::from_secs(5))
        .list_approved(None)
        .await
        .unwrap();

    assert_eq!(pandals.len(), 1);
    assert_eq!(pandals[0].name, "Suruchi Sangha");

    let received = server.received_requests().await.unwrap();
    assert!(received[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_expired_token_refreshes_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/pandals/"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "token expired"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .and(body_json(json!({"refresh_token": "r1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh",
            "refresh_token": "r2",
            "expires_in": 3599
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/pandals/"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pandals_body()))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_pair(pair("stale", "r1")));
    let pandals = client(&server, store.clone(), Duration::from_secs(5))
        .list_approved(None)
        .await
        .unwrap();

    assert_eq!(pandals.len(), 1);
    assert_eq!(
        store.load(),
        Some(CredentialPair {
            access_token: "fresh".to_string(),
            refresh_token: "r2".to_string(),
            expires_in: 3599,
        })
    );
}

#[tokio::test]
async fn test_rejected_refresh_surfaces_auth_expired() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/routes/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": "invalid or expired refresh token"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_pair(pair("stale", "r1")));
    let err = client(&server, store.clone(), Duration::from_secs(5))
        .list_routes()
        .await
        .unwrap_err();

    assert!(err.is_auth_expired());
    assert_eq!(store.load(), None);
}

#[tokio::test]
async fn test_timeout_is_network_error_without_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/food/"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_pair(pair("good", "r1")));
    let err = client(&server, store.clone(), Duration::from_millis(200))
        .list_food_stops()
        .await
        .unwrap_err();

    assert!(err.is_network_error());
    assert_eq!(store.load(), Some(pair("good", "r1")));
}

#[tokio::test]
async fn test_validation_error_carries_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/pandals/"))
        .and(query_param("lng", "200"))
        .and(query_param("lat", "22.5"))
        .and(query_param("radius", "1000"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Invalid lng or lat coordinates"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let err = client(&server, store, Duration::from_secs(5))
        .list_approved(Some(NearbyQuery {
            longitude: 200.0,
            latitude: 22.5,
            radius: 1000.0,
        }))
        .await
        .unwrap_err();

    match err {
        ApiError::Validation(msg) => assert_eq!(msg, "Invalid lng or lat coordinates"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_create_and_approve_pandal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/pandals/"))
        .and(header("authorization", "Bearer good"))
        .and(body_json(json!({
            "name": "Bagbazar Sarbojanin",
            "area": "Bagbazar",
            "district": "KOL",
            "state": "WB",
            "country": "IN",
            "location": {"type": "Point", "coordinates": [88.3676, 22.6025]}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "Pandal inserted",
            "data": {"InsertedID": "66fb1c2e9d3a4b5c6d7e8f90"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/pandals/66fb1c2e9d3a4b5c6d7e8f90/approve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Pandal approval registered",
            "data": {
                "id": "66fb1c2e9d3a4b5c6d7e8f90",
                "name": "Bagbazar Sarbojanin",
                "status": "pending",
                "approvalCount": 1,
                "images": null
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_pair(pair("good", "r1")));
    let api = client(&server, store, Duration::from_secs(5));

    let input = CreatePandalInput {
        name: " Bagbazar Sarbojanin ".to_string(),
        area: "Bagbazar".to_string(),
        district: "KOL".to_string(),
        state: "WB".to_string(),
        country: "IN".to_string(),
        description: Some(String::new()),
        location: Location::point(88.3676, 22.6025),
        ..CreatePandalInput::default()
    };
    let id = api.create_pandal(&input).await.unwrap();
    assert_eq!(id, "66fb1c2e9d3a4b5c6d7e8f90");

    let approved = api.approve_pandal(&id).await.unwrap();
    assert_eq!(approved.approval_count, 1);
    assert!(approved.images.is_empty());
}

#[tokio::test]
async fn test_invalid_submission_never_reaches_server() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryCredentialStore::new());
    let api = client(&server, store, Duration::from_secs(5));

    let input = CreatePandalInput {
        name: "Nameless".to_string(),
        location: Location::point(88.0, 22.0),
        ..CreatePandalInput::default()
    };
    let err = api.create_pandal(&input).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_api_data_service_reads_districts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/pandals/districts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "KOL", "name": "Kolkata", "pandalCount": 450}]
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let service = ApiDataService::new(client(&server, store, Duration::from_secs(5)));
    let districts = service.get_districts().await.unwrap();
    assert_eq!(districts[0].pandal_count, 450);
}

#[tokio::test]
async fn test_login_posts_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({"email": "mou@example.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "a1",
            "refresh_token": "r1",
            "expires_in": 3599
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let pair = client(&server, store.clone(), Duration::from_secs(5))
        .login("mou@example.com", "secret")
        .await
        .unwrap();
    assert_eq!(pair.access_token, "a1");
    // ApiClient::login only exchanges; SessionManager persists
    assert_eq!(store.load(), None);
}
