use opiapi::{ApiError, CheckIn, ControlPlane, ControlPlaneClient, MediaItem};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> ControlPlaneClient {
    ControlPlaneClient::new(server.uri()).unwrap()
}

#[tokio::test]
async fn check_in_returns_token_on_created() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/device/check-in"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"macAddress": "AA:BB:CC:DD:EE:FF"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"accessToken": "T1"})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server)
        .await
        .check_in("AA:BB:CC:DD:EE:FF")
        .await
        .unwrap();

    assert_eq!(outcome, CheckIn::TokenAcquired("T1".to_string()));
}

#[tokio::test]
async fn check_in_accepts_ok_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/device/check-in"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "T2"})))
        .mount(&server)
        .await;

    let outcome = client_for(&server).await.check_in("01:02:03:04:05:06").await.unwrap();
    assert_eq!(outcome, CheckIn::TokenAcquired("T2".to_string()));
}

#[tokio::test]
async fn check_in_unauthorized_means_pending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/device/check-in"))
        .respond_with(ResponseTemplate::new(401).set_body_string("not assigned"))
        .mount(&server)
        .await;

    let outcome = client_for(&server).await.check_in("AA:BB:CC:DD:EE:FF").await.unwrap();
    assert_eq!(outcome, CheckIn::StillPending);
}

#[tokio::test]
async fn check_in_empty_token_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/device/check-in"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": ""})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .await
        .check_in("AA:BB:CC:DD:EE:FF")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::MissingToken));
}

#[tokio::test]
async fn check_in_other_status_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/device/check-in"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .await
        .check_in("AA:BB:CC:DD:EE:FF")
        .await
        .unwrap_err();

    match err {
        ApiError::Status { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "database down");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_media_sends_bearer_and_decodes_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/device/me/media"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "a!b", "url": "http://h/x.mkv", "name": "A"},
            {"id": "c", "url": "http://h/y", "name": "C"}
        ])))
        .mount(&server)
        .await;

    let items = client_for(&server).await.fetch_media("T1").await.unwrap();

    assert_eq!(
        items,
        vec![
            MediaItem::new("a!b", "http://h/x.mkv", "A"),
            MediaItem::new("c", "http://h/y", "C"),
        ]
    );
}

#[tokio::test]
async fn fetch_media_unauthorized_is_distinguishable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/device/me/media"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client_for(&server).await.fetch_media("stale").await.unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn fetch_media_malformed_json_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/device/me/media"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let err = client_for(&server).await.fetch_media("T1").await.unwrap_err();
    assert!(matches!(err, ApiError::Json(_)));
}

#[tokio::test]
async fn fetch_media_server_error_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/device/me/media"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client_for(&server).await.fetch_media("T1").await.unwrap_err();
    assert!(!err.is_unauthorized());
    assert!(err.to_string().contains("503"));
    assert!(err.to_string().contains("maintenance"));
}
