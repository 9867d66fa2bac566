//! Notification API Client Tests
//!
//! Tests verify, against a mock HTTP server:
//! - List and single-record endpoints and their query parameters
//! - Both list body shapes (envelope and bare array)
//! - Status codes map onto the right errors

use chrono::{DateTime, TimeZone, Utc};
use mockito::{Matcher, Server};

use oaigate::backend::{JperClient, NotificationSource};
use oaigate::cursor::Scope;
use oaigate::{Config, GateError};

fn since() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap()
}

fn client(base_url: &str, api_key: Option<&str>) -> JperClient {
    let mut builder = Config::builder().backend_url(base_url);
    if let Some(key) = api_key {
        builder = builder.backend_api_key(key);
    }
    JperClient::new(&builder.build()).unwrap()
}

const TWO_NOTIFICATIONS: &str = r#"[
    {"id": "a", "analysis_date": "2016-01-02T00:00:00Z", "metadata": {"title": "A"}},
    {"id": "b", "last_updated": "2016-01-03T00:00:00Z"}
]"#;

#[tokio::test]
async fn test_list_global_bare_array() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/routed")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("since".into(), "2016-01-01T00:00:00Z".into()),
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("pageSize".into(), "100".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(TWO_NOTIFICATIONS)
        .create_async()
        .await;

    let records = client(&server.url(), None)
        .list(&Scope::Global, since(), 2, 100)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "a");
    assert_eq!(records[0].metadata.title.as_deref(), Some("A"));
    assert_eq!(records[1].last_updated, Utc.with_ymd_and_hms(2016, 1, 3, 0, 0, 0).unwrap());
}

#[tokio::test]
async fn test_list_repository_envelope_with_api_key() {
    let mut server = Server::new_async().await;
    let body = format!(r#"{{"since": "2016-01-01", "page": 1, "pageSize": 100, "total": 2, "notifications": {TWO_NOTIFICATIONS}}}"#);
    let mock = server
        .mock("GET", "/api/v1/routed/repo-42")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("api_key".into(), "secret".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await;

    let base = format!("{}/api/v1", server.url());
    let records = client(&base, Some("secret"))
        .list(&Scope::Repository("repo-42".into()), since(), 1, 100)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_list_unknown_repository() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/routed/nobody")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let err = client(&server.url(), None)
        .list(&Scope::Repository("nobody".into()), since(), 1, 100)
        .await
        .unwrap_err();

    assert!(matches!(err, GateError::UnknownScope(ref id) if id == "nobody"), "{err:?}");
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/routed")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let err = client(&server.url(), None)
        .list(&Scope::Global, since(), 1, 100)
        .await
        .unwrap_err();

    assert!(err.is_transient(), "{err:?}");
}

#[tokio::test]
async fn test_client_error_is_rejected() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/routed")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body("bad key")
        .create_async()
        .await;

    let err = client(&server.url(), None)
        .list(&Scope::Global, since(), 1, 100)
        .await
        .unwrap_err();

    match err {
        GateError::BackendRejected { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "bad key");
        }
        other => panic!("expected BackendRejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_serialization_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/routed")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"unexpected": true}"#)
        .create_async()
        .await;

    let err = client(&server.url(), None)
        .list(&Scope::Global, since(), 1, 100)
        .await
        .unwrap_err();

    assert!(matches!(err, GateError::Serialization(_)), "{err:?}");
}

#[tokio::test]
async fn test_get_found_and_missing() {
    let mut server = Server::new_async().await;
    let found = server
        .mock("GET", "/notification/a")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": "a", "analysis_date": "2016-01-02 10:30:00"}"#)
        .create_async()
        .await;
    let _missing = server
        .mock("GET", "/notification/zzz")
        .with_status(404)
        .create_async()
        .await;

    let client = client(&server.url(), None);

    let record = client.get("a").await.unwrap().unwrap();
    found.assert_async().await;
    assert_eq!(record.last_updated, Utc.with_ymd_and_hms(2016, 1, 2, 10, 30, 0).unwrap());

    assert!(client.get("zzz").await.unwrap().is_none());
}

#[test]
fn test_invalid_backend_url() {
    let config = Config::builder().backend_url("not a url").build();
    assert!(matches!(JperClient::new(&config), Err(GateError::Config(_))));
}
