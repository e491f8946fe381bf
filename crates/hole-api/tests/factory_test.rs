#![allow(clippy::unwrap_used)]
// Integration tests for `HoleClient` version selection using wiremock.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hole_api::{
    ApiVersion, BlockingState, ConnectOptions, ConvergencePolicy, Endpoint, Error, ErrorKind,
    HoleClient,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn options(server: &MockServer) -> ConnectOptions {
    ConnectOptions::new(Endpoint::parse(&server.uri()).unwrap())
        .with_password(SecretString::from("hunter2".to_string()))
        .with_api_token(SecretString::from("tok".to_string()))
        .with_convergence(ConvergencePolicy {
            max_attempts: 2,
            interval: Duration::from_millis(1),
            strict: false,
        })
        .with_http_client(reqwest::Client::new())
}

// ── Selection tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_version_5_speaks_legacy_protocol() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/api.php"))
        .and(query_param("summaryRaw", ""))
        .and(query_param("auth", "tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "enabled",
            "dns_queries_today": 42
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = HoleClient::new(5, options(&server)).unwrap();
    assert_eq!(client.api_version(), ApiVersion::V5);

    client.refresh().await.unwrap();
    client.logout().await.unwrap();

    assert_eq!(client.status(), BlockingState::Enabled);
    assert_eq!(client.statistics().dns_queries_today, 42);
}

#[tokio::test]
async fn test_version_6_speaks_session_protocol() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session": {"valid": true, "sid": "S1", "csrf": "C1", "validity": 300}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/info/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": {
                "core": {
                    "local": {"version": "v6.0.4", "hash": "a"},
                    "remote": {"version": "v6.0.5", "hash": "b"}
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = HoleClient::new(6, options(&server)).unwrap();
    assert_eq!(client.api_version(), ApiVersion::V6);

    client.refresh_versions().await.unwrap();
    let versions = client.versions();
    assert!(versions.core.update_available);
    assert_eq!(versions.core.current.as_deref(), Some("v6.0.4"));

    client.logout().await.unwrap();
    assert!(!client.as_session().unwrap().session().is_active());
}

#[test]
fn test_version_7_is_config_error() {
    let endpoint = Endpoint::parse("http://pi.hole").unwrap();
    let result = HoleClient::new(7, ConnectOptions::new(endpoint));

    match result {
        Err(ref e @ Error::UnsupportedVersion(7)) => assert_eq!(e.kind(), ErrorKind::Config),
        other => panic!("expected UnsupportedVersion error, got: {other:?}"),
    }
}

#[test]
fn test_invalid_scheme_is_config_error() {
    let result = Endpoint::parse("ftp://pi.hole");

    assert!(
        matches!(result, Err(Error::InvalidProtocol(ref scheme)) if scheme == "ftp"),
        "expected InvalidProtocol error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_legacy_toggle_without_token_reports_none() {
    let server = MockServer::start().await;
    let options = ConnectOptions::new(Endpoint::parse(&server.uri()).unwrap());

    let mut client = HoleClient::new(5, options).unwrap();
    let change = client.enable().await.unwrap();

    assert!(change.is_none());
}

#[tokio::test]
async fn test_session_toggle_without_password_is_error() {
    let server = MockServer::start().await;
    let options = ConnectOptions::new(Endpoint::parse(&server.uri()).unwrap());

    let mut client = HoleClient::new(6, options).unwrap();
    let result = client.disable(10).await;

    assert!(
        matches!(result, Err(Error::MissingCredential("password"))),
        "expected MissingCredential error, got: {result:?}"
    );
}
