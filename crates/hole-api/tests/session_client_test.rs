#![allow(clippy::unwrap_used)]
// Integration tests for `SessionClient` using wiremock.

use std::time::Duration;

use chrono::{TimeDelta, Utc};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hole_api::{
    BlockingState, ConvergencePolicy, Endpoint, Error, ErrorKind, SessionClient, SessionState,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn fast_policy(max_attempts: u32) -> ConvergencePolicy {
    ConvergencePolicy {
        max_attempts,
        interval: Duration::from_millis(1),
        strict: false,
    }
}

fn client_for(server: &MockServer, password: Option<&str>) -> SessionClient {
    let endpoint = Endpoint::parse(&server.uri()).unwrap();
    SessionClient::with_client(
        reqwest::Client::new(),
        endpoint,
        password.map(|p| SecretString::from(p.to_string())),
    )
    .with_convergence(fast_policy(3))
}

async fn setup() -> (MockServer, SessionClient) {
    let server = MockServer::start().await;
    let client = client_for(&server, Some("hunter2"));
    (server, client)
}

fn login_json(validity: i64) -> serde_json::Value {
    json!({
        "session": {
            "valid": true,
            "totp": false,
            "sid": "S1",
            "csrf": "C1",
            "validity": validity,
            "message": "password correct"
        },
        "took": 0.02
    })
}

async fn mount_login(server: &MockServer, validity: i64, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .and(body_json(json!({"password": "hunter2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_json(validity)))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_logout(server: &MockServer) {
    Mock::given(method("DELETE"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
}

fn summary_json() -> serde_json::Value {
    json!({
        "queries": {
            "total": 25_000,
            "blocked": 3100,
            "percent_blocked": 12.4,
            "unique_domains": 1800,
            "forwarded": 14_000,
            "cached": 7900,
            "frequency": 1.7,
            "types": {"A": 15_000, "AAAA": 8000},
            "status": {"GRAVITY": 3100},
            "replies": {"IP": 20_000, "NXDOMAIN": 150}
        },
        "clients": {"active": 11, "total": 23},
        "gravity": {"domains_being_blocked": 150_000, "last_update": 1_718_000_000},
        "took": 0.001
    })
}

/// Mount every resource `refresh_all` reads.
async fn mount_resources(server: &MockServer, blocking: &str) {
    Mock::given(method("GET"))
        .and(path("/api/stats/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(summary_json()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/stats/top_domains"))
        .and(query_param("blocked", "true"))
        .and(query_param("count", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "domains": [
                {"domain": "ads.example.com", "count": 420},
                {"domain": "tracker.example.net", "count": 99}
            ],
            "total_queries": 25_000,
            "blocked_queries": 3100
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/stats/top_domains"))
        .and(query_param("blocked", "false"))
        .and(query_param("count", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "domains": [{"domain": "example.org", "count": 1200}]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/stats/top_clients"))
        .and(query_param("count", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "clients": [
                {"ip": "192.168.1.20", "name": "laptop.lan", "count": 5000},
                {"ip": "192.168.1.31", "name": "", "count": 800}
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/stats/upstreams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "upstreams": [
                {"ip": "blocklist", "name": "blocklist", "port": -1, "count": 3100},
                {"ip": "9.9.9.9", "name": "dns9.quad9.net", "port": 53, "count": 14_000}
            ],
            "forwarded_queries": 14_000,
            "total_queries": 25_000
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/dns/blocking"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"blocking": blocking, "timer": null})),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/info/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": {
                "core": {
                    "local": {"version": "v6.0.4", "branch": "master", "hash": "aaa"},
                    "remote": {"version": "v6.0.4", "hash": "aaa"}
                },
                "web": {
                    "local": {"version": "v6.0.1", "branch": "master", "hash": "bbb"},
                    "remote": {"version": "v6.0.2", "hash": "ccc"}
                },
                "ftl": {
                    "local": {"version": "v6.0.3", "branch": "master", "hash": "ddd"}
                }
            }
        })))
        .mount(server)
        .await;
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_authenticate_stores_session() {
    let (server, mut client) = setup().await;
    mount_login(&server, 300, 1).await;

    client.authenticate().await.unwrap();

    let session = client.session();
    assert_eq!(session.session_id(), Some("S1"));
    assert_eq!(session.csrf_token(), Some("C1"));
    let remaining = session.valid_until().unwrap() - Utc::now();
    assert!(remaining > TimeDelta::seconds(295), "remaining: {remaining}");
    assert!(remaining <= TimeDelta::seconds(300), "remaining: {remaining}");
    assert_eq!(client.session_state(), SessionState::Authenticated);
}

#[tokio::test]
async fn test_authenticate_defaults_validity() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"session": {"valid": true, "sid": "S1"}})),
        )
        .mount(&server)
        .await;

    client.authenticate().await.unwrap();

    assert!(client.session().csrf_token().is_none());
    let remaining = client.session().valid_until().unwrap() - Utc::now();
    assert!(remaining > TimeDelta::seconds(295));
}

#[tokio::test]
async fn test_out_of_range_validity_is_auth_error() {
    for validity in [i64::MAX, 100_000_000_000_000, -i64::MAX] {
        let (server, mut client) = setup().await;
        mount_login(&server, validity, 1).await;

        let err = client.authenticate().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Auth, "validity {validity}: {err}");
        assert!(err.to_string().contains("invalid session validity"), "got: {err}");
        assert!(!client.session().is_active());
    }
}

#[tokio::test]
async fn test_invalid_session_is_auth_error() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"session": {"valid": false}})))
        .mount(&server)
        .await;

    let result = client.authenticate().await;

    match result {
        Err(Error::Authentication { ref message, .. }) => {
            assert_eq!(message, "invalid session");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
    assert!(!client.session().is_active());
}

#[tokio::test]
async fn test_missing_sid_is_auth_error() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"session": {"valid": true}})))
        .mount(&server)
        .await;

    let err = client.authenticate().await.unwrap_err();

    assert!(err.to_string().contains("no session id"), "got: {err}");
    assert_eq!(err.kind(), ErrorKind::Auth);
}

#[tokio::test]
async fn test_wrong_password() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "session": {"valid": false, "message": "password incorrect"}
        })))
        .mount(&server)
        .await;

    let result = client.authenticate().await;

    match result {
        Err(Error::Authentication { message, status }) => {
            assert_eq!(message, "invalid password");
            assert_eq!(status, Some(401));
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_bad_request_uses_body_message() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"key": "bad_request", "message": "No password found in JSON payload", "hint": null}
        })))
        .mount(&server)
        .await;

    let err = client.authenticate().await.unwrap_err();
    match err {
        Error::Authentication { message, status } => {
            assert_eq!(message, "No password found in JSON payload");
            assert_eq!(status, Some(400));
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_bad_request_without_json_body() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(400).set_body_string("nope"))
        .mount(&server)
        .await;

    let err = client.authenticate().await.unwrap_err();
    assert!(
        matches!(err, Error::Authentication { ref message, .. } if message == "bad request"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn test_unexpected_auth_status_carries_code() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client.authenticate().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn test_authenticate_without_password() {
    let server = MockServer::start().await;
    let mut client = client_for(&server, None);

    let result = client.authenticate().await;

    assert!(
        matches!(result, Err(Error::MissingCredential("password"))),
        "expected MissingCredential error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_reauthenticate_logs_out_previous_session() {
    let (server, mut client) = setup().await;
    mount_login(&server, 300, 2).await;

    Mock::given(method("DELETE"))
        .and(path("/api/auth"))
        .and(header("X-FTL-SID", "S1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.authenticate().await.unwrap();
    client.authenticate().await.unwrap();

    assert_eq!(client.session().session_id(), Some("S1"));
}

#[tokio::test]
async fn test_login_transport_failure_is_connection_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let endpoint = Endpoint::parse(&format!("http://127.0.0.1:{port}")).unwrap();
    let mut client = SessionClient::with_client(
        reqwest::Client::new(),
        endpoint,
        Some(SecretString::from("hunter2".to_string())),
    );

    let err = client.authenticate().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got: {err:?}");
    assert!(err.is_connection());
}

// ── Logout tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_logout_without_session_is_noop() {
    let (server, mut client) = setup().await;

    client.logout().await.unwrap();

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_logout_sends_sid_and_clears_session() {
    let (server, mut client) = setup().await;
    mount_login(&server, 300, 1).await;

    Mock::given(method("DELETE"))
        .and(path("/api/auth"))
        .and(header("X-FTL-SID", "S1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.authenticate().await.unwrap();
    client.logout().await.unwrap();

    assert!(client.session().session_id().is_none());
    assert!(client.session().csrf_token().is_none());
    assert!(client.session().valid_until().is_none());
    assert_eq!(client.session_state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_logout_clears_session_when_delete_fails() {
    let (server, client) = setup().await;
    let mut client = client.with_timeout(Duration::from_millis(200));
    mount_login(&server, 300, 1).await;

    Mock::given(method("DELETE"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    client.authenticate().await.unwrap();
    let result = client.logout().await;

    assert!(
        matches!(result, Err(Error::Timeout { .. })),
        "expected Timeout error, got: {result:?}"
    );
    assert!(client.session().session_id().is_none());
    assert!(client.session().csrf_token().is_none());
    assert!(client.session().valid_until().is_none());
}

// ── Data fetch tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_sends_session_headers() {
    let (server, mut client) = setup().await;
    mount_login(&server, 300, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/stats/summary"))
        .and(header("X-FTL-SID", "S1"))
        .and(header("X-FTL-CSRF", "C1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(summary_json()))
        .expect(2)
        .mount(&server)
        .await;

    let _: serde_json::Value = client.fetch_endpoint("stats/summary", &[]).await.unwrap();
    let _: serde_json::Value = client.fetch_endpoint("stats/summary", &[]).await.unwrap();
}

#[tokio::test]
async fn test_401_triggers_single_reauth_and_retry() {
    let (server, mut client) = setup().await;
    mount_login(&server, 300, 2).await;
    mount_logout(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/stats/summary"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    let result: Result<serde_json::Value, _> = client.fetch_endpoint("stats/summary", &[]).await;

    match result {
        Err(ref e @ Error::Api { ref status, .. }) => {
            assert_eq!(*status, 401);
            assert!(!e.is_connection());
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_401_then_success_after_reauth() {
    let (server, mut client) = setup().await;
    mount_login(&server, 300, 2).await;
    mount_logout(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/dns/blocking"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/dns/blocking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"blocking": "enabled"})))
        .expect(1)
        .mount(&server)
        .await;

    let status: hole_api::session::BlockingStatus =
        client.fetch_endpoint("dns/blocking", &[]).await.unwrap();
    assert_eq!(status.blocking.as_deref(), Some("enabled"));
}

#[tokio::test]
async fn test_retry_after_401_uses_new_session_headers() {
    let (server, mut client) = setup().await;
    mount_logout(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_json(300)))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"session": {"valid": true, "sid": "S2", "validity": 300}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/dns/blocking"))
        .and(header("X-FTL-SID", "S1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dns/blocking"))
        .and(header("X-FTL-SID", "S2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"blocking": "enabled"})))
        .expect(1)
        .mount(&server)
        .await;

    let status: hole_api::session::BlockingStatus =
        client.fetch_endpoint("dns/blocking", &[]).await.unwrap();
    assert_eq!(status.blocking.as_deref(), Some("enabled"));

    let requests = server.received_requests().await.unwrap();
    let retried = requests
        .iter()
        .rfind(|r| r.url.path() == "/api/dns/blocking")
        .unwrap();
    assert_eq!(retried.headers.get("X-FTL-SID").unwrap(), "S2");
    assert!(!retried.headers.contains_key("X-FTL-CSRF"));
    assert_eq!(client.session().session_id(), Some("S2"));
    assert!(client.session().csrf_token().is_none());
}

#[tokio::test]
async fn test_non_200_is_api_error() {
    let (server, mut client) = setup().await;
    mount_login(&server, 300, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/stats/upstreams"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let result: Result<serde_json::Value, _> = client.fetch_endpoint("stats/upstreams", &[]).await;
    assert!(
        matches!(result, Err(Error::Api { status: 500, .. })),
        "expected Api error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_decode_failure_is_api_class() {
    let (server, mut client) = setup().await;
    mount_login(&server, 300, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/stats/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let err = client.refresh_all().await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }), "got: {err:?}");
    assert_eq!(err.kind(), ErrorKind::Api);
}

#[tokio::test]
async fn test_zero_validity_reauthenticates_every_call() {
    let (server, mut client) = setup().await;
    mount_login(&server, 0, 3).await;

    Mock::given(method("DELETE"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/dns/blocking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"blocking": "enabled"})))
        .expect(3)
        .mount(&server)
        .await;

    for _ in 0..3 {
        let _: serde_json::Value = client.fetch_endpoint("dns/blocking", &[]).await.unwrap();
    }
}

#[tokio::test]
async fn test_without_password_requests_go_unauthenticated() {
    let server = MockServer::start().await;
    let mut client = client_for(&server, None);

    Mock::given(method("GET"))
        .and(path("/api/dns/blocking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"blocking": "disabled"})))
        .expect(1)
        .mount(&server)
        .await;

    let _: serde_json::Value = client.fetch_endpoint("dns/blocking", &[]).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("X-FTL-SID"));
}

// ── Refresh tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_accessors_default_before_refresh() {
    let (_server, client) = setup().await;

    assert_eq!(client.status(), BlockingState::Unknown);
    assert_eq!(client.ads_blocked_today(), 0);
    assert_eq!(client.dns_queries_today(), 0);
    assert!(client.top_ads().is_empty());
    assert!(client.forward_destinations().is_empty());
    assert!(client.reply_types().is_empty());
    assert!(client.core_current().is_none());
    assert!(!client.web_update());
}

#[tokio::test]
async fn test_refresh_all_populates_accessors() {
    let (server, mut client) = setup().await;
    mount_login(&server, 300, 1).await;
    mount_resources(&server, "enabled").await;

    client.refresh_all().await.unwrap();

    assert_eq!(client.status(), BlockingState::Enabled);
    assert_eq!(client.dns_queries_today(), 25_000);
    assert_eq!(client.ads_blocked_today(), 3100);
    assert!((client.ads_percentage_today() - 12.4).abs() < 1e-9);
    assert_eq!(client.unique_domains(), 1800);
    assert_eq!(client.queries_forwarded(), 14_000);
    assert_eq!(client.queries_cached(), 7900);
    assert_eq!(client.unique_clients(), 11);
    assert_eq!(client.clients_ever_seen(), 23);
    assert_eq!(client.domains_being_blocked(), 150_000);
    assert_eq!(client.reply_types().get("NXDOMAIN"), Some(&150));

    assert_eq!(client.top_ads().len(), 2);
    assert_eq!(client.top_ads()[0].domain, "ads.example.com");
    assert_eq!(client.top_queries()[0].count, 1200);
    assert_eq!(client.top_clients()[0].name.as_deref(), Some("laptop.lan"));
    assert_eq!(client.forward_destinations()[1].port, 53);

    assert_eq!(client.core_current(), Some("v6.0.4"));
    assert!(!client.core_update());
    assert_eq!(client.web_latest(), Some("v6.0.2"));
    assert!(client.web_update());
    assert_eq!(client.ftl_current(), Some("v6.0.3"));
    assert!(client.ftl_latest().is_none());
    assert!(!client.ftl_update());
}

#[tokio::test]
async fn test_refresh_all_aborts_on_first_failure() {
    let (server, mut client) = setup().await;
    mount_login(&server, 300, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/stats/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(summary_json()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/stats/top_domains"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/dns/blocking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"blocking": "enabled"})))
        .expect(0)
        .mount(&server)
        .await;

    let result = client.refresh_all().await;

    assert!(
        matches!(result, Err(Error::Api { status: 500, .. })),
        "expected Api error, got: {result:?}"
    );
    assert_eq!(client.dns_queries_today(), 25_000);
    assert_eq!(client.status(), BlockingState::Unknown);
    assert!(client.versions().is_none());
}

// ── Blocking tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_disable_with_timer_sends_body() {
    let (server, mut client) = setup().await;
    mount_login(&server, 300, 1).await;
    mount_resources(&server, "disabled").await;

    Mock::given(method("POST"))
        .and(path("/api/dns/blocking"))
        .and(header("X-FTL-SID", "S1"))
        .and(header("X-FTL-CSRF", "C1"))
        .and(body_json(json!({"blocking": false, "timer": 60})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"blocking": "disabled", "timer": 60.0})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let change = client.set_blocking(false, 60).await.unwrap();

    assert!(change.confirmed());
    assert_eq!(change.target, BlockingState::Disabled);
    assert_eq!(change.attempts, 1);
}

#[tokio::test]
async fn test_enable_sends_null_timer() {
    let (server, mut client) = setup().await;
    mount_login(&server, 300, 1).await;
    mount_resources(&server, "enabled").await;

    Mock::given(method("POST"))
        .and(path("/api/dns/blocking"))
        .and(body_json(json!({"blocking": true, "timer": null})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"blocking": "enabled"})))
        .expect(1)
        .mount(&server)
        .await;

    let change = client.enable().await.unwrap();
    assert_eq!(change.observed, BlockingState::Enabled);
}

#[tokio::test]
async fn test_set_blocking_without_password_fails_fast() {
    let server = MockServer::start().await;
    let mut client = client_for(&server, None);

    let result = client.disable(30).await;

    match result {
        Err(ref e @ Error::MissingCredential(_)) => assert_eq!(e.kind(), ErrorKind::Config),
        other => panic!("expected MissingCredential error, got: {other:?}"),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_set_blocking_rejected() {
    let (server, mut client) = setup().await;
    mount_login(&server, 300, 1).await;

    Mock::given(method("POST"))
        .and(path("/api/dns/blocking"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let result = client.enable().await;
    assert!(
        matches!(result, Err(Error::Api { status: 403, .. })),
        "expected Api error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_unconfirmed_toggle_is_soft_by_default() {
    let (server, mut client) = setup().await;
    mount_login(&server, 300, 1).await;
    mount_resources(&server, "enabled").await;

    Mock::given(method("POST"))
        .and(path("/api/dns/blocking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let change = client.disable(0).await.unwrap();

    assert!(!change.confirmed());
    assert_eq!(change.observed, BlockingState::Enabled);
    assert_eq!(change.attempts, 3);
}

#[tokio::test]
async fn test_unconfirmed_toggle_errors_when_strict() {
    let (server, client) = setup().await;
    let mut client = client.with_convergence(fast_policy(2).strict());
    mount_login(&server, 300, 1).await;
    mount_resources(&server, "enabled").await;

    Mock::given(method("POST"))
        .and(path("/api/dns/blocking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let result = client.disable(0).await;
    assert!(
        matches!(
            result,
            Err(Error::NotConfirmed {
                expected: BlockingState::Disabled,
                attempts: 2
            })
        ),
        "expected NotConfirmed error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_cancelled_polling() {
    let (server, client) = setup().await;
    let token = tokio_util::sync::CancellationToken::new();
    token.cancel();
    let mut client = client.with_cancellation(token);
    mount_login(&server, 300, 1).await;
    mount_resources(&server, "enabled").await;

    Mock::given(method("POST"))
        .and(path("/api/dns/blocking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = client.disable(0).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
}
