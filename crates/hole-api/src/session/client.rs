// Session API HTTP client
//
// Wraps `reqwest::Client` with `/api` URL construction, session header
// injection and the single re-authentication retry on 401. Login/logout,
// the aggregate refresh and blocking control live in sibling files.

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use crate::auth::{Session, SessionState};
use crate::convergence::ConvergencePolicy;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::session::types::{BlockingStatus, Summary, TopClients, TopDomains, Upstreams, Versions};
use crate::transport::{self, TransportConfig};

/// HTTP client for the appliance's session-based (v6) REST API.
///
/// Owns exactly one [`Session`]. Every data and control request first
/// makes sure that session is present and unexpired, logging in with the
/// configured password when it is not.
#[derive(Debug)]
pub struct SessionClient {
    http: reqwest::Client,
    endpoint: Endpoint,
    password: Option<SecretString>,
    timeout: Duration,
    pub(crate) session: Session,
    pub(crate) convergence: ConvergencePolicy,
    pub(crate) cancel: Option<CancellationToken>,
    pub(crate) summary: Option<Summary>,
    pub(crate) top_blocked: Option<TopDomains>,
    pub(crate) top_permitted: Option<TopDomains>,
    pub(crate) top_clients: Option<TopClients>,
    pub(crate) upstreams: Option<Upstreams>,
    pub(crate) blocking: Option<BlockingStatus>,
    pub(crate) versions: Option<Versions>,
}

impl SessionClient {
    /// Create a new session client from a `TransportConfig`.
    ///
    /// TLS verification is switched off automatically for `http` endpoints.
    pub fn new(
        endpoint: Endpoint,
        password: Option<SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let transport = transport.clone().for_protocol(endpoint.protocol());
        let http = transport.build_client()?;
        Ok(Self::with_client(http, endpoint, password).with_timeout(transport.timeout))
    }

    /// Create a session client around a caller-supplied (pooled) `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        endpoint: Endpoint,
        password: Option<SecretString>,
    ) -> Self {
        Self {
            http,
            endpoint,
            password,
            timeout: transport::DEFAULT_TIMEOUT,
            session: Session::default(),
            convergence: ConvergencePolicy::SESSION,
            cancel: None,
            summary: None,
            top_blocked: None,
            top_permitted: None,
            top_clients: None,
            upstreams: None,
            blocking: None,
            versions: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override how long `set_blocking` waits for the status to flip.
    pub fn with_convergence(mut self, policy: ConvergencePolicy) -> Self {
        self.convergence = policy;
        self
    }

    /// Abort convergence polling when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state_at(chrono::Utc::now())
    }

    pub(crate) fn password(&self) -> Option<&SecretString> {
        self.password.as_ref()
    }

    pub(crate) fn has_password(&self) -> bool {
        self.password.is_some()
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{origin}{base}/api/{path}`
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        self.endpoint
            .url(&format!("api/{}", path.trim_start_matches('/')))
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a request under the per-call timeout and read the full body.
    pub(crate) async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(StatusCode, String), Error> {
        transport::with_timeout(self.timeout, async {
            let resp = request.send().await?;
            let status = resp.status();
            let body = resp.text().await?;
            Ok((status, body))
        })
        .await
    }

    async fn send_get(
        &self,
        url: &Url,
        query: &[(&str, &str)],
    ) -> Result<(StatusCode, String), Error> {
        let request = self
            .session
            .apply_headers(self.http.get(url.clone()).query(query));
        self.execute(request).await
    }

    pub(crate) fn post(&self, url: Url) -> reqwest::RequestBuilder {
        self.http.post(url)
    }

    pub(crate) fn delete(&self, url: Url) -> reqwest::RequestBuilder {
        self.http.delete(url)
    }

    /// GET `/api/{path}` with session headers and decode the body.
    ///
    /// A 401 despite a locally valid session triggers exactly one
    /// re-authentication and one retry. Any other non-200 (including a
    /// second 401) is returned as [`Error::Api`].
    pub async fn fetch_endpoint<T: DeserializeOwned>(
        &mut self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        self.ensure_auth().await?;

        let url = self.api_url(path)?;
        debug!("GET {url}");
        let (mut status, mut body) = self.send_get(&url, query).await?;

        if status == StatusCode::UNAUTHORIZED && self.has_password() {
            info!(path, "session rejected, re-authenticating");
            self.authenticate().await?;
            (status, body) = self.send_get(&url, query).await?;
        }

        if status != StatusCode::OK {
            return Err(Error::Api {
                status: status.as_u16(),
                message: format!("failed to fetch {path}"),
            });
        }

        transport::decode_json(body)
    }
}
