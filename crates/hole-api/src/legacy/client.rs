// Legacy API HTTP client
//
// Wraps `reqwest::Client` with `api.php` URL construction, location
// fallback, and token-in-query auth. Endpoint operations (summary,
// versions, blocking) are implemented as inherent methods in sibling
// files to keep this module focused on transport mechanics.

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use strum::{AsRefStr, Display};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::convergence::ConvergencePolicy;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::legacy::models::{LegacySummary, LegacyVersions};
use crate::transport::{self, TransportConfig};

/// Directory the `api.php` script is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum LegacyLocation {
    Api,
    Admin,
}

impl LegacyLocation {
    /// Order in which locations are tried. The first 200 wins.
    pub const FALLBACK_ORDER: [Self; 2] = [Self::Api, Self::Admin];
}

/// HTTP client for the appliance's legacy (v5) `api.php` interface.
///
/// Stateless with respect to auth: the optional API token is appended to
/// each query string. Holds only the most recent summary and versions
/// payloads.
#[derive(Debug)]
pub struct LegacyClient {
    http: reqwest::Client,
    endpoint: Endpoint,
    api_token: Option<SecretString>,
    timeout: Duration,
    pub(crate) convergence: ConvergencePolicy,
    pub(crate) cancel: Option<CancellationToken>,
    pub(crate) summary: Option<LegacySummary>,
    pub(crate) versions: Option<LegacyVersions>,
}

impl LegacyClient {
    /// Create a new legacy client from a `TransportConfig`.
    ///
    /// TLS verification is switched off automatically for `http` endpoints.
    pub fn new(
        endpoint: Endpoint,
        api_token: Option<SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let transport = transport.clone().for_protocol(endpoint.protocol());
        let http = transport.build_client()?;
        Ok(Self::with_client(http, endpoint, api_token).with_timeout(transport.timeout))
    }

    /// Create a legacy client around a caller-supplied (pooled) `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        endpoint: Endpoint,
        api_token: Option<SecretString>,
    ) -> Self {
        Self {
            http,
            endpoint,
            api_token,
            timeout: transport::DEFAULT_TIMEOUT,
            convergence: ConvergencePolicy::LEGACY,
            cancel: None,
            summary: None,
            versions: None,
        }
    }

    /// Bound every request (including fallback attempts individually).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override how long enable/disable wait for the status to flip.
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

    pub(crate) fn has_token(&self) -> bool {
        self.api_token.is_some()
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{origin}{base}/{location}/api.php?{query}` — without the token.
    pub(crate) fn script_url(&self, location: LegacyLocation, query: &str) -> Result<Url, Error> {
        let mut url = self.endpoint.url(&format!("{location}/api.php"))?;
        url.set_query(Some(query));
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// GET `api.php?{query}`, trying each location in [`LegacyLocation::FALLBACK_ORDER`].
    ///
    /// Transport failures, timeouts and non-200 statuses move on to the
    /// next location. A 200 whose body does not decode is returned as a
    /// deserialization error without further fallback.
    pub(crate) async fn get_with_fallback<T: DeserializeOwned>(
        &self,
        query: &str,
    ) -> Result<T, Error> {
        let mut failures = Vec::with_capacity(LegacyLocation::FALLBACK_ORDER.len());

        for location in LegacyLocation::FALLBACK_ORDER {
            let mut url = self.script_url(location, query)?;
            debug!("GET {url}");
            if let Some(token) = &self.api_token {
                url.query_pairs_mut()
                    .append_pair("auth", token.expose_secret());
            }

            match self.get_once(url).await {
                Ok(body) => return transport::decode_json(body),
                Err(err) => {
                    debug!(%location, error = %err, "location failed, trying next");
                    failures.push(format!("{location}: {err}"));
                }
            }
        }

        Err(Error::Unreachable {
            host: self.endpoint.host().to_owned(),
            reason: failures.join("; "),
        })
    }

    async fn get_once(&self, url: Url) -> Result<String, Error> {
        let request = self.http.get(url);
        transport::with_timeout(self.timeout, async {
            let resp = request.send().await?;
            let status = resp.status();
            if status != StatusCode::OK {
                return Err(Error::Api {
                    status: status.as_u16(),
                    message: "unexpected status from api.php".into(),
                });
            }
            Ok(resp.text().await?)
        })
        .await
    }
}
