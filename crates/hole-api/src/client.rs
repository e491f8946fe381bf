// Version-selecting client facade
//
// Builds the legacy or session client from one set of connection options
// and forwards the operations both generations share.

use secrecy::SecretString;
use tokio_util::sync::CancellationToken;

use crate::auth::ApiVersion;
use crate::convergence::ConvergencePolicy;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::legacy::LegacyClient;
use crate::model::{BlockingChange, BlockingState, ComponentVersions, Statistics};
use crate::session::SessionClient;
use crate::transport::TransportConfig;

/// Everything needed to build a client for either API generation.
///
/// `password` is used by the session client and `api_token` by the legacy
/// client; the other is ignored.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub endpoint: Endpoint,
    pub transport: TransportConfig,
    pub password: Option<SecretString>,
    pub api_token: Option<SecretString>,
    /// Defaults to the generation's own policy when `None`.
    pub convergence: Option<ConvergencePolicy>,
    /// Pooled client to reuse instead of building one from `transport`.
    pub http: Option<reqwest::Client>,
    pub cancel: Option<CancellationToken>,
}

impl ConnectOptions {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            transport: TransportConfig::default(),
            password: None,
            api_token: None,
            convergence: None,
            http: None,
            cancel: None,
        }
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_password(mut self, password: SecretString) -> Self {
        self.password = Some(password);
        self
    }

    pub fn with_api_token(mut self, token: SecretString) -> Self {
        self.api_token = Some(token);
        self
    }

    pub fn with_convergence(mut self, policy: ConvergencePolicy) -> Self {
        self.convergence = Some(policy);
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// A client for whichever API generation the appliance speaks.
#[derive(Debug)]
pub enum HoleClient {
    Legacy(LegacyClient),
    Session(SessionClient),
}

impl HoleClient {
    /// Build a client for API `version` (5 or 6).
    ///
    /// Any other version fails with [`Error::UnsupportedVersion`] before
    /// anything is constructed.
    pub fn new(version: u8, options: ConnectOptions) -> Result<Self, Error> {
        Self::for_version(ApiVersion::try_from(version)?, options)
    }

    pub fn for_version(version: ApiVersion, options: ConnectOptions) -> Result<Self, Error> {
        let ConnectOptions {
            endpoint,
            transport,
            password,
            api_token,
            convergence,
            http,
            cancel,
        } = options;
        let transport = transport.for_protocol(endpoint.protocol());
        let http = match http {
            Some(http) => http,
            None => transport.build_client()?,
        };

        let client = match version {
            ApiVersion::V5 => {
                let mut client = LegacyClient::with_client(http, endpoint, api_token)
                    .with_timeout(transport.timeout);
                if let Some(policy) = convergence {
                    client = client.with_convergence(policy);
                }
                if let Some(token) = cancel {
                    client = client.with_cancellation(token);
                }
                Self::Legacy(client)
            }
            ApiVersion::V6 => {
                let mut client = SessionClient::with_client(http, endpoint, password)
                    .with_timeout(transport.timeout);
                if let Some(policy) = convergence {
                    client = client.with_convergence(policy);
                }
                if let Some(token) = cancel {
                    client = client.with_cancellation(token);
                }
                Self::Session(client)
            }
        };
        Ok(client)
    }

    pub fn api_version(&self) -> ApiVersion {
        match self {
            Self::Legacy(_) => ApiVersion::V5,
            Self::Session(_) => ApiVersion::V6,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        match self {
            Self::Legacy(c) => c.endpoint(),
            Self::Session(c) => c.endpoint(),
        }
    }

    /// Refresh the statistics caches (summary for v5, everything for v6).
    pub async fn refresh(&mut self) -> Result<(), Error> {
        match self {
            Self::Legacy(c) => c.fetch_summary().await.map(|_| ()),
            Self::Session(c) => c.refresh_all().await,
        }
    }

    pub async fn refresh_versions(&mut self) -> Result<(), Error> {
        match self {
            Self::Legacy(c) => c.fetch_versions().await.map(|_| ()),
            Self::Session(c) => c.fetch_versions().await.map(|_| ()),
        }
    }

    /// Enable blocking.
    ///
    /// `Ok(None)` only from a v5 client without an API token, which skips
    /// the request.
    pub async fn enable(&mut self) -> Result<Option<BlockingChange>, Error> {
        match self {
            Self::Legacy(c) => c.enable().await,
            Self::Session(c) => c.enable().await.map(Some),
        }
    }

    pub async fn disable(&mut self, duration_secs: u64) -> Result<Option<BlockingChange>, Error> {
        match self {
            Self::Legacy(c) => c.disable(duration_secs).await,
            Self::Session(c) => c.disable(duration_secs).await.map(Some),
        }
    }

    pub fn status(&self) -> BlockingState {
        match self {
            Self::Legacy(c) => c.status(),
            Self::Session(c) => c.status(),
        }
    }

    pub fn statistics(&self) -> Statistics {
        match self {
            Self::Legacy(c) => c.statistics(),
            Self::Session(c) => c.statistics(),
        }
    }

    pub fn versions(&self) -> ComponentVersions {
        match self {
            Self::Legacy(c) => c.component_versions(),
            Self::Session(c) => c.component_versions(),
        }
    }

    /// End the session, if any. Nothing to do for v5.
    pub async fn logout(&mut self) -> Result<(), Error> {
        match self {
            Self::Legacy(_) => Ok(()),
            Self::Session(c) => c.logout().await,
        }
    }

    pub fn as_legacy(&self) -> Option<&LegacyClient> {
        match self {
            Self::Legacy(c) => Some(c),
            Self::Session(_) => None,
        }
    }

    pub fn as_session(&self) -> Option<&SessionClient> {
        match self {
            Self::Session(c) => Some(c),
            Self::Legacy(_) => None,
        }
    }

    pub fn as_session_mut(&mut self) -> Option<&mut SessionClient> {
        match self {
            Self::Session(c) => Some(c),
            Self::Legacy(_) => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::endpoint::Protocol;

    fn options() -> ConnectOptions {
        ConnectOptions::new(Endpoint::new(Protocol::Http, "pi.hole", None))
    }

    #[test]
    fn selects_by_version() {
        let client = HoleClient::new(5, options()).unwrap();
        assert_eq!(client.api_version(), ApiVersion::V5);
        assert!(client.as_legacy().is_some());

        let client = HoleClient::new(6, options()).unwrap();
        assert_eq!(client.api_version(), ApiVersion::V6);
        assert!(client.as_session().is_some());
    }

    #[test]
    fn rejects_unknown_version() {
        let err = HoleClient::new(7, options()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion(7)));
        assert_eq!(err.kind(), crate::ErrorKind::Config);
    }
}
