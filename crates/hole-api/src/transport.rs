// Shared transport configuration for building reqwest::Client instances.
//
// Both the legacy and session clients share TLS and timeout settings
// through this module. Every network exchange is also wrapped in
// `with_timeout`, which bounds caller-supplied clients too.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::endpoint::Protocol;
use crate::error::Error;

/// Per-call timeout applied to every request when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// TLS verification mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (for self-signed appliances).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Convenience constructor from the boolean `verify_tls` flag.
    pub fn verify(verify_tls: bool) -> Self {
        Self {
            tls: if verify_tls {
                TlsMode::System
            } else {
                TlsMode::DangerAcceptInvalid
            },
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Verification is meaningless over plain HTTP, so it is switched off.
    pub fn for_protocol(mut self, protocol: Protocol) -> Self {
        if protocol == Protocol::Http {
            self.tls = TlsMode::DangerAcceptInvalid;
        }
        self
    }

    /// Whether certificates will be verified by clients built from this config.
    pub fn verifies_tls(&self) -> bool {
        !matches!(self.tls, TlsMode::DangerAcceptInvalid)
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("hole/", env!("CARGO_PKG_VERSION")));

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

/// Run one network exchange under a hard deadline.
///
/// Exceeding `timeout` surfaces as [`Error::Timeout`].
pub(crate) async fn with_timeout<T, F>(timeout: Duration, exchange: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    tokio::time::timeout(timeout, exchange)
        .await
        .map_err(|_| Error::Timeout { timeout })?
}

/// Decode a JSON body, keeping the raw text on failure for debugging.
pub(crate) fn decode_json<T: DeserializeOwned>(body: String) -> Result<T, Error> {
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}
