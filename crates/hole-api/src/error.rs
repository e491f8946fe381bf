use std::time::Duration;

use thiserror::Error;

use crate::model::BlockingState;

/// Coarse classification of an [`Error`].
///
/// Callers that only care about "what went wrong" rather than the exact
/// variant branch on this instead of matching every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid construction arguments or missing credentials. Never retried.
    Config,
    /// Transport failure: timeout, DNS, refused connection.
    Connection,
    /// Login rejected or session malformed.
    Auth,
    /// Non-200 on a data/control endpoint, or an undecodable payload.
    Api,
    /// Caller cancelled a polling loop.
    Cancelled,
}

/// Top-level error type for the `hole-api` crate.
///
/// Covers every failure mode across both API generations:
/// configuration, transport, authentication, and endpoint errors.
/// The `hole` CLI maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Configuration ───────────────────────────────────────────────
    /// Scheme other than `http` or `https`.
    #[error("Protocol '{0}' is invalid: must be http or https")]
    InvalidProtocol(String),

    /// API version the factory cannot build a client for.
    #[error("Unsupported API version {0}: expected 5 or 6")]
    UnsupportedVersion(u8),

    /// An operation needs a credential that was not configured.
    #[error("A {0} is required for this operation")]
    MissingCredential(&'static str),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// Every candidate location failed (legacy API fallback).
    #[error("Cannot load data from {host}: {reason}")]
    Unreachable { host: String, reason: String },

    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong password, invalid session, unexpected status).
    #[error("Authentication failed: {message}")]
    Authentication { message: String, status: Option<u16> },

    // ── API ─────────────────────────────────────────────────────────
    /// Non-200 response from a data or control endpoint.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// The blocking state never reached the requested value.
    #[error("Blocking state did not become '{expected}' after {attempts} attempts")]
    NotConfirmed {
        expected: BlockingState,
        attempts: u32,
    },

    /// A cancellation token fired while waiting.
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    pub(crate) fn auth(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            status: None,
        }
    }

    /// Coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidProtocol(_)
            | Self::UnsupportedVersion(_)
            | Self::MissingCredential(_)
            | Self::InvalidUrl(_)
            | Self::Tls(_) => ErrorKind::Config,
            Self::Transport(_) | Self::Timeout { .. } | Self::Unreachable { .. } => {
                ErrorKind::Connection
            }
            Self::Authentication { .. } => ErrorKind::Auth,
            Self::Api { .. } | Self::Deserialization { .. } | Self::NotConfirmed { .. } => {
                ErrorKind::Api
            }
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Returns `true` for timeouts and transport-level failures.
    pub fn is_connection(&self) -> bool {
        self.kind() == ErrorKind::Connection
    }

    /// Returns `true` if this error indicates the appliance rejected our
    /// credentials or session.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Authentication { .. } => true,
            Self::Api { status, .. } => *status == 401,
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::Unreachable { .. } => true,
            _ => false,
        }
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } => *status,
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
