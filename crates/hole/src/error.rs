//! CLI error types with miette diagnostics.
//!
//! Maps `hole_api::Error` and `ConfigError` into user-facing errors with
//! actionable help text.

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use hole_api::Error as HoleError;
use hole_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const UNSUPPORTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to appliance at {url}")]
    #[diagnostic(
        code(hole::connection_failed),
        help(
            "Check that the appliance is running and reachable.\n\
             URL: {url}\n\
             Try: hole status --url http://pi.hole"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(hole::tls_error),
        help(
            "The appliance may be using a self-signed certificate.\n\
             Use --insecure (-k) to accept it, or configure ca_cert in your profile."
        )
    )]
    TlsError { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(hole::auth_failed),
        help(
            "Verify the admin password for this appliance.\n\
             Run: hole config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No {credential} configured for this appliance")]
    #[diagnostic(
        code(hole::no_credentials),
        help(
            "Configure credentials with: hole config init\n\
             Or set HOLE_PASSWORD (v6) / HOLE_API_TOKEN (v5)."
        )
    )]
    NoCredentials { credential: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    #[diagnostic(code(hole::api_error))]
    ApiError {
        status: Option<u16>,
        message: String,
    },

    #[error("Blocking did not become '{expected}' after {attempts} checks")]
    #[diagnostic(
        code(hole::not_confirmed),
        help("The request was accepted; run `hole status` to check again.")
    )]
    NotConfirmed { expected: String, attempts: u32 },

    #[error("Operation cancelled")]
    #[diagnostic(code(hole::cancelled))]
    Cancelled,

    // ── Unsupported ──────────────────────────────────────────────────
    #[error("Operation '{operation}' is not supported by this appliance")]
    #[diagnostic(
        code(hole::unsupported),
        help("This command requires {required}. Select it with --api-version.")
    )]
    Unsupported { operation: String, required: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hole::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(hole::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: hole config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No appliance configured")]
    #[diagnostic(
        code(hole::no_config),
        help(
            "Create a profile with: hole config init\n\
             Or pass --url. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(hole::config))]
    Config(Box<ConfigError>),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {timeout:?}")]
    #[diagnostic(
        code(hole::timeout),
        help("Increase timeout with --timeout or check appliance responsiveness.")
    )]
    Timeout { timeout: Duration },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(hole::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Unsupported { .. } => exit_code::UNSUPPORTED,
            _ => exit_code::GENERAL,
        }
    }

    pub fn profile_not_found<'a>(
        name: impl Into<String>,
        available: impl Iterator<Item = &'a String>,
    ) -> Self {
        let mut available: Vec<_> = available.map(String::as_str).collect();
        available.sort_unstable();
        Self::ProfileNotFound {
            name: name.into(),
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        }
    }
}

// ── ConfigError → CliError ──────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound {
                name,
                available: "(see: hole config profiles)".into(),
            },
            other => Self::Config(Box::new(other)),
        }
    }
}

// ── hole_api::Error → CliError ──────────────────────────────────────

impl From<HoleError> for CliError {
    fn from(err: HoleError) -> Self {
        match err {
            HoleError::Transport(e) => {
                let url = e
                    .url()
                    .map_or_else(|| "(unknown)".into(), |u| u.origin().ascii_serialization());
                Self::ConnectionFailed {
                    url,
                    source: Box::new(e),
                }
            }

            HoleError::Unreachable { host, reason } => Self::ConnectionFailed {
                url: host,
                source: reason.into(),
            },

            HoleError::Timeout { timeout } => Self::Timeout { timeout },

            HoleError::Tls(message) => Self::TlsError { message },

            HoleError::Authentication { message, .. } => Self::AuthFailed { message },

            HoleError::MissingCredential(what) => Self::NoCredentials {
                credential: what.into(),
            },

            HoleError::UnsupportedVersion(version) => Self::Validation {
                field: "api_version".into(),
                reason: format!("expected 5 or 6, got {version}"),
            },

            HoleError::InvalidProtocol(scheme) => Self::Validation {
                field: "url".into(),
                reason: format!("scheme '{scheme}' is not http or https"),
            },

            HoleError::InvalidUrl(e) => Self::Validation {
                field: "url".into(),
                reason: e.to_string(),
            },

            HoleError::Api { status, message } => Self::ApiError {
                status: Some(status),
                message,
            },

            HoleError::Deserialization { message, .. } => Self::ApiError {
                status: None,
                message: format!("unexpected response: {message}"),
            },

            HoleError::NotConfirmed { expected, attempts } => Self::NotConfirmed {
                expected: expected.to_string(),
                attempts,
            },

            HoleError::Cancelled => Self::Cancelled,
        }
    }
}
