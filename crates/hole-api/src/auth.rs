use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Header carrying the session id on every authenticated v6 request.
pub const SID_HEADER: &str = "X-FTL-SID";
/// Anti-forgery header, sent alongside the session id when one was issued.
pub const CSRF_HEADER: &str = "X-FTL-CSRF";
/// Session lifetime assumed when the login response omits `validity`.
pub const DEFAULT_SESSION_VALIDITY_SECS: i64 = 300;

/// Which generation of the admin API the appliance speaks.
///
/// Determines the auth flow and URL layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiVersion {
    /// v5: stateless `api.php` script, token in the query string.
    V5,
    /// v6: REST under `/api`, password login producing a session.
    #[default]
    V6,
}

impl ApiVersion {
    pub fn number(self) -> u8 {
        match self {
            Self::V5 => 5,
            Self::V6 => 6,
        }
    }

    /// Whether this generation authenticates with a session (vs. a static token).
    pub fn uses_session(self) -> bool {
        matches!(self, Self::V6)
    }
}

impl TryFrom<u8> for ApiVersion {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            5 => Ok(Self::V5),
            6 => Ok(Self::V6),
            other => Err(Error::UnsupportedVersion(other)),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number())
    }
}

/// Observable lifecycle of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
    /// A session id is held but its deadline has passed.
    Expired,
}

/// Live v6 session: id, CSRF token and validity deadline.
///
/// Owned by exactly one client. Populated by a successful login and
/// cleared on logout.
#[derive(Debug, Clone, Default)]
pub struct Session {
    sid: Option<SecretString>,
    csrf: Option<SecretString>,
    valid_until: Option<DateTime<Utc>>,
}

impl Session {
    /// Build a session from login fields, starting the validity clock at `now`.
    ///
    /// Fails when `validity_secs` pushes the deadline outside chrono's range.
    pub fn issued(
        sid: String,
        csrf: Option<String>,
        validity_secs: i64,
        now: DateTime<Utc>,
    ) -> Result<Self, Error> {
        let valid_until = TimeDelta::try_seconds(validity_secs)
            .and_then(|validity| now.checked_add_signed(validity))
            .ok_or_else(|| Error::auth(format!("invalid session validity {validity_secs}")))?;
        Ok(Self {
            sid: Some(SecretString::from(sid)),
            csrf: csrf.map(SecretString::from),
            valid_until: Some(valid_until),
        })
    }

    pub fn session_id(&self) -> Option<&str> {
        self.sid.as_ref().map(|s| s.expose_secret())
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf.as_ref().map(|s| s.expose_secret())
    }

    pub fn valid_until(&self) -> Option<DateTime<Utc>> {
        self.valid_until
    }

    pub fn is_active(&self) -> bool {
        self.sid.is_some()
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> SessionState {
        match (&self.sid, self.valid_until) {
            (None, _) => SessionState::Unauthenticated,
            (Some(_), Some(deadline)) if now >= deadline => SessionState::Expired,
            (Some(_), _) => SessionState::Authenticated,
        }
    }

    /// `true` unless a session is held and its deadline is still ahead.
    pub fn needs_auth_at(&self, now: DateTime<Utc>) -> bool {
        self.state_at(now) != SessionState::Authenticated
    }

    pub fn clear(&mut self) {
        self.sid = None;
        self.csrf = None;
        self.valid_until = None;
    }

    /// Attach `X-FTL-SID` (and `X-FTL-CSRF` when present) to a request.
    pub(crate) fn apply_headers(
        &self,
        mut builder: reqwest::RequestBuilder,
    ) -> reqwest::RequestBuilder {
        if let Some(sid) = self.session_id() {
            builder = builder.header(SID_HEADER, sid);
            if let Some(csrf) = self.csrf_token() {
                builder = builder.header(CSRF_HEADER, csrf);
            }
        }
        builder
    }
}
