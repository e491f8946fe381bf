// Session login, logout and the pre-request auth gate.

use chrono::Utc;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use tracing::{debug, info, warn};

use crate::auth::{DEFAULT_SESSION_VALIDITY_SECS, SID_HEADER, Session};
use crate::error::Error;
use crate::session::client::SessionClient;
use crate::session::types::{ApiErrorBody, AuthResponse, LoginRequest};

impl SessionClient {
    /// Log in with the configured password, replacing any current session.
    ///
    /// `POST /api/auth {"password": ...}`
    ///
    /// An existing session is logged out first so at most one is live per
    /// client. Fails with [`Error::MissingCredential`] when no password is
    /// configured.
    pub async fn authenticate(&mut self) -> Result<(), Error> {
        if !self.has_password() {
            return Err(Error::MissingCredential("password"));
        }

        if self.session.is_active() {
            if let Err(e) = self.logout().await {
                warn!(error = %e, "failed to close previous session");
            }
        }

        let url = self.api_url("auth")?;
        debug!("POST {url}");
        let password = self
            .password()
            .ok_or(Error::MissingCredential("password"))?;
        let request = self.post(url).json(&LoginRequest {
            password: password.expose_secret(),
        });
        let (status, body) = self.execute(request).await?;

        match status {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => {
                return Err(Error::Authentication {
                    message: "invalid password".into(),
                    status: Some(401),
                });
            }
            StatusCode::BAD_REQUEST => {
                let message = serde_json::from_str::<ApiErrorBody>(&body)
                    .ok()
                    .and_then(|b| b.error)
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| "bad request".into());
                return Err(Error::Authentication {
                    message,
                    status: Some(400),
                });
            }
            other => {
                return Err(Error::Authentication {
                    message: format!("unexpected status {other}"),
                    status: Some(other.as_u16()),
                });
            }
        }

        let resp: AuthResponse = serde_json::from_str(&body)
            .map_err(|e| Error::auth(format!("malformed login response: {e}")))?;
        let info = resp.session;

        if !info.valid {
            return Err(Error::auth("invalid session"));
        }
        let sid = info
            .sid
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::auth("no session id received"))?;
        let csrf = info.csrf.filter(|s| !s.is_empty());
        let validity = info.validity.unwrap_or(DEFAULT_SESSION_VALIDITY_SECS);

        self.session = Session::issued(sid, csrf, validity, Utc::now())?;
        info!(validity_secs = validity, "session established");
        Ok(())
    }

    /// End the current session.
    ///
    /// `DELETE /api/auth` with `X-FTL-SID`. No-op without a session. The
    /// local session is forgotten even when the request fails; that
    /// failure is still returned.
    pub async fn logout(&mut self) -> Result<(), Error> {
        let Some(sid) = self.session.session_id().map(str::to_owned) else {
            return Ok(());
        };

        let result = self.delete_session(&sid).await;
        self.session.clear();
        if let Err(e) = &result {
            debug!(error = %e, "logout request failed, session discarded locally");
        }
        result
    }

    async fn delete_session(&self, sid: &str) -> Result<(), Error> {
        let url = self.api_url("auth")?;
        debug!("DELETE {url}");
        let request = self.delete(url).header(SID_HEADER, sid);
        let (status, _) = self.execute(request).await?;
        debug!(%status, "logout response");
        Ok(())
    }

    /// Log in if there is no session or its deadline has passed.
    ///
    /// Without a configured password there is nothing to log in with, so
    /// requests go out unauthenticated (appliances with auth disabled).
    pub async fn ensure_auth(&mut self) -> Result<(), Error> {
        if !self.session.needs_auth_at(Utc::now()) {
            return Ok(());
        }
        if !self.has_password() {
            debug!("no password configured, continuing without a session");
            return Ok(());
        }
        self.authenticate().await
    }
}
