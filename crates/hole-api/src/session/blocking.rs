// Session API blocking control
//
// `POST /api/dns/blocking`, then bounded polling of `refresh_all` until
// the reported state matches.

use reqwest::StatusCode;
use tracing::{debug, info};

use crate::error::Error;
use crate::model::{BlockingChange, BlockingState};
use crate::session::client::SessionClient;
use crate::session::types::BlockingRequest;

impl SessionClient {
    /// Turn blocking on or off, optionally reverting after `timer_secs`.
    ///
    /// A `timer_secs` of 0 sends `"timer": null` (no automatic revert).
    /// Requires a password; without one this fails with
    /// [`Error::MissingCredential`] before any request is made.
    pub async fn set_blocking(
        &mut self,
        enabled: bool,
        timer_secs: u64,
    ) -> Result<BlockingChange, Error> {
        if !self.has_password() {
            return Err(Error::MissingCredential("password"));
        }
        self.ensure_auth().await?;

        let body = BlockingRequest::new(enabled, timer_secs);
        let url = self.api_url("dns/blocking")?;
        debug!("POST {url}");
        let request = self.session.apply_headers(self.post(url).json(&body));
        let (status, _) = self.execute(request).await?;

        if status != StatusCode::OK {
            return Err(Error::Api {
                status: status.as_u16(),
                message: format!(
                    "failed to {} blocking",
                    if enabled { "enable" } else { "disable" }
                ),
            });
        }

        let change = self.await_blocking(BlockingState::target(enabled)).await?;
        info!(
            state = %change.target,
            timer_secs,
            confirmed = change.confirmed(),
            "blocking state changed"
        );
        Ok(change)
    }

    pub async fn enable(&mut self) -> Result<BlockingChange, Error> {
        self.set_blocking(true, 0).await
    }

    /// Disable blocking for `duration_secs`, or indefinitely when 0.
    pub async fn disable(&mut self, duration_secs: u64) -> Result<BlockingChange, Error> {
        self.set_blocking(false, duration_secs).await
    }

    async fn await_blocking(&mut self, target: BlockingState) -> Result<BlockingChange, Error> {
        let policy = self.convergence;
        let budget = policy.attempts();
        let mut observed = BlockingState::Unknown;

        for attempt in 1..=budget {
            self.refresh_all().await?;
            observed = self.status();
            if observed == target {
                return Ok(BlockingChange {
                    target,
                    observed,
                    attempts: attempt,
                });
            }
            if attempt < budget {
                policy.pause(self.cancel.as_ref()).await?;
            }
        }

        policy.exhausted(target, observed, budget)
    }
}
