// Legacy API blocking toggles
//
// `api.php?enable=True` / `api.php?disable={secs|True}`, followed by
// bounded polling of the summary until the reported status flips.

use tracing::{error, info};

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::model::{BlockingChange, BlockingState};

impl LegacyClient {
    /// Enable DNS blocking.
    ///
    /// Without an API token this logs an error and returns `Ok(None)`
    /// without touching the network.
    pub async fn enable(&mut self) -> Result<Option<BlockingChange>, Error> {
        self.toggle(BlockingState::Enabled, "enable=True").await
    }

    /// Disable DNS blocking for `duration_secs`, or indefinitely when 0.
    ///
    /// Same missing-token behaviour as [`enable`](Self::enable).
    pub async fn disable(&mut self, duration_secs: u64) -> Result<Option<BlockingChange>, Error> {
        let query = if duration_secs > 0 {
            format!("disable={duration_secs}")
        } else {
            "disable=True".to_owned()
        };
        self.toggle(BlockingState::Disabled, &query).await
    }

    async fn toggle(
        &mut self,
        target: BlockingState,
        query: &str,
    ) -> Result<Option<BlockingChange>, Error> {
        if !self.has_token() {
            error!("an API token is required to change the blocking state");
            return Ok(None);
        }

        let _: serde_json::Value = self.get_with_fallback(query).await?;
        let change = self.await_status(target).await?;
        info!(state = %target, confirmed = change.confirmed(), "blocking state toggled");
        Ok(Some(change))
    }

    async fn await_status(&mut self, target: BlockingState) -> Result<BlockingChange, Error> {
        let policy = self.convergence;
        let budget = policy.attempts();
        let mut observed = BlockingState::Unknown;

        for attempt in 1..=budget {
            self.fetch_summary().await?;
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
