// Bounded polling after a blocking toggle.
//
// The appliance applies enable/disable asynchronously, so after sending the
// command we refresh until the reported state matches. The loop itself
// lives in each client (it needs `&mut self` to refresh); this module owns
// the limits, the sleep, and what happens when the budget runs out.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::Error;
use crate::model::{BlockingChange, BlockingState};

/// How long to wait for a toggle to show up in the reported state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvergencePolicy {
    /// Refreshes to perform before giving up. Zero is treated as one.
    pub max_attempts: u32,
    /// Pause between refreshes.
    pub interval: Duration,
    /// Fail with [`Error::NotConfirmed`] instead of returning an
    /// unconfirmed [`BlockingChange`].
    pub strict: bool,
}

impl ConvergencePolicy {
    /// 10 refreshes, 100 ms apart.
    pub const SESSION: Self = Self {
        max_attempts: 10,
        interval: Duration::from_millis(100),
        strict: false,
    };

    /// 100 refreshes, 10 ms apart.
    pub const LEGACY: Self = Self {
        max_attempts: 100,
        interval: Duration::from_millis(10),
        strict: false,
    };

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Sleep one interval, returning early with [`Error::Cancelled`] if the
    /// token fires.
    pub(crate) async fn pause(&self, cancel: Option<&CancellationToken>) -> Result<(), Error> {
        match cancel {
            Some(token) => tokio::select! {
                () = token.cancelled() => Err(Error::Cancelled),
                () = tokio::time::sleep(self.interval) => Ok(()),
            },
            None => {
                tokio::time::sleep(self.interval).await;
                Ok(())
            }
        }
    }

    /// Outcome once the attempt budget is spent without a match.
    pub(crate) fn exhausted(
        &self,
        target: BlockingState,
        observed: BlockingState,
        attempts: u32,
    ) -> Result<BlockingChange, Error> {
        if self.strict {
            return Err(Error::NotConfirmed {
                expected: target,
                attempts,
            });
        }
        warn!(
            state = %target,
            %observed,
            attempts,
            "blocking state not confirmed before polling gave up"
        );
        Ok(BlockingChange {
            target,
            observed,
            attempts,
        })
    }
}

impl Default for ConvergencePolicy {
    fn default() -> Self {
        Self::SESSION
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn lenient_policy_returns_unconfirmed_change() {
        let change = ConvergencePolicy::SESSION
            .exhausted(BlockingState::Enabled, BlockingState::Disabled, 10)
            .unwrap();
        assert!(!change.confirmed());
        assert_eq!(change.attempts, 10);
    }

    #[test]
    fn strict_policy_escalates() {
        let err = ConvergencePolicy::SESSION
            .strict()
            .exhausted(BlockingState::Enabled, BlockingState::Disabled, 10)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NotConfirmed {
                expected: BlockingState::Enabled,
                attempts: 10
            }
        ));
    }

    #[test]
    fn zero_attempts_still_polls_once() {
        let policy = ConvergencePolicy {
            max_attempts: 0,
            ..ConvergencePolicy::LEGACY
        };
        assert_eq!(policy.attempts(), 1);
    }

    #[tokio::test]
    async fn cancelled_pause_errors() {
        let token = CancellationToken::new();
        token.cancel();
        let policy = ConvergencePolicy {
            interval: Duration::from_secs(60),
            ..ConvergencePolicy::SESSION
        };
        assert!(matches!(
            policy.pause(Some(&token)).await,
            Err(Error::Cancelled)
        ));
    }
}
