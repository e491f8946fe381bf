// Generation-neutral views over cached appliance data.
//
// Each client decodes its own wire schema; these types are what both
// project into so callers can work against either API version.

use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};

/// Blocking state as reported by the appliance.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BlockingState {
    Enabled,
    Disabled,
    #[default]
    Unknown,
}

impl BlockingState {
    /// Interpret a raw status field. Anything unrecognised is `Unknown`.
    pub fn from_status(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }

    /// Target state for a toggle request.
    pub fn target(enabled: bool) -> Self {
        if enabled {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }
}

/// Result of an enable/disable request after convergence polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockingChange {
    /// The state that was requested.
    pub target: BlockingState,
    /// The state last observed while polling.
    pub observed: BlockingState,
    /// Number of refreshes performed while waiting.
    pub attempts: u32,
}

impl BlockingChange {
    /// `true` if the appliance reported the requested state before polling
    /// gave up.
    pub fn confirmed(&self) -> bool {
        self.target == self.observed
    }
}

/// Headline counters, identical across API generations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub status: BlockingState,
    pub domains_being_blocked: u64,
    pub dns_queries_today: u64,
    pub ads_blocked_today: u64,
    pub ads_percentage_today: f64,
    pub unique_domains: u64,
    pub queries_forwarded: u64,
    pub queries_cached: u64,
    pub clients_ever_seen: u64,
    pub unique_clients: u64,
}

/// Installed vs. available version of one component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VersionStatus {
    pub current: Option<String>,
    pub latest: Option<String>,
    pub update_available: bool,
}

/// Version status of the three appliance components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComponentVersions {
    pub core: VersionStatus,
    pub web: VersionStatus,
    pub ftl: VersionStatus,
}
