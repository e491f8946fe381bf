// Legacy API response types
//
// Flat JSON objects returned by `api.php`. Every field defaults when
// absent so a partial payload still decodes.

use serde::{Deserialize, Serialize};

/// `api.php?summaryRaw` — headline counters as raw numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacySummary {
    /// `"enabled"` / `"disabled"`.
    pub status: Option<String>,
    pub domains_being_blocked: u64,
    pub dns_queries_today: u64,
    pub ads_blocked_today: u64,
    pub ads_percentage_today: f64,
    pub unique_domains: u64,
    pub queries_forwarded: u64,
    pub queries_cached: u64,
    pub clients_ever_seen: u64,
    pub unique_clients: u64,
    pub dns_queries_all_types: u64,
    pub privacy_level: u64,
    pub gravity_last_updated: Option<GravityLastUpdated>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravityLastUpdated {
    pub file_exists: bool,
    /// Unix timestamp of the last gravity run.
    pub absolute: Option<i64>,
}

/// `api.php?versions` — installed/latest versions of each component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyVersions {
    pub core_update: bool,
    pub web_update: bool,
    #[serde(rename = "FTL_update")]
    pub ftl_update: bool,
    pub core_current: Option<String>,
    pub web_current: Option<String>,
    #[serde(rename = "FTL_current")]
    pub ftl_current: Option<String>,
    pub core_latest: Option<String>,
    pub web_latest: Option<String>,
    #[serde(rename = "FTL_latest")]
    pub ftl_latest: Option<String>,
    pub core_branch: Option<String>,
    pub web_branch: Option<String>,
    #[serde(rename = "FTL_branch")]
    pub ftl_branch: Option<String>,
}
