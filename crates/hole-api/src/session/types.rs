// Session API response types
//
// Explicit schemas for each `/api` resource. Every struct defaults its
// fields so a payload with missing keys decodes to zeros and empties
// instead of failing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Auth ─────────────────────────────────────────────────────────────

/// `POST /api/auth` request body.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub password: &'a str,
}

/// `POST /api/auth` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthResponse {
    pub session: SessionInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionInfo {
    pub valid: bool,
    pub sid: Option<String>,
    pub csrf: Option<String>,
    /// Lifetime in seconds.
    pub validity: Option<i64>,
}

/// Error envelope returned alongside 4xx statuses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiErrorBody {
    pub error: Option<ApiErrorDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiErrorDetail {
    pub key: Option<String>,
    pub message: Option<String>,
    pub hint: Option<String>,
}

// ── Stats ────────────────────────────────────────────────────────────

/// `GET /api/stats/summary`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    pub queries: QueryStats,
    pub clients: ClientStats,
    pub gravity: GravityStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryStats {
    pub total: u64,
    pub blocked: u64,
    pub percent_blocked: f64,
    pub unique_domains: u64,
    pub forwarded: u64,
    pub cached: u64,
    /// Queries per second over the last minute.
    pub frequency: f64,
    pub types: BTreeMap<String, u64>,
    pub status: BTreeMap<String, u64>,
    pub replies: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientStats {
    pub active: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravityStats {
    pub domains_being_blocked: u64,
    /// Unix timestamp of the last gravity run.
    pub last_update: Option<i64>,
}

/// `GET /api/stats/top_domains`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopDomains {
    pub domains: Vec<DomainCount>,
    pub total_queries: u64,
    pub blocked_queries: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainCount {
    pub domain: String,
    pub count: u64,
}

/// `GET /api/stats/top_clients`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopClients {
    pub clients: Vec<ClientCount>,
    pub total_queries: u64,
    pub blocked_queries: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientCount {
    pub ip: String,
    pub name: Option<String>,
    pub count: u64,
}

/// `GET /api/stats/upstreams`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Upstreams {
    pub upstreams: Vec<Upstream>,
    pub forwarded_queries: u64,
    pub total_queries: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Upstream {
    pub ip: Option<String>,
    pub name: Option<String>,
    /// `-1` for the internal pseudo-upstreams (cache, blocklist).
    pub port: i32,
    pub count: u64,
}

// ── DNS blocking ─────────────────────────────────────────────────────

/// `GET /api/dns/blocking`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockingStatus {
    /// `"enabled"`, `"disabled"`, `"failed"` or `"unknown"`.
    pub blocking: Option<String>,
    /// Seconds until a timed disable reverts.
    pub timer: Option<f64>,
}

/// `POST /api/dns/blocking` request body. `timer` is sent as `null`
/// rather than omitted when there is no timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockingRequest {
    pub blocking: bool,
    pub timer: Option<u64>,
}

impl BlockingRequest {
    pub fn new(enabled: bool, timer_secs: u64) -> Self {
        Self {
            blocking: enabled,
            timer: (timer_secs > 0).then_some(timer_secs),
        }
    }
}

// ── Info ─────────────────────────────────────────────────────────────

/// `GET /api/info/version`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VersionResponse {
    pub version: Versions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Versions {
    pub core: ComponentVersion,
    pub web: ComponentVersion,
    pub ftl: ComponentVersion,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentVersion {
    pub local: Option<VersionDetail>,
    pub remote: Option<VersionDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionDetail {
    pub version: Option<String>,
    pub branch: Option<String>,
    pub hash: Option<String>,
}

impl ComponentVersion {
    pub fn current(&self) -> Option<&str> {
        self.local.as_ref()?.version.as_deref()
    }

    pub fn latest(&self) -> Option<&str> {
        self.remote.as_ref()?.version.as_deref()
    }

    /// Local and remote hashes both known, non-empty and different.
    pub fn update_available(&self) -> bool {
        fn hash(detail: Option<&VersionDetail>) -> Option<&str> {
            detail?.hash.as_deref().filter(|h| !h.is_empty())
        }
        match (hash(self.local.as_ref()), hash(self.remote.as_ref())) {
            (Some(local), Some(remote)) => local != remote,
            _ => false,
        }
    }
}
