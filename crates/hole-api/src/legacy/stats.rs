// Legacy API statistics and version endpoints
//
// `api.php?summaryRaw` and `api.php?versions`, plus the accessors that
// read from the cached payloads.

use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::legacy::models::{LegacySummary, LegacyVersions};
use crate::model::{BlockingState, ComponentVersions, Statistics, VersionStatus};

impl LegacyClient {
    /// Fetch and cache the summary counters.
    ///
    /// `GET {location}/api.php?summaryRaw&auth={token}`
    pub async fn fetch_summary(&mut self) -> Result<&LegacySummary, Error> {
        debug!("fetching summary");
        let summary: LegacySummary = self.get_with_fallback("summaryRaw").await?;
        Ok(self.summary.insert(summary))
    }

    /// Fetch and cache component versions.
    ///
    /// `GET {location}/api.php?versions`
    pub async fn fetch_versions(&mut self) -> Result<&LegacyVersions, Error> {
        debug!("fetching versions");
        let versions: LegacyVersions = self.get_with_fallback("versions").await?;
        Ok(self.versions.insert(versions))
    }

    // ── Cached accessors ─────────────────────────────────────────────

    /// Last fetched summary, if any.
    pub fn summary(&self) -> Option<&LegacySummary> {
        self.summary.as_ref()
    }

    /// Last fetched versions, if any.
    pub fn versions(&self) -> Option<&LegacyVersions> {
        self.versions.as_ref()
    }

    pub fn status(&self) -> BlockingState {
        BlockingState::from_status(self.summary.as_ref().and_then(|s| s.status.as_deref()))
    }

    fn counter(&self, field: impl Fn(&LegacySummary) -> u64) -> u64 {
        self.summary.as_ref().map_or(0, field)
    }

    pub fn unique_clients(&self) -> u64 {
        self.counter(|s| s.unique_clients)
    }

    pub fn unique_domains(&self) -> u64 {
        self.counter(|s| s.unique_domains)
    }

    pub fn ads_blocked_today(&self) -> u64 {
        self.counter(|s| s.ads_blocked_today)
    }

    pub fn ads_percentage_today(&self) -> f64 {
        self.summary.as_ref().map_or(0.0, |s| s.ads_percentage_today)
    }

    pub fn clients_ever_seen(&self) -> u64 {
        self.counter(|s| s.clients_ever_seen)
    }

    pub fn dns_queries_today(&self) -> u64 {
        self.counter(|s| s.dns_queries_today)
    }

    pub fn domains_being_blocked(&self) -> u64 {
        self.counter(|s| s.domains_being_blocked)
    }

    pub fn queries_cached(&self) -> u64 {
        self.counter(|s| s.queries_cached)
    }

    pub fn queries_forwarded(&self) -> u64 {
        self.counter(|s| s.queries_forwarded)
    }

    // ── Version accessors ────────────────────────────────────────────

    fn version_field(&self, field: impl Fn(&LegacyVersions) -> Option<&String>) -> Option<&str> {
        self.versions.as_ref().and_then(field).map(String::as_str)
    }

    pub fn core_current(&self) -> Option<&str> {
        self.version_field(|v| v.core_current.as_ref())
    }

    pub fn core_latest(&self) -> Option<&str> {
        self.version_field(|v| v.core_latest.as_ref())
    }

    pub fn core_update(&self) -> bool {
        self.versions.as_ref().is_some_and(|v| v.core_update)
    }

    pub fn web_current(&self) -> Option<&str> {
        self.version_field(|v| v.web_current.as_ref())
    }

    pub fn web_latest(&self) -> Option<&str> {
        self.version_field(|v| v.web_latest.as_ref())
    }

    pub fn web_update(&self) -> bool {
        self.versions.as_ref().is_some_and(|v| v.web_update)
    }

    pub fn ftl_current(&self) -> Option<&str> {
        self.version_field(|v| v.ftl_current.as_ref())
    }

    pub fn ftl_latest(&self) -> Option<&str> {
        self.version_field(|v| v.ftl_latest.as_ref())
    }

    pub fn ftl_update(&self) -> bool {
        self.versions.as_ref().is_some_and(|v| v.ftl_update)
    }

    /// All headline counters in one generation-neutral struct.
    pub fn statistics(&self) -> Statistics {
        Statistics {
            status: self.status(),
            domains_being_blocked: self.domains_being_blocked(),
            dns_queries_today: self.dns_queries_today(),
            ads_blocked_today: self.ads_blocked_today(),
            ads_percentage_today: self.ads_percentage_today(),
            unique_domains: self.unique_domains(),
            queries_forwarded: self.queries_forwarded(),
            queries_cached: self.queries_cached(),
            clients_ever_seen: self.clients_ever_seen(),
            unique_clients: self.unique_clients(),
        }
    }

    /// Per-component version status from the cached `versions` payload.
    pub fn component_versions(&self) -> ComponentVersions {
        let Some(v) = self.versions.as_ref() else {
            return ComponentVersions::default();
        };
        ComponentVersions {
            core: VersionStatus {
                current: v.core_current.clone(),
                latest: v.core_latest.clone(),
                update_available: v.core_update,
            },
            web: VersionStatus {
                current: v.web_current.clone(),
                latest: v.web_latest.clone(),
                update_available: v.web_update,
            },
            ftl: VersionStatus {
                current: v.ftl_current.clone(),
                latest: v.ftl_latest.clone(),
                update_available: v.ftl_update,
            },
        }
    }
}
