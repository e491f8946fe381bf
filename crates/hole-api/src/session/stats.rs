// Session API statistics and version endpoints
//
// `refresh_all` pulls every cached resource in a fixed order; the
// accessors below read those caches with zero/empty defaults.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::Error;
use crate::model::{BlockingState, ComponentVersions, Statistics, VersionStatus};
use crate::session::client::SessionClient;
use crate::session::types::{
    BlockingStatus, ClientCount, ComponentVersion, DomainCount, Summary, TopClients, TopDomains,
    Upstream, Upstreams, VersionResponse, Versions,
};

static NO_REPLIES: BTreeMap<String, u64> = BTreeMap::new();

impl SessionClient {
    /// Refresh every cached resource.
    ///
    /// In order: summary, top 10 blocked domains, top 10 permitted domains,
    /// top 10 clients, upstreams, blocking status, versions. The first
    /// failure aborts; caches already replaced by this call keep their new
    /// value and the rest keep their previous one.
    pub async fn refresh_all(&mut self) -> Result<(), Error> {
        debug!("refreshing all resources");
        self.ensure_auth().await?;

        self.summary = Some(self.fetch_endpoint::<Summary>("stats/summary", &[]).await?);
        self.top_blocked = Some(
            self.fetch_endpoint::<TopDomains>(
                "stats/top_domains",
                &[("blocked", "true"), ("count", "10")],
            )
            .await?,
        );
        self.top_permitted = Some(
            self.fetch_endpoint::<TopDomains>(
                "stats/top_domains",
                &[("blocked", "false"), ("count", "10")],
            )
            .await?,
        );
        self.top_clients = Some(
            self.fetch_endpoint::<TopClients>("stats/top_clients", &[("count", "10")])
                .await?,
        );
        self.upstreams = Some(self.fetch_endpoint::<Upstreams>("stats/upstreams", &[]).await?);
        self.blocking = Some(
            self.fetch_endpoint::<BlockingStatus>("dns/blocking", &[])
                .await?,
        );
        self.fetch_versions().await?;
        Ok(())
    }

    /// Fetch and cache component versions.
    ///
    /// `GET /api/info/version`
    pub async fn fetch_versions(&mut self) -> Result<&Versions, Error> {
        self.ensure_auth().await?;
        let resp: VersionResponse = self.fetch_endpoint("info/version", &[]).await?;
        Ok(self.versions.insert(resp.version))
    }

    // ── Raw caches ───────────────────────────────────────────────────

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub fn blocking_status(&self) -> Option<&BlockingStatus> {
        self.blocking.as_ref()
    }

    pub fn versions(&self) -> Option<&Versions> {
        self.versions.as_ref()
    }

    pub fn upstreams(&self) -> Option<&Upstreams> {
        self.upstreams.as_ref()
    }

    // ── Summary accessors ────────────────────────────────────────────

    /// Blocking state from the last `dns/blocking` fetch.
    pub fn status(&self) -> BlockingState {
        BlockingState::from_status(self.blocking.as_ref().and_then(|b| b.blocking.as_deref()))
    }

    /// Seconds left on a timed disable, if one is running.
    pub fn blocking_timer(&self) -> Option<f64> {
        self.blocking.as_ref().and_then(|b| b.timer)
    }

    fn stat(&self, field: impl Fn(&Summary) -> u64) -> u64 {
        self.summary.as_ref().map_or(0, field)
    }

    pub fn unique_clients(&self) -> u64 {
        self.stat(|s| s.clients.active)
    }

    pub fn unique_domains(&self) -> u64 {
        self.stat(|s| s.queries.unique_domains)
    }

    pub fn ads_blocked_today(&self) -> u64 {
        self.stat(|s| s.queries.blocked)
    }

    pub fn ads_percentage_today(&self) -> f64 {
        self.summary
            .as_ref()
            .map_or(0.0, |s| s.queries.percent_blocked)
    }

    pub fn clients_ever_seen(&self) -> u64 {
        self.stat(|s| s.clients.total)
    }

    pub fn dns_queries_today(&self) -> u64 {
        self.stat(|s| s.queries.total)
    }

    pub fn domains_being_blocked(&self) -> u64 {
        self.stat(|s| s.gravity.domains_being_blocked)
    }

    pub fn queries_cached(&self) -> u64 {
        self.stat(|s| s.queries.cached)
    }

    pub fn queries_forwarded(&self) -> u64 {
        self.stat(|s| s.queries.forwarded)
    }

    /// Reply type → count, e.g. `"NXDOMAIN" → 12`.
    pub fn reply_types(&self) -> &BTreeMap<String, u64> {
        self.summary
            .as_ref()
            .map_or(&NO_REPLIES, |s| &s.queries.replies)
    }

    // ── Top lists ────────────────────────────────────────────────────

    /// Most queried permitted domains.
    pub fn top_queries(&self) -> &[DomainCount] {
        self.top_permitted
            .as_ref()
            .map(|t| t.domains.as_slice())
            .unwrap_or_default()
    }

    /// Most queried blocked domains.
    pub fn top_ads(&self) -> &[DomainCount] {
        self.top_blocked
            .as_ref()
            .map(|t| t.domains.as_slice())
            .unwrap_or_default()
    }

    pub fn top_clients(&self) -> &[ClientCount] {
        self.top_clients
            .as_ref()
            .map(|t| t.clients.as_slice())
            .unwrap_or_default()
    }

    /// Upstream resolvers with their query counts.
    pub fn forward_destinations(&self) -> &[Upstream] {
        self.upstreams
            .as_ref()
            .map(|u| u.upstreams.as_slice())
            .unwrap_or_default()
    }

    // ── Version accessors ────────────────────────────────────────────

    fn component(&self, pick: impl Fn(&Versions) -> &ComponentVersion) -> Option<&ComponentVersion> {
        self.versions.as_ref().map(pick)
    }

    pub fn core_current(&self) -> Option<&str> {
        self.component(|v| &v.core)?.current()
    }

    pub fn core_latest(&self) -> Option<&str> {
        self.component(|v| &v.core)?.latest()
    }

    pub fn core_update(&self) -> bool {
        self.component(|v| &v.core)
            .is_some_and(ComponentVersion::update_available)
    }

    pub fn web_current(&self) -> Option<&str> {
        self.component(|v| &v.web)?.current()
    }

    pub fn web_latest(&self) -> Option<&str> {
        self.component(|v| &v.web)?.latest()
    }

    pub fn web_update(&self) -> bool {
        self.component(|v| &v.web)
            .is_some_and(ComponentVersion::update_available)
    }

    pub fn ftl_current(&self) -> Option<&str> {
        self.component(|v| &v.ftl)?.current()
    }

    pub fn ftl_latest(&self) -> Option<&str> {
        self.component(|v| &v.ftl)?.latest()
    }

    pub fn ftl_update(&self) -> bool {
        self.component(|v| &v.ftl)
            .is_some_and(ComponentVersion::update_available)
    }

    // ── Generation-neutral views ─────────────────────────────────────

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

    pub fn component_versions(&self) -> ComponentVersions {
        let status = |c: &ComponentVersion| VersionStatus {
            current: c.current().map(str::to_owned),
            latest: c.latest().map(str::to_owned),
            update_available: c.update_available(),
        };
        let Some(v) = self.versions.as_ref() else {
            return ComponentVersions::default();
        };
        ComponentVersions {
            core: status(&v.core),
            web: status(&v.web),
            ftl: status(&v.ftl),
        }
    }
}
