// Session API client modules
//
// Client for the appliance's v6 REST API under `/api`: password login,
// `X-FTL-SID`/`X-FTL-CSRF` headers, stats, versions and blocking control.

pub mod auth;
pub mod blocking;
pub mod client;
pub mod stats;
pub mod types;

pub use client::SessionClient;
pub use types::{
    BlockingRequest, BlockingStatus, ClientCount, ComponentVersion, DomainCount, Summary,
    TopClients, TopDomains, Upstream, Upstreams, VersionDetail, Versions,
};
