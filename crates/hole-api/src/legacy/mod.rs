// Legacy API client modules
//
// Client for the appliance's v5 `api.php` script: token-in-query auth,
// `api` → `admin` location fallback, summary/versions/blocking.

pub mod blocking;
pub mod client;
pub mod models;
pub mod stats;

pub use client::{LegacyClient, LegacyLocation};
pub use models::{LegacySummary, LegacyVersions};
