// hole-api: Async Rust client for the Pi-hole admin API (v5 legacy + v6 session)

pub mod auth;
pub mod client;
pub mod convergence;
pub mod endpoint;
pub mod error;
pub mod legacy;
pub mod model;
pub mod session;
pub mod transport;

pub use auth::{ApiVersion, Session, SessionState};
pub use client::{ConnectOptions, HoleClient};
pub use convergence::ConvergencePolicy;
pub use endpoint::{Endpoint, Protocol};
pub use error::{Error, ErrorKind};
pub use legacy::LegacyClient;
pub use model::{BlockingChange, BlockingState, ComponentVersions, Statistics, VersionStatus};
pub use session::SessionClient;
pub use transport::{TlsMode, TransportConfig};

pub use secrecy::SecretString;
