// Appliance address: scheme, host, port and an optional path prefix.
//
// Immutable once built. Both client generations derive their request URLs
// from an `Endpoint` so port and prefix handling lives in one place.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::Error;

/// URL scheme used to reach the appliance. Exactly two are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(Error::InvalidProtocol(other.to_owned())),
        }
    }
}

/// Where the appliance lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    protocol: Protocol,
    host: String,
    port: u16,
    base_path: String,
}

impl Endpoint {
    /// Build an endpoint, defaulting the port from the scheme (80 / 443).
    pub fn new(protocol: Protocol, host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            protocol,
            host: host.into(),
            port: port.unwrap_or_else(|| protocol.default_port()),
            base_path: String::new(),
        }
    }

    /// Prefix every request path with `path` (for reverse-proxied appliances).
    pub fn with_base_path(mut self, path: &str) -> Self {
        let trimmed = path.trim_matches('/');
        self.base_path = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        };
        self
    }

    /// Parse `http(s)://host[:port][/prefix]`.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let url = Url::parse(raw)?;
        let protocol: Protocol = url.scheme().parse()?;
        let host = url
            .host_str()
            .ok_or(Error::InvalidUrl(url::ParseError::EmptyHost))?;
        Ok(Self::new(protocol, host, url.port()).with_base_path(url.path()))
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// `scheme://host[:port]`, with the port elided when it is the default.
    pub fn origin(&self) -> String {
        if self.port == self.protocol.default_port() {
            format!("{}://{}", self.protocol, self.host)
        } else {
            format!("{}://{}:{}", self.protocol, self.host, self.port)
        }
    }

    /// Absolute URL for `path` (relative to the base path).
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!(
            "{}{}/{path}",
            self.origin(),
            self.base_path
        ))?)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.origin(), self.base_path)
    }
}
