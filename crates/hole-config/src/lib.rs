//! Shared configuration for the `hole` CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `hole_api::ConnectOptions`. The CLI layers its
//! flag overrides on top of what this crate resolves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hole_api::{ApiVersion, ConnectOptions, Endpoint, TlsMode, TransportConfig};

/// Keyring service name under which secrets are stored.
pub const KEYRING_SERVICE: &str = "hole";

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "HOLE_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named appliance profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is given explicitly.
    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    5
}

/// A named appliance profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Appliance URL, e.g. `http://pi.hole` or `https://10.0.0.2:8443/admin-proxy`.
    pub url: String,

    /// Admin API generation: 5 (legacy) or 6 (session).
    #[serde(default = "default_api_version")]
    pub api_version: u8,

    /// v6 password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the v6 password.
    pub password_env: Option<String>,

    /// v5 API token (plaintext; prefer keyring or env var).
    pub api_token: Option<String>,

    /// Environment variable name containing the v5 API token.
    pub api_token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

fn default_api_version() -> u8 {
    ApiVersion::default().number()
}

impl Profile {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_version: default_api_version(),
            password: None,
            password_env: None,
            api_token: None,
            api_token_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `$HOLE_CONFIG`, else XDG / platform
/// conventions.
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("rs", "hole", "hole").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("hole");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// A missing file is not an error; defaults and `HOLE_*` variables still
/// apply. Nested keys use a double underscore, e.g.
/// `HOLE_DEFAULTS__TIMEOUT=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HOLE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Walk the secret chain: named env var → keyring → plaintext.
fn resolve_secret(
    env_name: Option<&str>,
    keyring_user: &str,
    plaintext: Option<&str>,
) -> Option<SecretString> {
    // 1. Profile-named env var
    if let Some(val) = env_name.and_then(|name| std::env::var(name).ok()) {
        return Some(SecretString::from(val));
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, keyring_user) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    plaintext.map(|s| SecretString::from(s.to_owned()))
}

fn password_key(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

fn api_token_key(profile_name: &str) -> String {
    format!("{profile_name}/api-token")
}

/// Resolve the v6 password, if any is configured.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    resolve_secret(
        profile.password_env.as_deref(),
        &password_key(profile_name),
        profile.password.as_deref(),
    )
}

/// Resolve the v5 API token, if any is configured.
pub fn resolve_api_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    resolve_secret(
        profile.api_token_env.as_deref(),
        &api_token_key(profile_name),
        profile.api_token.as_deref(),
    )
}

/// Store the secret the profile's API version uses in the system keyring.
pub fn store_secret(
    profile: &Profile,
    profile_name: &str,
    secret: &str,
) -> Result<(), ConfigError> {
    let user = match profile_api_version(profile)? {
        ApiVersion::V5 => api_token_key(profile_name),
        ApiVersion::V6 => password_key(profile_name),
    };
    keyring::Entry::new(KEYRING_SERVICE, &user)?.set_password(secret)?;
    Ok(())
}

// ── Translation to client options ───────────────────────────────────

pub fn profile_api_version(profile: &Profile) -> Result<ApiVersion, ConfigError> {
    ApiVersion::try_from(profile.api_version).map_err(|_| ConfigError::Validation {
        field: "api_version".into(),
        reason: format!("expected 5 or 6, got {}", profile.api_version),
    })
}

pub fn profile_endpoint(profile: &Profile) -> Result<Endpoint, ConfigError> {
    Endpoint::parse(&profile.url).map_err(|e| ConfigError::Validation {
        field: "url".into(),
        reason: format!("{e}: {}", profile.url),
    })
}

/// Build `ConnectOptions` from a profile, no CLI flag overrides.
///
/// Profile `insecure`/`timeout` fall back to `defaults`. Both secrets
/// are resolved; the client ignores the one its API version doesn't use.
pub fn profile_to_connect_options(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<(ApiVersion, ConnectOptions), ConfigError> {
    let version = profile_api_version(profile)?;
    let endpoint = profile_endpoint(profile)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };
    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    let mut options = ConnectOptions::new(endpoint).with_transport(TransportConfig { tls, timeout });
    options.password = resolve_password(profile, profile_name);
    options.api_token = resolve_api_token(profile, profile_name);

    Ok((version, options))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.active_profile_name(), "default");
        assert_eq!(config.defaults.timeout, 5);
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn loads_profiles_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "basement"

[defaults]
timeout = 9

[profiles.basement]
url = "https://10.0.0.2:8443"
password = "hunter2"
insecure = true

[profiles.old]
url = "http://pi.hole"
api_version = 5
api_token = "abcdef"
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.active_profile_name(), "basement");
        assert_eq!(config.defaults.timeout, 9);

        let basement = config.profile("basement").unwrap();
        assert_eq!(basement.api_version, 6);
        assert_eq!(basement.insecure, Some(true));

        let old = config.profile("old").unwrap();
        assert_eq!(old.api_version, 5);
        assert!(matches!(
            config.profile("attic"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config
            .profiles
            .insert("default".into(), Profile::new("http://pi.hole:8080"));
        save_config_to(&config, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profile("default").unwrap().url, "http://pi.hole:8080");
    }

    #[test]
    fn converts_profile_to_connect_options() {
        let mut profile = Profile::new("https://pi.example.net:8443/pihole");
        profile.password = Some("hunter2".into());
        profile.timeout = Some(3);

        let (version, options) =
            profile_to_connect_options(&profile, "hole-config-test", &Defaults::default()).unwrap();

        assert_eq!(version, ApiVersion::V6);
        assert_eq!(options.endpoint.port(), 8443);
        assert_eq!(options.endpoint.base_path(), "/pihole");
        assert_eq!(options.transport.timeout, Duration::from_secs(3));
        assert_eq!(options.transport.tls, TlsMode::System);
        assert_eq!(
            options.password.as_ref().map(|s| s.expose_secret()),
            Some("hunter2")
        );
    }

    #[test]
    fn insecure_default_applies_when_profile_is_silent() {
        let profile = Profile::new("https://pi.hole");
        let defaults = Defaults {
            insecure: true,
            ..Defaults::default()
        };

        let (_, options) = profile_to_connect_options(&profile, "hole-config-test", &defaults).unwrap();
        assert_eq!(options.transport.tls, TlsMode::DangerAcceptInvalid);
    }

    #[test]
    fn rejects_bad_version_and_url() {
        let mut profile = Profile::new("http://pi.hole");
        profile.api_version = 4;
        assert!(matches!(
            profile_api_version(&profile),
            Err(ConfigError::Validation { ref field, .. }) if field == "api_version"
        ));

        let profile = Profile::new("gopher://pi.hole");
        assert!(matches!(
            profile_endpoint(&profile),
            Err(ConfigError::Validation { ref field, .. }) if field == "url"
        ));
    }
}
