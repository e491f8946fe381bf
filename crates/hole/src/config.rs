//! CLI flag overrides layered over `hole-config` profiles.
//!
//! Precedence: flag / `HOLE_*` env var > profile > `[defaults]`.

use secrecy::SecretString;

use hole_api::{ApiVersion, ConnectOptions};
use hole_config::{Config, Profile};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

/// Build client options from the config file, active profile, and flags.
///
/// Without a matching profile a `--url` alone is enough; an explicit
/// `--profile` that doesn't exist is an error.
pub fn build_connect_options(
    global: &GlobalOpts,
) -> Result<(ApiVersion, ConnectOptions), CliError> {
    let cfg = hole_config::load_config()?;
    build_connect_options_from(global, &cfg)
}

pub fn build_connect_options_from(
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<(ApiVersion, ConnectOptions), CliError> {
    let profile_name = active_profile_name(global, cfg);

    let mut profile = if let Some(profile) = cfg.profiles.get(&profile_name) {
        profile.clone()
    } else if global.profile.is_some() && global.url.is_none() {
        return Err(CliError::profile_not_found(
            profile_name,
            cfg.profiles.keys(),
        ));
    } else {
        let url = global.url.as_deref().ok_or_else(|| CliError::NoConfig {
            path: hole_config::config_path().display().to_string(),
        })?;
        Profile::new(url)
    };

    apply_overrides(&mut profile, global);
    let (version, mut options) =
        hole_config::profile_to_connect_options(&profile, &profile_name, &cfg.defaults)?;

    if let Some(ref password) = global.password {
        options.password = Some(SecretString::from(password.clone()));
    }
    if let Some(ref token) = global.api_token {
        options.api_token = Some(SecretString::from(token.clone()));
    }

    tracing::debug!(
        profile = %profile_name,
        url = %profile.url,
        api_version = version.number(),
        "resolved connection options"
    );
    Ok((version, options))
}

fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref url) = global.url {
        profile.url.clone_from(url);
    }
    if let Some(version) = global.api_version {
        profile.api_version = version;
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
}
