//! Config subcommand handlers.

use dialoguer::{Input, Select};

use hole_api::ApiVersion;
use hole_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Mask plaintext secrets before the config is displayed.
fn redact(cfg: &mut Config) {
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(REDACTED.into());
        }
        if profile.api_token.is_some() {
            profile.api_token = Some(REDACTED.into());
        }
    }
}

/// Format an already-redacted config as TOML-like text.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut profiles: Vec<_> = cfg.profiles.iter().collect();
    profiles.sort_by_key(|(name, _)| *name);
    for (name, p) in profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "url = \"{}\"", p.url);
        let _ = writeln!(out, "api_version = {}", p.api_version);
        let optional = [
            ("password", p.password.as_deref()),
            ("password_env", p.password_env.as_deref()),
            ("api_token", p.api_token.as_deref()),
            ("api_token_env", p.api_token_env.as_deref()),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                let _ = writeln!(out, "{key} = \"{value}\"");
            }
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Which secret a profile needs, by API generation.
fn secret_label(version: ApiVersion) -> &'static str {
    match version {
        ApiVersion::V5 => "API token",
        ApiVersion::V6 => "Password",
    }
}

/// Offer to store a secret in the system keyring or return it for plaintext config.
///
/// Returns `Some(secret)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_keyring_storage(
    profile: &Profile,
    profile_name: &str,
    secret: &str,
    label: &str,
) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt(format!("Where to store the {}?", label.to_lowercase()))
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        hole_config::store_secret(profile, profile_name, secret)?;
        eprintln!("   ✓ {label} stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(secret.to_owned()))
    }
}

fn load_or_default() -> Result<Config, CliError> {
    if hole_config::config_path().exists() {
        Ok(hole_config::load_config()?)
    } else {
        Ok(Config::default())
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),
        ConfigCommand::Show => {
            let mut cfg = load_or_default()?;
            redact(&mut cfg);
            let out = output::render_single(&global.output, &cfg, format_config, |c| {
                c.active_profile_name().to_owned()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        ConfigCommand::Profiles => {
            let cfg = load_or_default()?;
            let default = cfg.active_profile_name();
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: hole config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }
        ConfigCommand::Use { name } => {
            let mut cfg = load_or_default()?;
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::profile_not_found(name, cfg.profiles.keys()));
            }
            cfg.default_profile = Some(name.clone());
            hole_config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }
        ConfigCommand::SetPassword => {
            let cfg = load_or_default()?;
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg
                .profiles
                .get(&profile_name)
                .ok_or_else(|| CliError::profile_not_found(&profile_name, cfg.profiles.keys()))?;

            let label = secret_label(hole_config::profile_api_version(profile)?);
            let secret = rpassword::prompt_password(format!("{label}: ")).map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "secret".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            hole_config::store_secret(profile, &profile_name, &secret)?;
            eprintln!("✓ {label} stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let config_path = hole_config::config_path();
    eprintln!("hole configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    // 1. Profile name
    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    // 2. Appliance URL
    let url: String = Input::new()
        .with_prompt("Appliance URL")
        .default("http://pi.hole".into())
        .interact_text()
        .map_err(prompt_err)?;

    // 3. API generation
    let version_choices = &["v6 (password login)", "v5 (legacy API token)"];
    let version = match Select::new()
        .with_prompt("Admin API version")
        .items(version_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?
    {
        0 => ApiVersion::V6,
        _ => ApiVersion::V5,
    };

    let mut profile = Profile::new(url);
    profile.api_version = version.number();
    hole_config::profile_endpoint(&profile)?;

    // 4. Secret, optional: v6 appliances without a password accept
    // unauthenticated reads.
    let label = secret_label(version);
    let secret =
        rpassword::prompt_password(format!("{label} (empty to skip): ")).map_err(prompt_err)?;
    if !secret.is_empty() {
        let plaintext = prompt_keyring_storage(&profile, &profile_name, &secret, label)?;
        match version {
            ApiVersion::V5 => profile.api_token = plaintext,
            ApiVersion::V6 => profile.password = plaintext,
        }
    }

    // 5. Merge into existing config and write
    let mut cfg = load_or_default()?;
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    hole_config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: hole status");
    Ok(())
}
