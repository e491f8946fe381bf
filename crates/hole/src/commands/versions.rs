//! `hole versions`: installed vs. available component versions.

use serde::Serialize;
use tabled::Tabled;

use hole_api::{HoleClient, VersionStatus};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct ComponentEntry {
    component: &'static str,
    #[serde(flatten)]
    status: VersionStatus,
}

#[derive(Tabled)]
struct VersionRow {
    #[tabled(rename = "Component")]
    component: &'static str,
    #[tabled(rename = "Installed")]
    current: String,
    #[tabled(rename = "Latest")]
    latest: String,
    #[tabled(rename = "Update")]
    update: String,
}

pub async fn handle(client: &mut HoleClient, global: &GlobalOpts) -> Result<(), CliError> {
    client.refresh_versions().await?;
    let versions = client.versions();

    let entries = [
        ("core", versions.core),
        ("web", versions.web),
        ("ftl", versions.ftl),
    ]
    .map(|(component, status)| ComponentEntry { component, status });

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &entries,
        |e| VersionRow {
            component: e.component,
            current: e.status.current.clone().unwrap_or_else(|| "-".into()),
            latest: e.status.latest.clone().unwrap_or_else(|| "-".into()),
            update: output::paint_flag(e.status.update_available, color),
        },
        |e| {
            format!(
                "{} {}",
                e.component,
                e.status.current.as_deref().unwrap_or("-")
            )
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
