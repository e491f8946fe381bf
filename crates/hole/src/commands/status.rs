//! `hole status`: current blocking state.

use serde::Serialize;

use hole_api::{BlockingState, HoleClient, SessionClient};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct StatusView {
    status: BlockingState,
    /// Seconds left on a timed disable (v6 only).
    timer_secs: Option<f64>,
    api_version: u8,
    endpoint: String,
}

pub async fn handle(client: &mut HoleClient, global: &GlobalOpts) -> Result<(), CliError> {
    client.refresh().await?;

    let view = StatusView {
        status: client.status(),
        timer_secs: client.as_session().and_then(SessionClient::blocking_timer),
        api_version: client.api_version().number(),
        endpoint: client.endpoint().origin(),
    };

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &view,
        |v| detail(v, color),
        |v| v.status.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn detail(view: &StatusView, color: bool) -> String {
    let timer = view
        .timer_secs
        .map_or_else(|| "-".into(), |secs| format!("{secs:.0}s remaining"));
    output::detail_lines(&[
        ("Blocking", output::paint_state(view.status, color)),
        ("Timer", timer),
        ("Appliance", view.endpoint.clone()),
        ("API", format!("v{}", view.api_version)),
    ])
}
