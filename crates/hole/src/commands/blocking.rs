//! `hole enable` / `hole disable`: toggle blocking and report convergence.

use hole_api::{BlockingChange, HoleClient};

use crate::cli::{DisableArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn enable(client: &mut HoleClient, global: &GlobalOpts) -> Result<(), CliError> {
    let change = client.enable().await?;
    report(change, global)
}

pub async fn disable(
    client: &mut HoleClient,
    args: DisableArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let change = client.disable(args.duration).await?;
    report(change, global)
}

fn report(change: Option<BlockingChange>, global: &GlobalOpts) -> Result<(), CliError> {
    // v5 without a token declines the toggle instead of failing.
    let change = change.ok_or_else(|| CliError::NoCredentials {
        credential: "API token".into(),
    })?;

    if !change.confirmed() && !global.quiet {
        eprintln!(
            "warning: blocking still reports '{}' after {} checks",
            change.observed, change.attempts
        );
    }

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &change,
        |c| {
            output::detail_lines(&[
                ("Requested", output::paint_state(c.target, color)),
                ("Observed", output::paint_state(c.observed, color)),
                ("Confirmed", output::paint_flag(c.confirmed(), false)),
            ])
        },
        |c| c.observed.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
