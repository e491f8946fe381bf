//! `hole summary`: headline counters.

use hole_api::{HoleClient, Statistics};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(client: &mut HoleClient, global: &GlobalOpts) -> Result<(), CliError> {
    client.refresh().await?;
    let stats = client.statistics();

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &stats,
        |s| detail(s, color),
        |s| s.dns_queries_today.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn detail(s: &Statistics, color: bool) -> String {
    output::detail_lines(&[
        ("Blocking", output::paint_state(s.status, color)),
        ("Queries today", s.dns_queries_today.to_string()),
        ("Blocked today", s.ads_blocked_today.to_string()),
        ("Blocked %", format!("{:.1}", s.ads_percentage_today)),
        ("Domains on lists", s.domains_being_blocked.to_string()),
        ("Unique domains", s.unique_domains.to_string()),
        ("Forwarded", s.queries_forwarded.to_string()),
        ("Cached", s.queries_cached.to_string()),
        ("Clients (active)", s.unique_clients.to_string()),
        ("Clients (total)", s.clients_ever_seen.to_string()),
    ])
}
