//! `hole top`: ranked domains, clients, and upstreams (v6 only).

use tabled::Tabled;

use hole_api::{HoleClient, SessionClient};
use hole_api::session::{ClientCount, DomainCount, Upstream};

use crate::cli::{GlobalOpts, TopArgs, TopCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct DomainRow {
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Queries")]
    count: u64,
}

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "Client")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Queries")]
    count: u64,
}

#[derive(Tabled)]
struct UpstreamRow {
    #[tabled(rename = "Upstream")]
    name: String,
    #[tabled(rename = "Port")]
    port: String,
    #[tabled(rename = "Queries")]
    count: u64,
}

pub async fn handle(
    client: &mut HoleClient,
    args: TopArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let session = client
        .as_session_mut()
        .ok_or_else(|| CliError::Unsupported {
            operation: "top".into(),
            required: "the v6 API".into(),
        })?;
    session.refresh_all().await?;

    let out = render(session, &args.command, global)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn render(
    session: &SessionClient,
    command: &TopCommand,
    global: &GlobalOpts,
) -> Result<String, CliError> {
    match command {
        TopCommand::Domains => domains(session.top_queries(), global),
        TopCommand::Ads => domains(session.top_ads(), global),
        TopCommand::Clients => output::render_list(
            &global.output,
            session.top_clients(),
            |c: &ClientCount| ClientRow {
                name: c.name.clone().filter(|n| !n.is_empty()).unwrap_or_else(|| "-".into()),
                ip: c.ip.clone(),
                count: c.count,
            },
            |c| c.ip.clone(),
        ),
        TopCommand::Upstreams => output::render_list(
            &global.output,
            session.forward_destinations(),
            |u: &Upstream| UpstreamRow {
                name: upstream_label(u),
                port: if u.port < 0 {
                    "-".into()
                } else {
                    u.port.to_string()
                },
                count: u.count,
            },
            upstream_label,
        ),
    }
}

fn domains(list: &[DomainCount], global: &GlobalOpts) -> Result<String, CliError> {
    output::render_list(
        &global.output,
        list,
        |d| DomainRow {
            domain: d.domain.clone(),
            count: d.count,
        },
        |d| d.domain.clone(),
    )
}

/// Name, else IP. Internal pseudo-upstreams (cache, blocklist) carry only a name.
fn upstream_label(u: &Upstream) -> String {
    u.name
        .as_deref()
        .filter(|n| !n.is_empty())
        .or(u.ip.as_deref())
        .unwrap_or("-")
        .to_owned()
}
