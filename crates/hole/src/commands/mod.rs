//! Command dispatch: bridges CLI args -> `HoleClient` calls -> output formatting.

pub mod blocking;
pub mod config_cmd;
pub mod status;
pub mod summary;
pub mod top;
pub mod versions;

use hole_api::HoleClient;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an appliance-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: &mut HoleClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(client, global).await,
        Command::Summary => summary::handle(client, global).await,
        Command::Top(args) => top::handle(client, args, global).await,
        Command::Versions => versions::handle(client, global).await,
        Command::Enable => blocking::enable(client, global).await,
        Command::Disable(args) => blocking::disable(client, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
