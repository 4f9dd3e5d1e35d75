//! Command handler modules for the CLI.

mod status;
mod watch;

use crate::cli::{Cli, Commands};
use crate::error::CliError;

/// Dispatch a CLI command to the appropriate handler.
pub async fn dispatch(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Commands::Status => status::cmd_status(cli.config.as_deref(), cli.no_color).await,
        Commands::Watch { interval } => {
            watch::cmd_watch(cli.config.as_deref(), *interval, cli.no_color).await
        }
    }
}
