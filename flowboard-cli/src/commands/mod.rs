//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod params;
mod runs;

pub use params::ParamsArgs;
pub use runs::RunsArgs;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List workflow runs of the repository
    Runs(RunsArgs),
    /// Extract the parameters of a single run from its logs
    Params(ParamsArgs),
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Runs(args) => runs::handle_runs_command(args, config).await,
        Commands::Params(args) => params::handle_params_command(args, config).await,
    }
}
