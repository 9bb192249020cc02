//! Runs command handler
//!
//! Resolves the runs of the configured repository and prints them.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;

use crate::config::Config;
use crate::output::{OutputFormat, render_runs};

/// Arguments of `flowboard runs`
#[derive(Args)]
pub struct RunsArgs {
    /// Workflow names to list; every workflow when empty
    #[arg(env = "FLOWBOARD_WORKFLOWS", value_delimiter = ',')]
    pub workflows: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "ascii")]
    pub format: OutputFormat,

    /// List every run instead of the latest run of each workflow
    #[arg(short, long)]
    pub all: bool,

    /// Download run logs and show their parameters
    #[arg(short, long)]
    pub params: bool,

    /// Maximum runs fetched per workflow (0 = unbounded)
    #[arg(short, long, default_value = "100")]
    pub limit: usize,
}

/// Handle `flowboard runs`
///
/// Resolution errors abort the command. Parameter extraction failures only
/// drop the parameters of the affected run.
pub async fn handle_runs_command(args: RunsArgs, config: &Config) -> Result<()> {
    let resolver = config.resolver()?;
    let filter = config.filter(args.workflows, args.limit);

    let mut runs = resolver
        .resolve(&filter, !args.all)
        .await
        .with_context(|| format!("Failed to resolve workflow runs of {}", filter))?;

    if args.params {
        let enriched = resolver.enrich(&filter, &mut runs).await;
        tracing::debug!("Extracted parameters of {}/{} run(s)", enriched, runs.len());
    }

    if runs.is_empty() && args.format == OutputFormat::Ascii {
        println!("{}", "No workflow runs found.".yellow());
        return Ok(());
    }

    print!("{}", render_runs(&runs, args.format)?);
    if args.format == OutputFormat::Json {
        println!();
    }
    Ok(())
}
