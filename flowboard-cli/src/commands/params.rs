//! Params command handler

use anyhow::{Context, Result};
use clap::Args;
use colored::*;

use crate::config::Config;
use crate::output::OutputFormat;

/// Arguments of `flowboard params`
#[derive(Args)]
pub struct ParamsArgs {
    /// ID of the workflow run
    run_id: u64,

    /// Output format
    #[arg(short, long, value_enum, default_value = "ascii")]
    format: OutputFormat,
}

/// Handle `flowboard params`
///
/// Any download or parse failure is reported as an error.
pub async fn handle_params_command(args: ParamsArgs, config: &Config) -> Result<()> {
    let resolver = config.resolver()?;
    let filter = config.filter(Vec::new(), 0);

    let parameters = resolver
        .extract(&filter, args.run_id)
        .await
        .with_context(|| format!("Failed to extract parameters of run {}", args.run_id))?;

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&parameters)?);
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "Run {} of {}/{}: {} log file(s)",
            parameters.run_id,
            parameters.owner,
            parameters.repo,
            parameters.parameter_sets.len()
        )
        .bold()
    );

    for (index, set) in parameters.parameter_sets.iter().enumerate() {
        if set.is_empty() {
            println!("  {} {}", format!("#{}", index).cyan(), "no parameters".dimmed());
            continue;
        }
        println!("  {}", format!("#{}", index).cyan());
        for (key, value) in set {
            println!("    {}: {}", key.bold(), value);
        }
    }

    Ok(())
}
