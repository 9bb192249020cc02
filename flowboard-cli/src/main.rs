//! Flowboard CLI
//!
//! One-shot access to the workflow runs of a GitHub repository.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use flowboard_client::DEFAULT_API_URL;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "flowboard")]
#[command(about = "GitHub workflow runs dashboard CLI", long_about = None)]
struct Cli {
    /// GitHub API URL
    #[arg(long, env = "FLOWBOARD_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// GitHub access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Repository owner
    #[arg(short, long, env = "FLOWBOARD_OWNER")]
    owner: String,

    /// Repository name
    #[arg(short, long, env = "FLOWBOARD_REPO")]
    repo: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        api_url: cli.api_url,
        token: cli.token,
        owner: cli.owner,
        repo: cli.repo,
        timeout: Duration::from_secs(cli.timeout),
    };

    handle_command(cli.command, &config).await
}
