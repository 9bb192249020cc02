use anyhow::Context;
use flowboard_client::{GitHubClient, WorkflowResolver};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod scheduler;
pub mod service;
pub mod views;

use config::Config;
use scheduler::StatePoller;
use service::StateStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "flowboard_server=info,flowboard_client=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Flowboard server...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    for filter in &config.filters {
        tracing::info!("Polling target: {}", filter);
    }

    let client = GitHubClient::new(
        config.api_url.clone(),
        config.token.clone(),
        config.request_timeout,
    )
    .context("Failed to create GitHub client")?;

    tracing::info!("Using GitHub API at {}", client.base_url());
    if !client.is_authenticated() {
        tracing::warn!("GITHUB_TOKEN not set, requests are subject to anonymous rate limits");
    }

    let resolver = WorkflowResolver::new(Arc::new(client));
    let store = Arc::new(StateStore::new());

    let poller = StatePoller::new(&config, resolver, Arc::clone(&store));
    tokio::spawn(async move { poller.run().await });

    // Build router with all endpoints
    let app = api::create_router(store);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
