//! Server configuration
//!
//! Defines the polling targets, intervals and connection settings of the
//! server. Everything is read from the environment with sensible defaults.

use anyhow::Context;
use flowboard_client::DEFAULT_API_URL;
use flowboard_core::domain::filter::WorkflowFilter;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub API base URL
    pub api_url: String,

    /// Optional GitHub access token
    pub token: Option<String>,

    /// Repositories (and workflows) to poll, in polling order
    pub filters: Vec<WorkflowFilter>,

    /// How often to refresh every repository
    pub poll_interval: Duration,

    /// Keep only the latest run of every workflow
    pub latest_only: bool,

    /// Download run logs and extract their parameters
    pub parse_params: bool,

    /// Deadline applied to every outbound HTTP call
    pub request_timeout: Duration,

    /// Address the HTTP server binds to
    pub bind_addr: String,
}

impl Config {
    /// Creates a configuration for `filters` with defaults for everything else
    pub fn new(filters: Vec<WorkflowFilter>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            filters,
            poll_interval: Duration::from_secs(300),
            latest_only: true,
            parse_params: false,
            request_timeout: Duration::from_secs(30),
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - FLOWBOARD_TARGETS (required, `owner/repo[:wf,...]` separated by `;`)
    /// - GITHUB_TOKEN (optional)
    /// - FLOWBOARD_API_URL (optional, default: https://api.github.com)
    /// - FLOWBOARD_POLL_INTERVAL (optional, seconds, default: 300)
    /// - FLOWBOARD_LATEST_ONLY (optional, default: true)
    /// - FLOWBOARD_PARSE_PARAMS (optional, default: false)
    /// - FLOWBOARD_RUN_LIMIT (optional, runs per workflow, 0 = unbounded, default: 100)
    /// - FLOWBOARD_REQUEST_TIMEOUT (optional, seconds, default: 30)
    /// - FLOWBOARD_BIND_ADDR (optional, default: 0.0.0.0:8080)
    pub fn from_env() -> anyhow::Result<Self> {
        let targets = std::env::var("FLOWBOARD_TARGETS")
            .map_err(|_| anyhow::anyhow!("FLOWBOARD_TARGETS environment variable not set"))?;

        let run_limit = env_parse::<usize>("FLOWBOARD_RUN_LIMIT")?.unwrap_or(100);

        let filters = WorkflowFilter::parse_list(&targets)
            .context("Invalid FLOWBOARD_TARGETS")?
            .into_iter()
            .map(|filter| filter.with_limit(run_limit))
            .collect();

        let mut config = Self::new(filters);

        if let Ok(api_url) = std::env::var("FLOWBOARD_API_URL") {
            config.api_url = api_url;
        }

        config.token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());

        if let Some(secs) = env_parse::<u64>("FLOWBOARD_POLL_INTERVAL")? {
            config.poll_interval = Duration::from_secs(secs);
        }

        if let Some(latest_only) = env_parse::<bool>("FLOWBOARD_LATEST_ONLY")? {
            config.latest_only = latest_only;
        }

        if let Some(parse_params) = env_parse::<bool>("FLOWBOARD_PARSE_PARAMS")? {
            config.parse_params = parse_params;
        }

        if let Some(secs) = env_parse::<u64>("FLOWBOARD_REQUEST_TIMEOUT")? {
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Ok(bind_addr) = std::env::var("FLOWBOARD_BIND_ADDR") {
            config.bind_addr = bind_addr;
        }

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.filters.is_empty() {
            anyhow::bail!("at least one polling target is required");
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            anyhow::bail!("api_url must start with http:// or https://");
        }

        if self.poll_interval.as_secs() == 0 {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.request_timeout.as_secs() == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        Ok(())
    }
}

/// Reads and parses an optional environment variable
fn env_parse<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("environment variable {}={} can't be parsed: {}", name, value, e)),
        _ => Ok(None),
    }
}
