//! Configuration module
//!
//! Connection settings and the target repository shared by every command.

use anyhow::{Context, Result};
use flowboard_client::{GitHubClient, WorkflowResolver};
use flowboard_core::domain::filter::WorkflowFilter;
use std::sync::Arc;
use std::time::Duration;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub API base URL
    pub api_url: String,
    /// Optional access token
    pub token: Option<String>,
    /// Owner of the target repository
    pub owner: String,
    /// Name of the target repository
    pub repo: String,
    /// Deadline applied to every outbound call
    pub timeout: Duration,
}

impl Config {
    /// Builds a resolver backed by the GitHub API
    pub fn resolver(&self) -> Result<WorkflowResolver> {
        let client = GitHubClient::new(&self.api_url, self.token.clone(), self.timeout)
            .context("Failed to create GitHub client")?;
        Ok(WorkflowResolver::new(Arc::new(client)))
    }

    /// Filter selecting `workflows` of the configured repository
    pub fn filter(&self, workflows: Vec<String>, limit: usize) -> WorkflowFilter {
        WorkflowFilter::new(&self.owner, &self.repo)
            .with_workflows(workflows)
            .with_limit(limit)
    }
}
