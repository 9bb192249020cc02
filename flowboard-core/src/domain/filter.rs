//! Workflow filter
//!
//! A filter selects which runs of one repository are resolved and cached.
//! Targets can be written as `owner/repo` or `owner/repo:Build,Release`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::domain::repository::RepositoryId;

/// Errors produced while parsing a target string
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterParseError {
    #[error("target '{0}' must have the form owner/repo[:workflow,...]")]
    InvalidTarget(String),

    #[error("target '{0}' is missing the repository owner")]
    MissingOwner(String),

    #[error("target '{0}' is missing the repository name")]
    MissingRepo(String),
}

/// Selection of workflow runs for one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowFilter {
    pub owner: String,
    pub repo: String,

    /// Workflow names to resolve; empty means every workflow in the catalog
    #[serde(default)]
    pub workflow_names: Vec<String>,

    /// Maximum runs kept per workflow, 0 means unbounded
    #[serde(default)]
    pub limit: usize,
}

impl WorkflowFilter {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            workflow_names: Vec::new(),
            limit: 0,
        }
    }

    pub fn with_workflows<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.workflow_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Cache key of the repository this filter targets
    pub fn repository_id(&self) -> RepositoryId {
        RepositoryId::new(&self.owner, &self.repo)
    }

    /// Parses `owner/repo[:workflow,...]`
    pub fn parse(input: &str) -> Result<Self, FilterParseError> {
        let input = input.trim();
        let (repository, workflows) = match input.split_once(':') {
            Some((repository, workflows)) => (repository, Some(workflows)),
            None => (input, None),
        };

        let (owner, repo) = repository
            .split_once('/')
            .ok_or_else(|| FilterParseError::InvalidTarget(input.to_string()))?;
        let owner = owner.trim();
        let repo = repo.trim();

        if owner.is_empty() {
            return Err(FilterParseError::MissingOwner(input.to_string()));
        }
        if repo.is_empty() {
            return Err(FilterParseError::MissingRepo(input.to_string()));
        }
        if repo.contains('/') {
            return Err(FilterParseError::InvalidTarget(input.to_string()));
        }

        let names: Vec<String> = workflows
            .map(|w| {
                w.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self::new(owner, repo).with_workflows(names))
    }

    /// Parses a `;`-separated list of targets
    pub fn parse_list(input: &str) -> Result<Vec<Self>, FilterParseError> {
        input
            .split(';')
            .map(str::trim)
            .filter(|target| !target.is_empty())
            .map(Self::parse)
            .collect()
    }
}

impl FromStr for WorkflowFilter {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for WorkflowFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)?;
        if !self.workflow_names.is_empty() {
            write!(f, ":{}", self.workflow_names.join(","))?;
        }
        Ok(())
    }
}
