//! GitHub Actions DTOs
//!
//! Only the fields Flowboard reads are declared; everything else in the
//! upstream payloads is ignored. Nullable upstream fields are `Option`s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::repository::RepositoryId;
use crate::domain::run::WorkflowRun;

/// One page of `GET /repos/{owner}/{repo}/actions/workflows`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowPage {
    pub total_count: usize,
    #[serde(default)]
    pub workflows: Vec<Workflow>,
}

/// A workflow definition from the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// One page of `GET /repos/{owner}/{repo}/actions/workflows/{id}/runs`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowRunPage {
    pub total_count: usize,
    #[serde(default)]
    pub workflow_runs: Vec<RemoteRun>,
}

/// A workflow run as reported by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteRun {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub workflow_id: u64,
    #[serde(default)]
    pub run_number: u64,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub logs_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub head_branch: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub run_started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub head_commit: Option<HeadCommit>,
}

/// Commit that triggered a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeadCommit {
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl HeadCommit {
    /// SHA of the commit, falling back to `id` when `sha` is absent or empty
    pub fn commit_sha(&self) -> String {
        self.sha
            .as_deref()
            .filter(|sha| !sha.is_empty())
            .or(self.id.as_deref())
            .unwrap_or_default()
            .to_string()
    }
}

impl RemoteRun {
    /// Adapts the upstream record into a domain run owned by `repository`
    ///
    /// The run time is `run_started_at`, which GitHub resets when a run is
    /// re-run, so a re-run sorts as the newest run of its workflow. Only runs
    /// without a start time fall back to `created_at`.
    pub fn into_workflow_run(self, repository: &RepositoryId) -> WorkflowRun {
        let commit = self.head_commit.unwrap_or_default();
        let commit_sha = commit.commit_sha();
        let commit_author = commit
            .author
            .and_then(|author| author.name)
            .unwrap_or_default();

        WorkflowRun {
            owner: repository.owner.clone(),
            repo: repository.name.clone(),
            workflow_name: self.name.unwrap_or_default(),
            workflow_id: self.workflow_id,
            run_id: self.id,
            run_number: self.run_number,
            html_url: self.html_url.unwrap_or_default(),
            logs_url: self.logs_url.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            conclusion: self.conclusion.unwrap_or_default(),
            event: self.event.unwrap_or_default(),
            branch: self.head_branch.unwrap_or_default(),
            commit_sha,
            commit_author,
            commit_message: commit.message.unwrap_or_default(),
            commit_time: commit.timestamp,
            run_started_at: self.run_started_at.unwrap_or(self.created_at),
            parameters: None,
        }
    }
}
