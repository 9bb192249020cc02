//! Workflow source abstraction
//!
//! The resolver only needs three upstream operations. Keeping them behind a
//! trait lets the server and the tests swap the GitHub client for an
//! in-memory source.

use async_trait::async_trait;
use flowboard_core::domain::repository::RepositoryId;
use flowboard_core::dto::github::{WorkflowPage, WorkflowRunPage};

use crate::GitHubClient;
use crate::error::Result;

/// Upstream provider of workflow catalogs, runs and log archives
#[async_trait]
pub trait WorkflowSource: Send + Sync {
    /// Lists one 1-based page of the workflow catalog
    async fn list_workflows(
        &self,
        repository: &RepositoryId,
        page: usize,
        per_page: usize,
    ) -> Result<WorkflowPage>;

    /// Lists one 1-based page of runs of a workflow, newest first
    async fn list_workflow_runs(
        &self,
        repository: &RepositoryId,
        workflow_id: u64,
        page: usize,
        per_page: usize,
    ) -> Result<WorkflowRunPage>;

    /// Downloads the zipped log archive of a run
    async fn download_run_logs(&self, repository: &RepositoryId, run_id: u64) -> Result<Vec<u8>>;
}

#[async_trait]
impl WorkflowSource for GitHubClient {
    async fn list_workflows(
        &self,
        repository: &RepositoryId,
        page: usize,
        per_page: usize,
    ) -> Result<WorkflowPage> {
        GitHubClient::list_workflows(self, repository, page, per_page).await
    }

    async fn list_workflow_runs(
        &self,
        repository: &RepositoryId,
        workflow_id: u64,
        page: usize,
        per_page: usize,
    ) -> Result<WorkflowRunPage> {
        GitHubClient::list_workflow_runs(self, repository, workflow_id, page, per_page).await
    }

    async fn download_run_logs(&self, repository: &RepositoryId, run_id: u64) -> Result<Vec<u8>> {
        self.fetch_run_logs(repository, run_id).await
    }
}
