//! Workflow catalog and run listing endpoints

use crate::GitHubClient;
use crate::error::Result;
use flowboard_core::domain::repository::RepositoryId;
use flowboard_core::dto::github::{WorkflowPage, WorkflowRunPage};

impl GitHubClient {
    // =============================================================================
    // Workflows
    // =============================================================================

    /// List one page of the workflow catalog of a repository
    ///
    /// # Arguments
    /// * `repository` - The repository to list
    /// * `page` - 1-based page number
    /// * `per_page` - Page size (GitHub caps it at 100)
    pub async fn list_workflows(
        &self,
        repository: &RepositoryId,
        page: usize,
        per_page: usize,
    ) -> Result<WorkflowPage> {
        let url = format!(
            "{}/repos/{}/{}/actions/workflows",
            self.base_url, repository.owner, repository.name
        );
        let response = self
            .api_get(&url)
            .query(&[("per_page", per_page), ("page", page)])
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List one page of the runs of a workflow, newest first
    ///
    /// # Arguments
    /// * `repository` - The repository owning the workflow
    /// * `workflow_id` - Catalog id of the workflow
    /// * `page` - 1-based page number
    /// * `per_page` - Page size (GitHub caps it at 100)
    pub async fn list_workflow_runs(
        &self,
        repository: &RepositoryId,
        workflow_id: u64,
        page: usize,
        per_page: usize,
    ) -> Result<WorkflowRunPage> {
        let url = format!(
            "{}/repos/{}/{}/actions/workflows/{}/runs",
            self.base_url, repository.owner, repository.name, workflow_id
        );
        let response = self
            .api_get(&url)
            .query(&[("per_page", per_page), ("page", page)])
            .send()
            .await?;

        self.handle_response(response).await
    }
}
