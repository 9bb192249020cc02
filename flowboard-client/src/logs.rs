//! Run log archive endpoints

use reqwest::header::LOCATION;
use tracing::debug;

use crate::GitHubClient;
use crate::error::{ClientError, Result};
use flowboard_core::domain::repository::RepositoryId;

impl GitHubClient {
    // =============================================================================
    // Run Logs
    // =============================================================================

    /// Request the download location of a run's log archive
    ///
    /// The API answers with a redirect; the `Location` header is returned.
    pub async fn run_logs_location(&self, repository: &RepositoryId, run_id: u64) -> Result<String> {
        let url = format!(
            "{}/repos/{}/{}/actions/runs/{}/logs",
            self.base_url, repository.owner, repository.name, run_id
        );
        let response = self.api_get(&url).send().await?;
        let status = response.status();

        if status.is_redirection() {
            return response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
                .ok_or(ClientError::MissingRedirect(run_id));
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Err(ClientError::MissingRedirect(run_id))
    }

    /// Download a log archive from its pre-signed location
    ///
    /// The request carries no credential. A non-success status is reported
    /// together with the response body.
    pub async fn download_log_archive(&self, location: &str) -> Result<Vec<u8>> {
        let response = self.client.get(location).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::api_error(
                status.as_u16(),
                format!("GET {} - response: {} {}", location, status, body),
            ));
        }

        let bytes = response.bytes().await?;
        debug!("Downloaded log archive ({} bytes)", bytes.len());

        Ok(bytes.to_vec())
    }

    /// Resolve and download the log archive of a run
    pub async fn fetch_run_logs(&self, repository: &RepositoryId, run_id: u64) -> Result<Vec<u8>> {
        let location = self.run_logs_location(repository, run_id).await?;
        self.download_log_archive(&location).await
    }
}
