//! Flowboard GitHub Client
//!
//! Retrieves workflow run history from the GitHub Actions API and turns it
//! into Flowboard domain records.
//!
//! The crate is organized in layers:
//! - [`GitHubClient`]: thin, typed wrapper over the REST endpoints
//! - [`WorkflowSource`]: the seam the resolver talks to (real client or a fake)
//! - [`WorkflowResolver`]: pagination, name resolution, sorting, latest-only
//!   reduction and parameter extraction
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use flowboard_client::{GitHubClient, WorkflowResolver};
//! use flowboard_core::domain::filter::WorkflowFilter;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = GitHubClient::new("https://api.github.com", None, Duration::from_secs(30))?;
//!     let resolver = WorkflowResolver::new(Arc::new(client));
//!
//!     let filter = WorkflowFilter::parse("rust-lang/rust")?;
//!     for run in resolver.resolve(&filter, true).await? {
//!         println!("{} #{} {}", run.workflow_name, run.run_number, run.status);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod logs;
pub mod params;
pub mod resolver;
pub mod source;
mod workflows;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use resolver::WorkflowResolver;
pub use source::WorkflowSource;

use reqwest::header::{ACCEPT, HeaderValue, USER_AGENT};
use reqwest::{Client, RequestBuilder, redirect};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default base URL of the GitHub REST API
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const CLIENT_NAME: &str = concat!("flowboard/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the GitHub Actions API
///
/// Redirects are never followed automatically: the log endpoint answers with
/// a redirect to a pre-signed archive URL which is fetched without the token.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    /// Base URL of the API (e.g., "https://api.github.com")
    base_url: String,
    /// Optional personal access token
    token: Option<String>,
    /// HTTP client instance
    client: Client,
}

impl GitHubClient {
    /// Create a new client with a per-request timeout
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the API
    /// * `token` - Optional access token sent as a bearer credential
    /// * `timeout` - Deadline applied to every outbound call
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .user_agent(CLIENT_NAME)
            .build()?;

        Ok(Self::with_client(base_url, token, client))
    }

    /// Create a new client with a custom HTTP client
    ///
    /// The supplied client should not follow redirects, otherwise log archive
    /// downloads fail with [`ClientError::MissingRedirect`].
    pub fn with_client(base_url: impl Into<String>, token: Option<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            client,
        }
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether requests carry a credential
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Builds an authenticated GET request against the API
    fn api_get(&self, url: &str) -> RequestBuilder {
        let request = self
            .client
            .get(url)
            .header(ACCEPT, HeaderValue::from_static(MEDIA_TYPE))
            .header(USER_AGENT, HeaderValue::from_static(CLIENT_NAME))
            .header("X-GitHub-Api-Version", API_VERSION);

        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
