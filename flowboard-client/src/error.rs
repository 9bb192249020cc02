//! Error types for the Flowboard client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while resolving runs or extracting parameters
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message or response body from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The log endpoint did not answer with a redirect to the archive
    #[error("No log archive location returned for run {0}")]
    MissingRedirect(u64),

    /// A requested workflow name is not part of the repository catalog
    #[error("can't resolve ID of workflow with name '{0}'")]
    UnresolvedWorkflow(String),

    /// The log archive is corrupt or one of its entries can't be read
    #[error("Log archive error: {0}")]
    Archive(String),

    /// A line inside a parameter block is not a `key: value` pair
    #[error("Malformed parameter in log file '{file}' at line {line_number}: '{line}'")]
    MalformedParameter {
        /// Name of the log file inside the archive
        file: String,
        /// 1-based line number
        line_number: usize,
        /// The offending line
        line: String,
    },
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }

    /// Check if this error only affects parameter extraction of a single run
    pub fn is_extraction_error(&self) -> bool {
        matches!(
            self,
            Self::Archive(_) | Self::MalformedParameter { .. } | Self::MissingRedirect(_)
        )
    }
}

impl From<zip::result::ZipError> for ClientError {
    fn from(err: zip::result::ZipError) -> Self {
        ClientError::Archive(err.to_string())
    }
}
