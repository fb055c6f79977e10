//! Error types for the Gradebook clients

use thiserror::Error;

/// Result type alias for server API client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when calling the Gradebook server
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
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }
}

/// Failures reported by a code host
///
/// These are the only three kinds the grading pipeline distinguishes.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Repository or path is absent, or private
    #[error("not found: {0}")]
    NotFound(String),

    /// The host signalled quota exhaustion
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Anything else, including transport failures and malformed responses
    #[error("host error: {0}")]
    Host(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Host(err.to_string())
    }
}

/// Failures talking to the grading oracle
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle credential is not configured")]
    MissingCredential,

    #[error("oracle request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The oracle answered with a non-success status (quota, auth, bad request)
    #[error("oracle service error (status {status}): {message}")]
    Service { status: u16, message: String },

    /// The reply envelope did not carry a message
    #[error("malformed oracle reply: {0}")]
    MalformedReply(String),
}
