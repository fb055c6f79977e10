//! Gradebook HTTP Clients
//!
//! Every outbound HTTP conversation the grader has lives here:
//!
//! - [`GithubClient`]: read-only access to a code host's REST API (history,
//!   directory listings, raw content), behind the [`SourceHost`] trait.
//! - [`ChatCompletionClient`]: a chat-completion endpoint used as the grading
//!   oracle, behind the [`CompletionOracle`] trait.
//! - [`ServerClient`]: a typed client for the gradebook server API, used by the CLI.
//!
//! # Example
//!
//! ```no_run
//! use gradebook_client::ServerClient;
//! use gradebook_core::dto::question::GenerateQuestion;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ServerClient::new("http://localhost:5000");
//!
//!     let question = client
//!         .generate_question(GenerateQuestion {
//!             code: "print(sum(map(int, input().split())))".to_string(),
//!         })
//!         .await?;
//!
//!     println!("{}", question.question);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod oracle;
mod roster;
pub mod source_host;

// Re-export commonly used types
pub use error::{ClientError, OracleError, Result, SourceError};
pub use oracle::{ChatCompletionClient, CompletionOracle};
pub use source_host::{GithubClient, SourceHost};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// User agent sent with every outbound request
pub const USER_AGENT: &str = concat!("gradebook/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the Gradebook server API
#[derive(Debug, Clone)]
pub struct ServerClient {
    /// Base URL of the server (e.g., "http://localhost:5000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl ServerClient {
    /// Create a new server client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the server API (e.g., "http://localhost:5000")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new server client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Handle an API response and deserialize JSON
    ///
    /// Non-success statuses become [`ClientError::ApiError`], carrying the
    /// server's `error` message when the body has one.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(
                status.as_u16(),
                extract_error_message(&error_text),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

/// Pull `error` out of a `{"error": "..."}` body, or return the body as-is
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("error")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
