//! Configuration module
//!
//! Handles CLI configuration.

use gradebook_client::ServerClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the grading server
    pub server_url: String,
}

impl Config {
    pub fn client(&self) -> ServerClient {
        ServerClient::new(self.server_url.as_str())
    }
}
