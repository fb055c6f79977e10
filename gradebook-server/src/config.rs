//! Server configuration
//!
//! Defines all configurable parameters for the server: code host and oracle
//! endpoints and credentials, batch concurrency, timeouts and the listener.
//! Resolved once at startup and injected into the clients.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use gradebook_client::oracle::{DEFAULT_MODEL, OPENROUTER_API_URL};
use gradebook_client::source_host::GITHUB_API_URL;

use crate::service::batch::DEFAULT_MAX_CONCURRENCY;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Code host API base URL (e.g., "https://api.github.com")
    pub github_api_url: String,

    /// Optional code host credential; without it the host's anonymous rate limit applies
    pub github_token: Option<String>,

    /// Chat-completion API base URL
    pub oracle_url: String,

    /// Oracle credential
    pub oracle_api_key: Option<String>,

    /// Model identifier sent with each oracle request
    pub oracle_model: String,

    /// Maximum roster entries processed at once
    pub max_concurrent_entries: usize,

    /// Timeout for every outbound HTTP request
    pub request_timeout: Duration,

    /// Pick the most recently changed root file when several qualify
    pub prefer_newest_file: bool,

    /// Listener address
    pub bind_addr: String,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - GITHUB_TOKEN
    /// - GITHUB_API_URL (default: https://api.github.com)
    /// - OPENROUTER_API_KEY
    /// - ORACLE_URL (default: https://openrouter.ai/api/v1)
    /// - ORACLE_MODEL (default: mistralai/devstral-2512:free)
    /// - MAX_CONCURRENT_ENTRIES (default: 8)
    /// - REQUEST_TIMEOUT (seconds, default: 30)
    /// - PREFER_NEWEST_FILE (true/false, default: false)
    /// - GRADEBOOK_BIND_ADDR (default: 0.0.0.0:5000)
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let max_concurrent_entries = match non_empty_var("MAX_CONCURRENT_ENTRIES") {
            Some(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("MAX_CONCURRENT_ENTRIES is not a number: {raw}"))?,
            None => defaults.max_concurrent_entries,
        };

        let request_timeout = match non_empty_var("REQUEST_TIMEOUT") {
            Some(raw) => raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .with_context(|| format!("REQUEST_TIMEOUT is not a number of seconds: {raw}"))?,
            None => defaults.request_timeout,
        };

        let prefer_newest_file = non_empty_var("PREFER_NEWEST_FILE")
            .map(|raw| parse_flag(&raw))
            .transpose()?
            .unwrap_or(defaults.prefer_newest_file);

        Ok(Self {
            github_api_url: non_empty_var("GITHUB_API_URL").unwrap_or(defaults.github_api_url),
            github_token: non_empty_var("GITHUB_TOKEN"),
            oracle_url: non_empty_var("ORACLE_URL").unwrap_or(defaults.oracle_url),
            oracle_api_key: non_empty_var("OPENROUTER_API_KEY"),
            oracle_model: non_empty_var("ORACLE_MODEL").unwrap_or(defaults.oracle_model),
            max_concurrent_entries,
            request_timeout,
            prefer_newest_file,
            bind_addr: non_empty_var("GRADEBOOK_BIND_ADDR").unwrap_or(defaults.bind_addr),
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, url) in [
            ("github_api_url", &self.github_api_url),
            ("oracle_url", &self.oracle_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{name} must start with http:// or https://");
            }
        }

        if self.oracle_model.trim().is_empty() {
            anyhow::bail!("oracle_model cannot be empty");
        }

        if self.max_concurrent_entries == 0 {
            anyhow::bail!("max_concurrent_entries must be greater than 0");
        }

        if self.request_timeout.as_secs() == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        self.bind_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("bind_addr is not a socket address: {}", self.bind_addr))?;

        Ok(())
    }

    /// Shared outbound HTTP client honouring the request timeout
    pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .context("Failed to build HTTP client")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_api_url: GITHUB_API_URL.to_string(),
            github_token: None,
            oracle_url: OPENROUTER_API_URL.to_string(),
            oracle_api_key: None,
            oracle_model: DEFAULT_MODEL.to_string(),
            max_concurrent_entries: DEFAULT_MAX_CONCURRENCY,
            request_timeout: Duration::from_secs(30),
            prefer_newest_file: false,
            bind_addr: "0.0.0.0:5000".to_string(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean flag, got '{other}'"),
    }
}
