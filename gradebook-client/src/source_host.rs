//! Code host client
//!
//! Read-only access to a GitHub-compatible REST API:
//! - Listing recent history (optionally for one path)
//! - Fetching one history entry with its changed files
//! - Listing a directory
//! - Fetching raw file content
//! - Checking that a repository exists
//!
//! The credential is optional. Without it the host simply applies a lower
//! rate-limit ceiling.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gradebook_core::domain::repository::{FileRef, HistoryEntry, HistorySummary, RepositoryRef};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::SourceError;

/// Result type alias for code host operations
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Default public API endpoint
pub const GITHUB_API_URL: &str = "https://api.github.com";

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Read operations the grading pipeline needs from a code host
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Lists the most recent history entries, newest first
    ///
    /// # Arguments
    /// * `repo` - The repository to inspect
    /// * `limit` - Maximum number of entries to return
    /// * `path` - Only consider entries that touched this path
    async fn list_recent_history(
        &self,
        repo: &RepositoryRef,
        limit: usize,
        path: Option<&str>,
    ) -> SourceResult<Vec<HistorySummary>>;

    /// Fetches one history entry including its changed-file list
    async fn get_history_entry(
        &self,
        repo: &RepositoryRef,
        entry_id: &str,
    ) -> SourceResult<HistoryEntry>;

    /// Lists the files of a directory (`""` is the repository root)
    async fn list_directory(&self, repo: &RepositoryRef, path: &str) -> SourceResult<Vec<FileRef>>;

    /// Fetches raw content, coerced to text
    async fn fetch_raw(&self, locator: &str) -> SourceResult<String>;

    /// Succeeds when the repository is visible with the configured credential
    async fn get_repository(&self, repo: &RepositoryRef) -> SourceResult<()>;
}

/// GitHub REST implementation of [`SourceHost`]
#[derive(Debug, Clone)]
pub struct GithubClient {
    api_url: String,
    token: Option<String>,
    client: Client,
}

impl GithubClient {
    /// Creates a client against `api_url`, optionally authenticated
    ///
    /// # Example
    /// ```
    /// use gradebook_client::GithubClient;
    ///
    /// let anonymous = GithubClient::new("https://api.github.com", None);
    /// assert!(!anonymous.is_authenticated());
    /// ```
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Self {
        Self::with_client(api_url, token, Client::new())
    }

    /// Creates a client using a preconfigured reqwest client (timeouts, proxies)
    pub fn with_client(api_url: impl Into<String>, token: Option<String>, client: Client) -> Self {
        let api_url = api_url.into();
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
            client,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn repo_url(&self, repo: &RepositoryRef) -> String {
        format!("{}/repos/{}/{}", self.api_url, repo.owner, repo.name)
    }

    fn headers(&self, api: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(crate::USER_AGENT));
        if api {
            headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE));
        }
        if let Some(token) = &self.token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    fn api_get(&self, url: &str) -> RequestBuilder {
        self.client.get(url).headers(self.headers(true))
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> SourceResult<T> {
        let response = check_status(request.send().await?).await?;
        response
            .json()
            .await
            .map_err(|e| SourceError::Host(format!("Failed to parse host response: {}", e)))
    }
}

#[async_trait]
impl SourceHost for GithubClient {
    async fn list_recent_history(
        &self,
        repo: &RepositoryRef,
        limit: usize,
        path: Option<&str>,
    ) -> SourceResult<Vec<HistorySummary>> {
        let url = format!("{}/commits", self.repo_url(repo));
        debug!("Listing history for {} (limit {}, path {:?})", repo, limit, path);

        let mut request = self.api_get(&url).query(&[("per_page", limit.to_string())]);
        if let Some(path) = path {
            request = request.query(&[("path", path)]);
        }

        let commits: Vec<CommitSummary> = self.get_json(request).await?;
        Ok(commits.into_iter().map(HistorySummary::from).collect())
    }

    async fn get_history_entry(
        &self,
        repo: &RepositoryRef,
        entry_id: &str,
    ) -> SourceResult<HistoryEntry> {
        let url = format!("{}/commits/{}", self.repo_url(repo), entry_id);
        let detail: CommitDetail = self.get_json(self.api_get(&url)).await?;
        Ok(detail.into())
    }

    async fn list_directory(&self, repo: &RepositoryRef, path: &str) -> SourceResult<Vec<FileRef>> {
        let path = path.trim_matches('/');
        let url = if path.is_empty() {
            format!("{}/contents", self.repo_url(repo))
        } else {
            format!("{}/contents/{}", self.repo_url(repo), path)
        };

        let items: Vec<ContentItem> = self.get_json(self.api_get(&url)).await?;
        Ok(items.into_iter().filter_map(ContentItem::into_file_ref).collect())
    }

    async fn fetch_raw(&self, locator: &str) -> SourceResult<String> {
        let request = self.client.get(locator).headers(self.headers(false));
        let response = check_status(request.send().await?).await?;
        let bytes = response.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn get_repository(&self, repo: &RepositoryRef) -> SourceResult<()> {
        let response = self.api_get(&self.repo_url(repo)).send().await?;
        check_status(response).await.map(|_| ())
    }
}

/// Map a non-success response onto the three host error kinds
async fn check_status(response: Response) -> SourceResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(classify_status(status, &url, &body))
}

fn classify_status(status: StatusCode, url: &str, body: &str) -> SourceError {
    match status {
        StatusCode::NOT_FOUND => SourceError::NotFound(url.to_string()),
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
            SourceError::RateLimited(format!("{} ({})", url, status))
        }
        _ => SourceError::Host(format!("{} returned {}: {}", url, status, body.trim())),
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct CommitSummary {
    sha: String,
    #[serde(default)]
    commit: Option<CommitMeta>,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    sha: String,
    #[serde(default)]
    commit: Option<CommitMeta>,
    #[serde(default)]
    files: Vec<CommitFile>,
}

#[derive(Debug, Deserialize)]
struct CommitMeta {
    #[serde(default)]
    author: Option<Signature>,
    #[serde(default)]
    committer: Option<Signature>,
}

#[derive(Debug, Deserialize)]
struct Signature {
    #[serde(default)]
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct CommitFile {
    filename: String,
    raw_url: Option<String>,
    blob_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentItem {
    path: String,
    download_url: Option<String>,
    html_url: Option<String>,
}

impl CommitMeta {
    /// Committer date, falling back to the author date
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.committer
            .as_ref()
            .and_then(|s| s.date)
            .or_else(|| self.author.as_ref().and_then(|s| s.date))
    }
}

impl From<CommitSummary> for HistorySummary {
    fn from(commit: CommitSummary) -> Self {
        HistorySummary {
            id: commit.sha,
            timestamp: commit.commit.as_ref().and_then(CommitMeta::timestamp),
        }
    }
}

impl From<CommitDetail> for HistoryEntry {
    fn from(detail: CommitDetail) -> Self {
        HistoryEntry {
            id: detail.sha,
            timestamp: detail.commit.as_ref().and_then(CommitMeta::timestamp),
            changed_files: detail
                .files
                .into_iter()
                .filter_map(|file| {
                    let raw_url = file.raw_url?;
                    Some(FileRef {
                        view_url: file.blob_url.unwrap_or_else(|| raw_url.clone()),
                        path: file.filename,
                        raw_url,
                    })
                })
                .collect(),
        }
    }
}

impl ContentItem {
    /// Directories and submodules carry no download locator and are skipped
    fn into_file_ref(self) -> Option<FileRef> {
        let raw_url = self.download_url?;
        Some(FileRef {
            view_url: self.html_url.unwrap_or_else(|| raw_url.clone()),
            path: self.path,
            raw_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, "u", ""),
            SourceError::NotFound(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, "u", ""),
            SourceError::RateLimited(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, "u", ""),
            SourceError::RateLimited(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, "u", "oops"),
            SourceError::Host(_)
        ));
    }

    #[test]
    fn test_blank_token_is_anonymous() {
        let client = GithubClient::new("https://api.github.com/", Some("  ".to_string()));
        assert!(!client.is_authenticated());
        assert_eq!(client.api_url(), "https://api.github.com");
    }

    #[test]
    fn test_commit_file_without_blob_url_falls_back_to_raw() {
        let detail: CommitDetail = serde_json::from_value(serde_json::json!({
            "sha": "abc",
            "commit": { "committer": { "date": "2024-03-01T10:00:00Z" } },
            "files": [
                { "filename": "a.py", "raw_url": "https://raw/a.py", "blob_url": null },
                { "filename": "gone.py", "raw_url": null, "blob_url": null }
            ]
        }))
        .unwrap();

        let entry = HistoryEntry::from(detail);
        assert_eq!(entry.id, "abc");
        assert!(entry.timestamp.is_some());
        assert_eq!(entry.changed_files.len(), 1);
        assert_eq!(entry.changed_files[0].view_url, "https://raw/a.py");
    }

    #[test]
    fn test_directory_entries_are_skipped() {
        let items: Vec<ContentItem> = serde_json::from_value(serde_json::json!([
            { "path": "src", "download_url": null, "html_url": "https://view/src" },
            { "path": "main.py", "download_url": "https://raw/main.py", "html_url": "https://view/main.py" }
        ]))
        .unwrap();

        let files: Vec<FileRef> = items.into_iter().filter_map(ContentItem::into_file_ref).collect();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "main.py");
    }
}
