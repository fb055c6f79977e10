//! Code Resolver
//!
//! Picks the one source file that counts as a repository's current submission.
//!
//! Two strategies run in order:
//! - Recency: the files changed by the latest history entry, in host order.
//! - Directory: the repository root listing, in listing order.
//!
//! The recency strategy never fails outward; any error there falls through to
//! the directory strategy. Errors from the directory strategy propagate since
//! nothing is left to try. Finding nothing at all is `Ok(None)`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gradebook_client::{SourceError, SourceHost};
use gradebook_core::domain::repository::{FileRef, RepositoryRef, ResolvedSubmission};
use tracing::debug;

/// Suffixes treated as program source (markup and docs are deliberately absent)
pub const RECOGNIZED_EXTENSIONS: &[&str] = &[
    ".py", ".js", ".jsx", ".ts", ".tsx", ".java", ".c", ".h", ".cpp", ".cc", ".hpp", ".cs", ".go",
    ".rs", ".rb", ".php", ".kt", ".swift", ".scala",
];

/// Whether a path ends with a recognized source extension
pub fn is_recognized_source(path: &str) -> bool {
    RECOGNIZED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Two-tier submission resolver over a [`SourceHost`]
pub struct CodeResolver {
    host: Arc<dyn SourceHost>,
    prefer_newest: bool,
}

impl CodeResolver {
    pub fn new(host: Arc<dyn SourceHost>) -> Self {
        Self {
            host,
            prefer_newest: false,
        }
    }

    /// When several recognized files sit in the root listing, pick the one
    /// with the most recent history instead of the first listed
    pub fn prefer_newest(mut self, enabled: bool) -> Self {
        self.prefer_newest = enabled;
        self
    }

    /// Resolve the current submission of `repo`
    pub async fn resolve(
        &self,
        repo: &RepositoryRef,
    ) -> Result<Option<ResolvedSubmission>, SourceError> {
        match self.from_latest_change(repo).await {
            Ok(Some(submission)) => return Ok(Some(submission)),
            Ok(None) => debug!("{}: latest change has no source file", repo),
            Err(e) => debug!("{}: recency lookup failed, scanning root: {}", repo, e),
        }

        self.from_root_listing(repo).await
    }

    async fn from_latest_change(
        &self,
        repo: &RepositoryRef,
    ) -> Result<Option<ResolvedSubmission>, SourceError> {
        let history = self.host.list_recent_history(repo, 1, None).await?;
        let Some(latest) = history.into_iter().next() else {
            return Ok(None);
        };

        let entry = self.host.get_history_entry(repo, &latest.id).await?;
        let Some(file) = entry
            .changed_files
            .into_iter()
            .find(|file| is_recognized_source(&file.path))
        else {
            return Ok(None);
        };

        self.fetch(file).await.map(Some)
    }

    async fn from_root_listing(
        &self,
        repo: &RepositoryRef,
    ) -> Result<Option<ResolvedSubmission>, SourceError> {
        let candidates: Vec<FileRef> = self
            .host
            .list_directory(repo, "")
            .await?
            .into_iter()
            .filter(|file| is_recognized_source(&file.path))
            .collect();

        let chosen = if self.prefer_newest && candidates.len() > 1 {
            self.newest_of(repo, candidates).await
        } else {
            candidates.into_iter().next()
        };

        match chosen {
            Some(file) => self.fetch(file).await.map(Some),
            None => Ok(None),
        }
    }

    /// Rank candidates by their latest history timestamp; ties and failed
    /// lookups keep listing order
    async fn newest_of(&self, repo: &RepositoryRef, candidates: Vec<FileRef>) -> Option<FileRef> {
        let mut best: Option<(Option<DateTime<Utc>>, FileRef)> = None;

        for file in candidates {
            let touched = match self.host.list_recent_history(repo, 1, Some(&file.path)).await {
                Ok(history) => history.into_iter().next().and_then(|h| h.timestamp),
                Err(e) => {
                    debug!("{}: history lookup for {} failed: {}", repo, file.path, e);
                    None
                }
            };

            let newer = match &best {
                None => true,
                Some((current, _)) => touched > *current,
            };
            if newer {
                best = Some((touched, file));
            }
        }

        best.map(|(_, file)| file)
    }

    async fn fetch(&self, file: FileRef) -> Result<ResolvedSubmission, SourceError> {
        let source_text = self.host.fetch_raw(&file.raw_url).await?;
        Ok(ResolvedSubmission {
            source_text,
            source_url: file.view_url,
            filename: file.path,
        })
    }
}
