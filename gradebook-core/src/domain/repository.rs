//! Code host domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Owner/name pair identifying one hosted repository
///
/// Always derived from a repository address, never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// One file inside a history entry or a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Path relative to the repository root
    pub path: String,
    /// Locator of the raw file content
    pub raw_url: String,
    /// Human-viewable locator (falls back to the raw locator)
    pub view_url: String,
}

impl FileRef {
    /// Final path segment
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Summary row of a repository's history listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySummary {
    /// Opaque content hash
    pub id: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// One recorded change set, with the files it touched in host order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub changed_files: Vec<FileRef>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// The "current submission" chosen for one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSubmission {
    pub source_text: String,
    pub source_url: String,
    pub filename: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_ref_display() {
        let repo = RepositoryRef::new("octocat", "hello-world");
        assert_eq!(repo.to_string(), "octocat/hello-world");
    }

    #[test]
    fn test_file_name_strips_directories() {
        let file = FileRef {
            path: "src/bin/main.rs".to_string(),
            raw_url: "https://raw/main.rs".to_string(),
            view_url: "https://view/main.rs".to_string(),
        };
        assert_eq!(file.file_name(), "main.rs");

        let root = FileRef {
            path: "solution.py".to_string(),
            ..file
        };
        assert_eq!(root.file_name(), "solution.py");
    }
}
