//! Roster domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::grade::GradeResult;

/// Wire key carrying the repository address
pub const ADDRESS_KEY: &str = "repoUrl";

/// Keys the grader writes onto every graded entry
pub const GRADING_KEYS: [&str; 4] = ["marks", "feedback", "gradedFileUrl", "gradedAt"];

/// One participant record as submitted by the caller
///
/// Identity fields are opaque to the grader and carried through unchanged.
/// A `repoUrl` that is missing or not a string leaves `repository_address`
/// empty; a non-string value stays in `identity` as it was sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Map<String, Value>")]
pub struct RosterEntry {
    pub repository_address: String,
    pub identity: Map<String, Value>,
}

impl RosterEntry {
    pub fn new(repository_address: impl Into<String>) -> Self {
        Self {
            repository_address: repository_address.into(),
            identity: Map::new(),
        }
    }

    /// Adds an identity field
    pub fn with_identity(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.identity.insert(key.into(), value.into());
        self
    }

    /// The `name` identity field, when it is a string
    pub fn display_name(&self) -> Option<&str> {
        self.identity.get("name").and_then(Value::as_str)
    }
}

impl From<Value> for RosterEntry {
    fn from(value: Value) -> Self {
        let Value::Object(mut identity) = value else {
            return Self::new("");
        };

        let repository_address = match identity.remove(ADDRESS_KEY) {
            Some(Value::String(address)) => address,
            Some(other) => {
                identity.insert(ADDRESS_KEY.to_string(), other);
                String::new()
            }
            None => String::new(),
        };

        Self {
            repository_address,
            identity,
        }
    }
}

impl From<RosterEntry> for Map<String, Value> {
    fn from(entry: RosterEntry) -> Self {
        let mut map = entry.identity;
        if !entry.repository_address.is_empty() {
            map.insert(
                ADDRESS_KEY.to_string(),
                Value::String(entry.repository_address),
            );
        }
        map
    }
}

/// A roster entry with its grading fields appended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedEntry {
    #[serde(flatten)]
    pub entry: RosterEntry,
    pub marks: u8,
    pub feedback: String,
    pub graded_file_url: Option<String>,
    pub graded_at: DateTime<Utc>,
}

impl GradedEntry {
    pub fn new(
        entry: RosterEntry,
        grade: GradeResult,
        graded_file_url: Option<String>,
        graded_at: DateTime<Utc>,
    ) -> Self {
        let mut entry = entry;
        // Grading fields from an earlier run are replaced, not repeated
        for key in GRADING_KEYS {
            entry.identity.remove(key);
        }

        Self {
            entry,
            marks: grade.marks,
            feedback: grade.feedback,
            graded_file_url,
            graded_at,
        }
    }
}

/// Graded roster, positionally aligned with the input roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    #[serde(rename = "students")]
    pub entries: Vec<GradedEntry>,
}
