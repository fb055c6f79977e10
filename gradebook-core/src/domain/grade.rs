//! Grade domain types

use serde::{Deserialize, Serialize};

/// Feedback strings used for terminal, non-oracle outcomes
pub mod feedback {
    pub const NO_CODE_FOUND: &str = "no code found";
    pub const PARSE_FAILURE: &str = "failed to parse response";
    pub const SERVICE_ERROR: &str = "service error";
    pub const UNPARSEABLE_ADDRESS: &str = "unparseable address";
    pub const REPOSITORY_NOT_FOUND: &str = "repository not found";
    pub const RATE_LIMITED: &str = "rate limited";
    pub const FETCH_FAILED: &str = "fetch failed";
    pub const INTERNAL_ERROR: &str = "internal error";
}

/// Highest score a submission can receive
pub const MAX_MARKS: u8 = 100;

/// Score and short feedback for one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeResult {
    pub marks: u8,
    pub feedback: String,
}

impl GradeResult {
    /// Build a result, clamping marks to 0..=100
    pub fn new(marks: u8, feedback: impl Into<String>) -> Self {
        Self {
            marks: marks.min(MAX_MARKS),
            feedback: feedback.into(),
        }
    }

    /// Zero-mark result with a fixed feedback string
    pub fn zero(feedback: &str) -> Self {
        Self::new(0, feedback)
    }

    pub fn no_code_found() -> Self {
        Self::zero(feedback::NO_CODE_FOUND)
    }

    pub fn parse_failure() -> Self {
        Self::zero(feedback::PARSE_FAILURE)
    }

    pub fn service_error() -> Self {
        Self::zero(feedback::SERVICE_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marks_are_clamped() {
        assert_eq!(GradeResult::new(250, "too generous").marks, 100);
        assert_eq!(GradeResult::new(42, "ok").marks, 42);
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(GradeResult::no_code_found(), GradeResult::new(0, "no code found"));
        assert_eq!(GradeResult::parse_failure().feedback, "failed to parse response");
        assert_eq!(GradeResult::service_error().feedback, "service error");
    }
}
