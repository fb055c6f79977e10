//! Grading DTOs

use serde::{Deserialize, Serialize};

use crate::domain::roster::RosterEntry;

/// Request to grade a whole roster against one reference solution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRosterRequest {
    #[serde(rename = "teacherCode", default)]
    pub reference_solution: String,
    #[serde(rename = "students")]
    pub roster: Vec<RosterEntry>,
    #[serde(rename = "question", default)]
    pub problem_statement: String,
}

/// The response body is the batch result itself
pub use crate::domain::roster::BatchResult as GradeRosterResponse;
