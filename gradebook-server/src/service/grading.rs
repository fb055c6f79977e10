//! Grading Oracle Client
//!
//! Builds the evaluation prompt, sends it to the oracle and digs the
//! `{marks, feedback}` object out of whatever text comes back.
//!
//! Grading never fails: service problems and unparseable replies become
//! zero-mark sentinel results so one bad entry cannot sink a batch.

use std::sync::Arc;

use gradebook_client::CompletionOracle;
use gradebook_core::domain::grade::{GradeResult, MAX_MARKS};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Grades candidate solutions against a reference using a completion oracle
pub struct GradingService {
    oracle: Arc<dyn CompletionOracle>,
}

impl GradingService {
    pub fn new(oracle: Arc<dyn CompletionOracle>) -> Self {
        Self { oracle }
    }

    /// Score `candidate` against `reference` for `problem`
    pub async fn grade(&self, reference: &str, candidate: Option<&str>, problem: &str) -> GradeResult {
        let prompt = build_grading_prompt(reference, candidate, problem);

        match self.oracle.complete(&prompt).await {
            Ok(reply) => extract_grade(&reply).unwrap_or_else(|| {
                warn!("Oracle reply had no usable grade object ({} bytes)", reply.len());
                GradeResult::parse_failure()
            }),
            Err(e) => {
                warn!("Oracle grading call failed: {}", e);
                GradeResult::service_error()
            }
        }
    }
}

/// Compose the single evaluation prompt sent per candidate
pub fn build_grading_prompt(reference: &str, candidate: Option<&str>, problem: &str) -> String {
    let candidate = candidate
        .filter(|c| !c.trim().is_empty())
        .unwrap_or("(no submission)");

    format!(
        r#"Act as a strict, repeatable code grader.

Problem statement:
{problem}

Reference solution (known correct):
{reference}

Candidate solution:
{candidate}

Rubric:
- The score is an integer between 0 and 100.
- Identical inputs must always receive the identical score.
- Begin at 100 and subtract for every defect found.
- Missing or wrong core logic: subtract 10 to 30 per defect.
- Unhandled edge case: subtract 5 to 10 per case.
- Wrong or missing output handling: subtract 5 to 15.
- Correct and complete logic scores 100; partial logic scores proportionally.
- Unrelated, empty or missing code scores 0.
- Naming, formatting, comments and style do not affect the score.

Reply with a single JSON object and nothing else:
{{"marks": <integer>, "feedback": "<one short sentence>"}}"#
    )
}

/// Wire shape of the embedded grade object
#[derive(Debug, Deserialize)]
struct EmbeddedGrade {
    marks: Value,
    #[serde(default)]
    feedback: String,
}

/// Find the first brace-balanced span in `reply` that decodes to a grade
///
/// The oracle may wrap the object in prose or code fences, so every
/// balanced span is tried left to right.
pub fn extract_grade(reply: &str) -> Option<GradeResult> {
    balanced_spans(reply).into_iter().find_map(|span| {
        let grade: EmbeddedGrade = serde_json::from_str(span).ok()?;
        let marks = coerce_marks(&grade.marks)?;
        Some(GradeResult::new(marks, grade.feedback.trim()))
    })
}

/// Accept integer, fractional or numeric-string marks, clamped to 0..=100
fn coerce_marks(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    Some(raw.round().clamp(0.0, f64::from(MAX_MARKS)) as u8)
}

/// Every top-level `{...}` span whose braces balance, in order of appearance
///
/// Braces inside JSON string literals are ignored. An opening brace that
/// never closes is skipped and the scan resumes right after it.
pub fn balanced_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut from = 0;

    while let Some(offset) = text[from..].find('{') {
        let start = from + offset;
        match closing_brace(text.as_bytes(), start) {
            Some(end) => {
                spans.push(&text[start..=end]);
                from = end + 1;
            }
            None => from = start + 1,
        }
    }

    spans
}

fn closing_brace(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}
