//! Question Synthesizer
//!
//! Asks the oracle to describe what a reference solution does, as a problem
//! statement students could be given. The reply is returned verbatim.

use std::sync::Arc;

use gradebook_client::{CompletionOracle, OracleError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("source code is required")]
    EmptySource,

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

pub type Result<T> = std::result::Result<T, QuestionError>;

pub struct QuestionService {
    oracle: Arc<dyn CompletionOracle>,
}

impl QuestionService {
    pub fn new(oracle: Arc<dyn CompletionOracle>) -> Self {
        Self { oracle }
    }

    /// Derive a problem statement from `source`
    pub async fn synthesize(&self, source: &str) -> Result<String> {
        if source.trim().is_empty() {
            return Err(QuestionError::EmptySource);
        }

        let question = self.oracle.complete(&build_question_prompt(source)).await?;
        tracing::debug!("Synthesized question ({} bytes)", question.len());

        Ok(question)
    }
}

pub fn build_question_prompt(source: &str) -> String {
    format!(
        "Read the program below and write the programming exercise it answers.\n\
         Describe only its externally observable behaviour: inputs, outputs and constraints.\n\
         Do not name the algorithm it uses, and do not mention any of its identifiers.\n\
         Keep it short and reply with the exercise text only.\n\n\
         Program:\n{source}"
    )
}
