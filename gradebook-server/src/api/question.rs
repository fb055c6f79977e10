//! Question API Handlers
//!
//! HTTP endpoint for synthesizing a problem statement from reference code.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use gradebook_core::dto::question::{GenerateQuestion, GeneratedQuestion};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::question_service;

/// POST /api/generate-question
/// Derive a problem statement from the submitted source
pub async fn generate_question(
    State(state): State<AppState>,
    payload: Result<Json<GenerateQuestion>, JsonRejection>,
) -> ApiResult<Json<GeneratedQuestion>> {
    let Json(req) = payload?;
    tracing::info!("Generating question from {} bytes of code", req.code.len());

    let question = state
        .questions
        .synthesize(&req.code)
        .await
        .map_err(|e| match e {
            question_service::QuestionError::EmptySource => {
                ApiError::BadRequest("Code is required.".to_string())
            }
            question_service::QuestionError::Oracle(err) => {
                tracing::error!("Question synthesis failed: {}", err);
                ApiError::InternalError("Failed to generate question.".to_string())
            }
        })?;

    Ok(Json(GeneratedQuestion { question }))
}
