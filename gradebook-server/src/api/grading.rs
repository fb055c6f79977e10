//! Grading API Handlers
//!
//! HTTP endpoint for batch roster grading.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use gradebook_core::dto::grade::{GradeRosterRequest, GradeRosterResponse};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::batch_service;

/// POST /api/grade-students
/// Grade every roster entry against the reference solution
pub async fn grade_students(
    State(state): State<AppState>,
    payload: Result<Json<GradeRosterRequest>, JsonRejection>,
) -> ApiResult<Json<GradeRosterResponse>> {
    let Json(req) = payload?;
    tracing::info!("Grading {} roster entries", req.roster.len());

    let result = state
        .orchestrator
        .grade_roster(&req.reference_solution, req.roster, &req.problem_statement)
        .await
        .map_err(|e| match e {
            batch_service::BatchError::InvalidRequest(msg) => ApiError::BadRequest(msg),
        })?;

    Ok(Json(result))
}
