//! Health Check API Handler
//!
//! Liveness probe for the grading server. It does not touch the code host or
//! the oracle, so it stays green while either is unreachable.

use axum::{http::StatusCode, response::IntoResponse};

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
