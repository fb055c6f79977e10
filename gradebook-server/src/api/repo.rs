//! Repository API Handlers
//!
//! HTTP endpoint for checking that a repository is visible on the code host.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use gradebook_client::SourceError;
use gradebook_core::domain::repository::RepositoryRef;
use gradebook_core::dto::repo::{CheckRepo, RepoStatus};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};

/// POST /api/check-repo
/// Report whether `owner/repo` exists
pub async fn check_repo(
    State(state): State<AppState>,
    payload: Result<Json<CheckRepo>, JsonRejection>,
) -> ApiResult<Json<RepoStatus>> {
    let Json(req) = payload?;

    if req.owner.trim().is_empty() || req.repo.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Owner and repo are required".to_string(),
        ));
    }

    let repo = RepositoryRef::new(req.owner.trim(), req.repo.trim());
    tracing::debug!("Checking repository: {}", repo);

    match state.host.get_repository(&repo).await {
        Ok(()) => Ok(Json(RepoStatus { exists: true })),
        Err(SourceError::NotFound(_)) => Ok(Json(RepoStatus { exists: false })),
        Err(e) => {
            tracing::warn!("Repository check for {} failed: {}", repo, e);
            Err(ApiError::InternalError(
                "Failed to check repository".to_string(),
            ))
        }
    }
}
