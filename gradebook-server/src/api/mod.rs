//! API Module
//!
//! HTTP API layer for the grading server.
//! Each submodule handles endpoints for a specific concern.

pub mod error;
pub mod grading;
pub mod health;
pub mod question;
pub mod repo;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use gradebook_client::{ChatCompletionClient, CompletionOracle, GithubClient, SourceHost};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::service::batch::BatchOrchestrator;
use crate::service::grading::GradingService;
use crate::service::question::QuestionService;
use crate::service::resolver::CodeResolver;

/// Shared handler state; every member is stateless between requests
#[derive(Clone)]
pub struct AppState {
    pub host: Arc<dyn SourceHost>,
    pub orchestrator: Arc<BatchOrchestrator>,
    pub questions: Arc<QuestionService>,
}

impl AppState {
    /// Wire the pipeline over the given collaborators
    pub fn new(
        host: Arc<dyn SourceHost>,
        oracle: Arc<dyn CompletionOracle>,
        max_concurrent_entries: usize,
        prefer_newest_file: bool,
    ) -> Self {
        let resolver = CodeResolver::new(Arc::clone(&host)).prefer_newest(prefer_newest_file);
        let grader = GradingService::new(Arc::clone(&oracle));

        Self {
            orchestrator: Arc::new(BatchOrchestrator::with_concurrency(
                Arc::new(resolver),
                Arc::new(grader),
                max_concurrent_entries,
            )),
            questions: Arc::new(QuestionService::new(oracle)),
            host,
        }
    }

    /// Build the real HTTP clients from configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = config.http_client()?;

        let host = GithubClient::with_client(
            config.github_api_url.clone(),
            config.github_token.clone(),
            http.clone(),
        );
        let oracle = ChatCompletionClient::with_client(
            config.oracle_url.clone(),
            config.oracle_api_key.clone(),
            config.oracle_model.clone(),
            http,
        );

        Ok(Self::new(
            Arc::new(host),
            Arc::new(oracle),
            config.max_concurrent_entries,
            config.prefer_newest_file,
        ))
    }
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Grading endpoints
        .route("/api/grade-students", post(grading::grade_students))
        .route("/api/generate-question", post(question::generate_question))
        // Repository endpoints
        .route("/api/check-repo", post(repo::check_repo))
        // Add state and middleware
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
