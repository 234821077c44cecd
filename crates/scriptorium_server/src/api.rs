//! Routes and handlers.

use crate::ApiError;
use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use scriptorium_error::{HttpError, JsonError, ScriptoriumError, ScriptoriumResult};
use scriptorium_pipeline::{
    PipelineReport, StoryPipeline, StoryRequest, TranslationPipeline, TranslationRequest,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Pipelines shared by every request.
#[derive(Debug, Clone)]
pub struct AppState {
    translation: Arc<TranslationPipeline>,
    story: Arc<StoryPipeline>,
}

impl AppState {
    /// Creates new API state.
    pub fn new(translation: Arc<TranslationPipeline>, story: Arc<StoryPipeline>) -> Self {
        Self { translation, story }
    }
}

/// Creates the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/health", get(health_check))
        .route("/ai/batch-translate", post(batch_translate))
        .route("/ai/story-generate", post(story_generate))
        .with_state(state)
}

/// Serve the API on `bind` until Ctrl-C.
///
/// # Errors
///
/// Fails when the address cannot be bound or the server stops abnormally.
pub async fn serve(bind: &str, state: AppState) -> ScriptoriumResult<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| HttpError::new(format!("Failed to bind {}: {}", bind, e)))?;
    info!(address = %bind, "Scriptorium listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| HttpError::new(format!("Server stopped: {}", e)))?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn liveness() -> &'static str {
    "Scriptorium is running"
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

fn malformed(rejection: JsonRejection) -> ApiError {
    ApiError::from(ScriptoriumError::from(JsonError::new(rejection.body_text())))
}

#[instrument(skip_all)]
async fn batch_translate(
    State(state): State<AppState>,
    payload: Result<Json<TranslationRequest>, JsonRejection>,
) -> Result<Json<PipelineReport>, ApiError> {
    let Json(request) = payload.map_err(malformed)?;
    let report = state.translation.run(&request).await?;
    Ok(Json(report))
}

#[instrument(skip_all)]
async fn story_generate(
    State(state): State<AppState>,
    payload: Result<Json<StoryRequest>, JsonRejection>,
) -> Result<Json<PipelineReport>, ApiError> {
    let Json(request) = payload.map_err(malformed)?;
    let report = state.story.run(&request).await?;
    Ok(Json(report))
}
