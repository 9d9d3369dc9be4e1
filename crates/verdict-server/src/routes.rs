//! HTTP routes and handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{error, warn};

use crate::service::{ChurnRequest, FeedbackRequest, SpamRequest};
use crate::state::AppState;
use verdict_core::Error;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/stats", get(stats))
        .route("/predict", post(predict))
        .route("/predict-churn", post(predict_churn))
        .route("/feedback", post(feedback))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state)
}

// ============================================================================
// Status endpoints
// ============================================================================

async fn root(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "active",
        "available_models": state.service.available_models(),
    }))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.service.snapshot())
}

async fn metrics(State(state): State<AppState>) -> String {
    state
        .metrics_handle
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

// ============================================================================
// Prediction endpoints
// ============================================================================

async fn predict(
    State(state): State<AppState>,
    Json(req): Json<SpamRequest>,
) -> Result<Response, AppError> {
    let response = state.service.predict_spam(&req)?;
    Ok(Json(response).into_response())
}

async fn predict_churn(
    State(state): State<AppState>,
    Json(req): Json<ChurnRequest>,
) -> Result<Response, AppError> {
    let response = state.service.predict_churn(&req)?;
    Ok(Json(response).into_response())
}

async fn feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Response, AppError> {
    state
        .service
        .record_feedback(&req)
        .map_err(|e| AppError::Internal(format!("Failed to save feedback: {}", e)))?;

    Ok(Json(json!({
        "status": "success",
        "message": "Feedback recorded",
    }))
    .into_response())
}

// ============================================================================
// Errors
// ============================================================================

/// Handler error rendered as `{"detail": ...}`
#[derive(Debug)]
pub enum AppError {
    ServiceUnavailable(String),
    Internal(String),
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match err {
            Error::ModelUnavailable(_) => AppError::ServiceUnavailable(err.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, detail) = match self {
            AppError::ServiceUnavailable(msg) => {
                warn!("{}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "model_unavailable", msg)
            }
            AppError::Internal(msg) => {
                error!("{}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg)
            }
        };

        metrics::counter!("verdict_errors_total", "type" => kind).increment(1);

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
