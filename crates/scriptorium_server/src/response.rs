//! Error payloads and status mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use derive_getters::Getters;
use scriptorium_error::{PipelineErrorKind, ScriptoriumError, ScriptoriumErrorKind};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Body of every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ErrorResponse {
    /// Always `"ERROR"`
    status: String,
    /// Human-readable failure
    error: String,
}

impl ErrorResponse {
    /// Error payload for a message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            status: "ERROR".to_string(),
            error: error.into(),
        }
    }
}

/// HTTP status for a pipeline error.
///
/// Failed generation tasks count as backend failures (502).
pub fn status_for(err: &ScriptoriumError) -> StatusCode {
    match err.kind() {
        ScriptoriumErrorKind::Validation(_) | ScriptoriumErrorKind::Json(_) => {
            StatusCode::BAD_REQUEST
        }
        ScriptoriumErrorKind::Backend(_) => StatusCode::BAD_GATEWAY,
        ScriptoriumErrorKind::Pipeline(e)
            if matches!(e.kind, PipelineErrorKind::TaskFailed { .. }) =>
        {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// A [`ScriptoriumError`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(ScriptoriumError);

impl ApiError {
    /// The wrapped error.
    pub fn inner(&self) -> &ScriptoriumError {
        &self.0
    }
}

impl From<ScriptoriumError> for ApiError {
    fn from(err: ScriptoriumError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.0, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self.0, "Request rejected");
        }
        (status, Json(ErrorResponse::new(self.0.to_string()))).into_response()
    }
}
