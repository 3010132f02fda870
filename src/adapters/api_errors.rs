use crate::domain::error::PipelineError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Newtype so the domain error can become an axum response.
#[derive(Debug)]
pub struct ApiError(pub PipelineError);

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self.0 {
            PipelineError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                msg.clone(),
            ),
            PipelineError::NotFound
            | PipelineError::Protocol(_)
            | PipelineError::Transport(_)
            | PipelineError::Provider { .. } => {
                tracing::error!("provider error: {}", self.0);
                (
                    StatusCode::BAD_GATEWAY,
                    "provider_error",
                    "payment provider request failed".to_string(),
                )
            }
            PipelineError::Notifier(_)
            | PipelineError::Serialization(_)
            | PipelineError::Config(_)
            | PipelineError::Task(_) => {
                tracing::error!("internal error: {}", self.0);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error_code": error_code,
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}
