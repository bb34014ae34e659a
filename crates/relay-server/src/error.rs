//! Application error types and Axum response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use relay_core::{ProbeState, RelayError};
use serde::Serialize;
use tracing::error;

use crate::dto::{ApiFailure, HealthFailure};

/// Handler errors, mapped to an HTTP status only here.
#[derive(Debug)]
pub enum AppError {
    /// Generation failed; answered with 500.
    Inference(RelayError),
    /// The readiness check itself could not run; answered with 503.
    ProbeFailed(RelayError),
}

#[derive(Serialize)]
struct ErrorResponse<T: Serialize> {
    detail: T,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Inference(e) => {
                error!("Error getting LLM response: {}", e);
                let detail = format!("Error getting LLM response: {}", e.summary());
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { detail })).into_response()
            }
            AppError::ProbeFailed(e) => {
                error!("Health check failed: {}", e);
                let detail = HealthFailure {
                    status: ProbeState::Unhealthy,
                    error: e.summary(),
                    api: ApiFailure {
                        status: "running",
                        error: "Failed to connect to Ollama service",
                    },
                };
                (StatusCode::SERVICE_UNAVAILABLE, Json(ErrorResponse { detail })).into_response()
            }
        }
    }
}
