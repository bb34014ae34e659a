//! Health endpoint reporting API and Ollama readiness.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::HealthReport;
use crate::error::AppError;
use crate::services;
use crate::ServerState;

/// Runs one readiness check and reports overall health.
pub async fn health(State(state): State<Arc<ServerState>>) -> Result<Json<HealthReport>, AppError> {
    let report = services::health::report(state.probe.as_ref())
        .await
        .map_err(AppError::ProbeFailed)?;
    Ok(Json(report))
}
