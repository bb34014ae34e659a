//! Chat relay endpoint.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::{ChatRequest, ChatResponse};
use crate::error::AppError;
use crate::services;
use crate::ServerState;

/// Sends the message to the model and returns its reply.
pub async fn chat(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let response = services::chat::reply(&state, &req.message)
        .await
        .map_err(AppError::Inference)?;
    Ok(Json(ChatResponse { response }))
}
