//! Core domain types and error definitions for ollama-relay.
//!
//! - [`RelayError`] — Failure kinds when talking to the model runtime
//! - [`HealthStatus`] and [`ProbeState`] — Result of a single readiness check
//!
//! # Example
//!
//! ```rust
//! use relay_core::{HealthStatus, ProbeState};
//!
//! let status = HealthStatus::healthy(3, true, "llama3");
//! assert_eq!(status.status, ProbeState::Healthy);
//! assert!(status.is_ready());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while relaying a request to the model runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// The model runtime could not be reached (refused, reset, timed out).
    #[error("Ollama unreachable: {0}")]
    Transport(String),

    /// The model runtime answered with a non-success HTTP status.
    #[error("Ollama returned status {code}: {message}")]
    Status { code: u16, message: String },

    /// The requested model is not loaded on the runtime.
    #[error("Model not loaded: {0}")]
    ModelNotLoaded(String),

    /// Anything else: malformed responses, in-stream errors, bad request setup.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl RelayError {
    /// A caller-safe description of the failure, without the underlying error text.
    pub fn summary(&self) -> String {
        match self {
            RelayError::Transport(_) => "model runtime unreachable".to_string(),
            RelayError::Status { code, .. } => format!("model runtime returned status {code}"),
            RelayError::ModelNotLoaded(model) => format!("model `{model}` is not loaded"),
            RelayError::Unexpected(_) => "unexpected model runtime failure".to_string(),
        }
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::Unexpected(err.to_string())
    }
}

/// Reachability of the model runtime as seen by one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeState {
    Healthy,
    Unhealthy,
}

/// Outcome of a single readiness check against the model runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: ProbeState,
    /// Number of models the runtime listed; absent when the listing could not be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<usize>,
    pub model_ready: bool,
    pub target_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthStatus {
    /// The runtime answered with its model listing.
    pub fn healthy(models: usize, model_ready: bool, target_model: impl Into<String>) -> Self {
        Self {
            status: ProbeState::Healthy,
            models: Some(models),
            model_ready,
            target_model: target_model.into(),
            error: None,
        }
    }

    /// The runtime could not be queried; `error` says why.
    pub fn unhealthy(target_model: impl Into<String>, error: impl ToString) -> Self {
        Self {
            status: ProbeState::Unhealthy,
            models: None,
            model_ready: false,
            target_model: target_model.into(),
            error: Some(error.to_string()),
        }
    }

    /// True when the runtime is reachable and the target model is loaded.
    pub fn is_ready(&self) -> bool {
        self.status == ProbeState::Healthy && self.model_ready
    }
}
