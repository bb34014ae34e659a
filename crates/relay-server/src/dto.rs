//! Data transfer objects for HTTP message serialization.

use relay_core::{HealthStatus, ProbeState};
use serde::{Deserialize, Serialize};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

// === Chat Types ===

/// Request body for the chat endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Reply from the chat endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

// === Health Types ===

/// State of this API process.
#[derive(Debug, Clone, Serialize)]
pub struct ApiInfo {
    pub status: &'static str,
    pub version: &'static str,
}

impl ApiInfo {
    pub fn running() -> Self {
        Self {
            status: "running",
            version: API_VERSION,
        }
    }
}

/// Response from the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: ProbeState,
    pub api: ApiInfo,
    pub ollama: HealthStatus,
}

/// API section of a failed health check.
#[derive(Debug, Serialize)]
pub struct ApiFailure {
    pub status: &'static str,
    pub error: &'static str,
}

/// Body of a 503 health response.
#[derive(Debug, Serialize)]
pub struct HealthFailure {
    pub status: ProbeState,
    pub error: String,
    pub api: ApiFailure,
}
