//! Trait seams between the HTTP layer and the model runtime.

use async_trait::async_trait;
use relay_core::{HealthStatus, RelayError};

/// Something that turns a prompt into generated text.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generates a completion for `prompt`, trimmed of surrounding whitespace.
    async fn generate(&self, prompt: &str) -> Result<String, RelayError>;
}

/// Something that can report whether the model runtime is ready to serve.
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Runs one check.
    ///
    /// Runtime-side failures are reported inside the returned [`HealthStatus`];
    /// `Err` is reserved for failures that never reached the runtime.
    async fn check(&self) -> Result<HealthStatus, RelayError>;
}
