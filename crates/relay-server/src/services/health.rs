//! Overall health derived from a single readiness check.

use relay_core::{ProbeState, RelayError};
use relay_llm::ReadinessProbe;

use crate::dto::{ApiInfo, HealthReport};

/// Checks the model runtime once and folds the result into a [`HealthReport`].
///
/// Overall status is healthy only when the runtime answered and lists the target model.
pub async fn report(probe: &dyn ReadinessProbe) -> Result<HealthReport, RelayError> {
    let ollama = probe.check().await?;
    let status = if ollama.is_ready() {
        ProbeState::Healthy
    } else {
        ProbeState::Unhealthy
    };

    Ok(HealthReport {
        status,
        api: ApiInfo::running(),
        ollama,
    })
}
