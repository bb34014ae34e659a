//! Flat poll-until-ready loop over a [`ReadinessProbe`].

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::backend::ReadinessProbe;

/// Polls `probe` every `interval` until it reports the model ready or `timeout` elapses.
///
/// Check failures are swallowed and retried on the next tick. Returns `true` only
/// if a check reported ready before the deadline.
pub async fn wait_until_ready<P>(probe: &P, interval: Duration, timeout: Duration) -> bool
where
    P: ReadinessProbe + ?Sized,
{
    let start = Instant::now();
    let mut attempt = 0u32;

    while start.elapsed() < timeout {
        attempt += 1;
        match probe.check().await {
            Ok(status) if status.is_ready() => {
                info!(attempt, "Ollama ready with model {}", status.target_model);
                return true;
            }
            Ok(status) => debug!(
                attempt,
                status = ?status.status,
                model_ready = status.model_ready,
                error = status.error.as_deref().unwrap_or(""),
                "Ollama not ready yet"
            ),
            Err(e) => debug!(attempt, "Readiness check failed: {}", e),
        }
        sleep(interval).await;
    }

    warn!(attempt, "Ollama not ready after {}s", timeout.as_secs());
    false
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use relay_core::{HealthStatus, RelayError};

    use super::*;

    const INTERVAL: Duration = Duration::from_secs(10);
    const TIMEOUT: Duration = Duration::from_secs(300);

    /// Turns ready on the check after `not_ready_ticks` failed ones.
    struct FlipProbe {
        not_ready_ticks: u32,
        calls: AtomicU32,
        fail_hard: bool,
    }

    impl FlipProbe {
        fn new(not_ready_ticks: u32) -> Self {
            Self { not_ready_ticks, calls: AtomicU32::new(0), fail_hard: false }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReadinessProbe for FlipProbe {
        async fn check(&self) -> Result<HealthStatus, RelayError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call >= self.not_ready_ticks {
                return Ok(HealthStatus::healthy(1, true, "llama3"));
            }
            if self.fail_hard {
                return Err(RelayError::Unexpected("probe exploded".into()));
            }
            Ok(HealthStatus::healthy(1, false, "llama3"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ready_on_first_check() {
        let probe = FlipProbe::new(0);
        assert!(wait_until_ready(&probe, INTERVAL, TIMEOUT).await);
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ready_just_inside_timeout() {
        // Ready on the 30th check, at t = 290s.
        let probe = FlipProbe::new(29);
        assert!(wait_until_ready(&probe, INTERVAL, TIMEOUT).await);
        assert_eq!(probe.calls(), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_just_before_ready() {
        // Would be ready on the 32nd check, at t = 310s.
        let probe = FlipProbe::new(31);
        let started = Instant::now();

        assert!(!wait_until_ready(&probe, INTERVAL, TIMEOUT).await);
        assert_eq!(probe.calls(), 30);
        assert!(started.elapsed() >= TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn check_errors_are_swallowed() {
        let probe = FlipProbe { fail_hard: true, ..FlipProbe::new(3) };
        assert!(wait_until_ready(&probe, INTERVAL, TIMEOUT).await);
        assert_eq!(probe.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_timeout_never_checks() {
        let probe = FlipProbe::new(0);
        assert!(!wait_until_ready(&probe, INTERVAL, Duration::ZERO).await);
        assert_eq!(probe.calls(), 0);
    }
}
