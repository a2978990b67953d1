//! Generation guard - stage deadline and bounded retry around backend calls
//!
//! Every call to the generation backend goes through [`GenerationGuard::run`].
//! The configured timeout is a deadline for the whole stage: attempts,
//! retries and backoff all have to fit inside it. An optional per-attempt
//! cap gives up on a single slow attempt early so it can be retried. Failed
//! attempts are retried with exponential backoff plus random jitter until
//! the attempt budget or the deadline is spent. Shape mismatches are retried
//! as well since a fresh sample may conform.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::application::ports::outbound::GenerationError;
use crate::domain::value_objects::PipelineSettings;

#[derive(Debug, Clone)]
pub struct GenerationGuard {
    timeout: Duration,
    attempt_timeout: Option<Duration>,
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl GenerationGuard {
    pub fn new(timeout: Duration, max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            timeout,
            attempt_timeout: None,
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: max_delay.max(base_delay),
        }
    }

    /// Cap each attempt; the stage deadline still applies
    pub fn with_attempt_timeout(mut self, attempt_timeout: Option<Duration>) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    pub fn from_settings(settings: &PipelineSettings) -> Self {
        Self::new(
            settings.stage_timeout(),
            settings.max_attempts,
            settings.retry_base_delay(),
            settings.retry_max_delay(),
        )
        .with_attempt_timeout(settings.attempt_timeout())
    }

    /// Deadline for one whole stage
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `call` until it succeeds, the attempt budget is spent or the
    /// stage deadline passes
    ///
    /// `call` is invoked once per attempt and must build a fresh future each
    /// time. The last error is returned when every attempt fails; a passed
    /// deadline is reported as [`GenerationError::Timeout`].
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, GenerationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GenerationError>>,
    {
        let deadline = Instant::now() + self.timeout;
        let mut attempt = 1;
        loop {
            let now = Instant::now();
            let (attempt_deadline, attempt_cap) = match self.attempt_timeout {
                Some(cap) if now + cap < deadline => (now + cap, Some(cap)),
                _ => (deadline, None),
            };

            let result = match tokio::time::timeout_at(attempt_deadline, call()).await {
                Ok(result) => result,
                Err(_) => match attempt_cap {
                    Some(cap) => Err(GenerationError::Timeout(cap)),
                    None => {
                        warn!(operation, attempt, "Generation stage deadline passed");
                        return Err(GenerationError::Timeout(self.timeout));
                    }
                },
            };

            match result {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation, attempt, "Generation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if attempt < self.max_attempts => {
                    let delay = self.backoff(attempt);
                    if Instant::now() + delay >= deadline {
                        warn!(operation, attempt, error = %e, "No time left in stage, giving up");
                        return Err(e);
                    }
                    warn!(
                        operation,
                        attempt,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "Generation attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(operation, attempt, error = %e, "Generation failed, giving up");
                    return Err(e);
                }
            }
        }
    }

    /// Delay before the attempt following `attempt` (1-based)
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32 << (attempt.saturating_sub(1)).min(16);
        let delay = self.base_delay.saturating_mul(factor).min(self.max_delay);
        let jitter_cap = (delay.as_millis() / 2) as u64;
        let jitter = if jitter_cap == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_cap)
        };
        delay + Duration::from_millis(jitter)
    }
}
