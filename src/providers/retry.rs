use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, timeout};
use tracing::warn;

use super::VisionProvider;
use crate::analysis::VisionReport;
use crate::error::AnalyzeError;
use crate::image_data::ImageUpload;

/// Sequential retry with doubling delays: `base`, `2 * base`, `4 * base`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay after the failed attempt number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Races every call against a timeout and retries transient failures.
pub struct Resilient {
    inner: Arc<dyn VisionProvider>,
    policy: RetryPolicy,
    timeout: Duration,
}

impl Resilient {
    pub fn new(inner: Arc<dyn VisionProvider>, policy: RetryPolicy, timeout: Duration) -> Self {
        Self {
            inner,
            policy,
            timeout,
        }
    }
}

#[async_trait]
impl VisionProvider for Resilient {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn analyze(&self, upload: &ImageUpload) -> Result<VisionReport, AnalyzeError> {
        let attempts = self.policy.attempts.max(1);
        let mut attempt = 0;

        loop {
            let result = match timeout(self.timeout, self.inner.analyze(upload)).await {
                Ok(result) => result,
                Err(_) => Err(AnalyzeError::Timeout(self.timeout)),
            };

            match result {
                Err(err) if err.is_transient() && attempt + 1 < attempts => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        provider = self.inner.name(),
                        attempt = attempt + 1,
                        attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient provider failure, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}
