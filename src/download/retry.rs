//! Exponential backoff for download attempts.
//!
//! An attempt that fails is retried after `delay`, the delay is multiplied,
//! and the loop ends when the retry budget is spent or the next wait would
//! exceed the delay ceiling. There is no jitter and no wall-clock deadline.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::config::RetryConfig;
use crate::error::Result;

/// Backoff configuration. Holds no state beyond its settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    /// Total attempts, including the first.
    pub max_retries: u32,
    pub initial_delay: Duration,
    /// No wait longer than this is ever started.
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(32),
            multiplier: 2.0,
        }
    }
}

impl From<&RetryConfig> for BackoffPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            multiplier: config.multiplier,
        }
    }
}

impl BackoffPolicy {
    /// Run `attempt` with this policy's retry budget and initial delay.
    pub async fn run<T, F, Fut>(&self, attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        run_with_backoff(self, self.max_retries, self.initial_delay, attempt).await
    }

    /// Delay to use after waiting `delay`.
    pub fn next_delay(&self, delay: Duration) -> Duration {
        Duration::try_from_secs_f64(delay.as_secs_f64() * self.multiplier).unwrap_or(Duration::MAX)
    }
}

/// Run `attempt` up to `retries` times, sleeping `delay` before the first
/// retry and growing it by the policy multiplier afterwards.
///
/// The error of the last attempt is returned unchanged once retries are
/// exhausted or `delay` exceeds `policy.max_delay`.
pub async fn run_with_backoff<T, F, Fut>(
    policy: &BackoffPolicy,
    mut retries: u32,
    mut delay: Duration,
    mut attempt: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt_no = 1u32;

    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if retries > 1 && delay <= policy.max_delay => {
                tracing::warn!(
                    "Attempt {} failed: {}. Retrying in {:.1}s ({} left)",
                    attempt_no,
                    e,
                    delay.as_secs_f64(),
                    retries - 1
                );
                sleep(delay).await;
                retries -= 1;
                delay = policy.next_delay(delay);
                attempt_no += 1;
            }
            Err(e) => {
                tracing::debug!("Giving up after {} attempt(s)", attempt_no);
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_three_attempts_with_doubling_delays() {
        let policy = BackoffPolicy::default();
        let mut stamps = Vec::new();

        let result: Result<()> = run_with_backoff(&policy, 3, Duration::from_millis(1000), || {
            stamps.push(Instant::now());
            let n = stamps.len();
            async move { Err(Error::Download(format!("attempt {}", n))) }
        })
        .await;

        assert_eq!(stamps.len(), 3);
        assert_eq!(stamps[1] - stamps[0], Duration::from_millis(1000));
        assert_eq!(stamps[2] - stamps[1], Duration::from_millis(2000));
        match result {
            Err(Error::Download(message)) => assert_eq!(message, "attempt 3"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_at_delay_ceiling() {
        let policy = BackoffPolicy {
            max_retries: 10,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(4),
            multiplier: 2.0,
        };
        let mut calls = 0u32;

        let start = Instant::now();
        let result: Result<()> = policy
            .run(|| {
                calls += 1;
                async { Err(Error::Download("unavailable".into())) }
            })
            .await;

        // Waits of 1s, 2s and 4s; the next one (8s) is over the ceiling
        assert!(result.is_err());
        assert_eq!(calls, 4);
        assert_eq!(start.elapsed(), Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_failure() {
        let policy = BackoffPolicy::default();
        let mut calls = 0u32;

        let value = policy
            .run(|| {
                calls += 1;
                let n = calls;
                async move {
                    if n < 2 {
                        Err(Error::Download("flaky".into()))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 2);
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_single_attempt_does_not_wait() {
        let policy = BackoffPolicy::default();
        let mut calls = 0u32;

        let result: Result<()> = run_with_backoff(&policy, 1, Duration::from_secs(60), || {
            calls += 1;
            async { Err(Error::Download("nope".into())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_policy_from_config() {
        let policy = BackoffPolicy::from(&RetryConfig::default());
        assert_eq!(policy, BackoffPolicy::default());
        assert_eq!(
            policy.next_delay(Duration::from_secs(16)),
            Duration::from_secs(32)
        );
    }
}
