//! Retry Director
//!
//! Wraps a [`ConnectionFactory`] with bounded, exponentially backed-off retry.
//! Only transient failures are retried; missing configuration fails on the
//! first attempt.

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::backoff::BackoffPolicy;
use crate::database::{BoxedClaimStore, ConnectionFactory};
use crate::error::ConnectError;

#[derive(Clone)]
pub struct RetryDirector {
    factory: Arc<dyn ConnectionFactory>,
    policy: BackoffPolicy,
    connect_timeout: Duration,
}

impl std::fmt::Debug for RetryDirector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryDirector")
            .field("policy", &self.policy)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl RetryDirector {
    pub fn new(
        factory: Arc<dyn ConnectionFactory>,
        policy: BackoffPolicy,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            factory,
            policy,
            connect_timeout,
        }
    }

    /// Acquire a session using the configured policy
    pub async fn acquire(&self) -> Result<BoxedClaimStore, ConnectError> {
        self.acquire_with_retry(self.policy.max_attempts, self.policy.base_delay)
            .await
    }

    /// Acquire a session, making up to `max_attempts` attempts.
    ///
    /// Sleeps `min(cap, base_delay * 2^i)` after failed attempt `i` and never
    /// after the last one. When every attempt fails the error is
    /// [`ConnectError::Exhausted`] carrying the final failure.
    pub async fn acquire_with_retry(
        &self,
        max_attempts: u32,
        base_delay: Duration,
    ) -> Result<BoxedClaimStore, ConnectError> {
        let policy = BackoffPolicy::new(max_attempts, base_delay, self.policy.max_delay);
        let mut last_error = None;

        for attempt in 0..policy.max_attempts {
            match self.factory.acquire(self.connect_timeout).await {
                Ok(session) => {
                    if attempt > 0 {
                        info!(
                            attempts = attempt + 1,
                            "Backend connection established after retrying"
                        );
                    }
                    return Ok(session);
                }
                Err(err) if !err.is_transient() => {
                    warn!(error = %err, "Backend connection failed permanently, not retrying");
                    return Err(err);
                }
                Err(err) => {
                    if attempt + 1 < policy.max_attempts {
                        let delay = policy.delay_for(attempt);
                        warn!(
                            attempt = attempt + 1,
                            max_attempts = policy.max_attempts,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "Backend connection attempt failed, backing off"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(err);
                }
            }
        }

        let last = last_error
            .unwrap_or_else(|| ConnectError::Backend("no connection attempt was made".to_string()));
        error!(
            attempts = policy.max_attempts,
            error = %last,
            "Backend connection attempts exhausted"
        );
        Err(ConnectError::Exhausted {
            attempts: policy.max_attempts,
            last: Box::new(last),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MemoryConnectionFactory;
    use tokio::time::Instant;

    fn director(factory: &Arc<MemoryConnectionFactory>) -> RetryDirector {
        RetryDirector::new(
            factory.clone(),
            BackoffPolicy::new(8, Duration::from_millis(500), Duration::from_secs(8)),
            Duration::from_secs(3),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_returns_without_sleeping() {
        let factory = Arc::new(MemoryConnectionFactory::new(Vec::new()));
        let started = Instant::now();

        let session = director(&factory).acquire().await.ok().unwrap();
        drop(session);

        assert_eq!(factory.attempts(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let factory = Arc::new(MemoryConnectionFactory::new(Vec::new()).failing_first(2));
        let started = Instant::now();

        let session = director(&factory)
            .acquire_with_retry(5, Duration::from_millis(100))
            .await;

        assert!(session.is_ok());
        assert_eq!(factory.attempts(), 3);
        // 100ms after the first failure, 200ms after the second
        assert_eq!(started.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_sleeps_only_between_attempts() {
        let factory = Arc::new(MemoryConnectionFactory::new(Vec::new()).refusing());
        let started = Instant::now();

        let err = director(&factory)
            .acquire_with_retry(3, Duration::from_millis(100))
            .await
            .err()
            .unwrap();

        assert_eq!(factory.attempts(), 3);
        assert_eq!(started.elapsed(), Duration::from_millis(300));
        match err {
            ConnectError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, ConnectError::Unreachable(_)));
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_delays_respect_cap() {
        let factory = Arc::new(MemoryConnectionFactory::new(Vec::new()).refusing());
        let director = RetryDirector::new(
            factory.clone(),
            BackoffPolicy::new(4, Duration::from_millis(100), Duration::from_millis(150)),
            Duration::from_secs(1),
        );
        let started = Instant::now();

        let _ = director.acquire().await;

        // 100 + 150 + 150
        assert_eq!(started.elapsed(), Duration::from_millis(400));
        assert_eq!(factory.attempts(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_configuration_is_not_retried() {
        let factory = Arc::new(MemoryConnectionFactory::unconfigured(["database.host"]));
        let started = Instant::now();

        let err = director(&factory).acquire().await.err().unwrap();

        assert_eq!(factory.attempts(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(err, ConnectError::missing_settings(["database.host"]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_fails_without_delay() {
        let factory = Arc::new(MemoryConnectionFactory::new(Vec::new()).refusing());
        let started = Instant::now();

        let err = director(&factory)
            .acquire_with_retry(1, Duration::from_secs(10))
            .await
            .err()
            .unwrap();

        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(matches!(err, ConnectError::Exhausted { attempts: 1, .. }));
    }
}
