//! # Web API Application State
//!
//! Everything a handler needs, built once at startup and shared read-only.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::ClaimsApiConfig;
use crate::database::{ConnectionFactory, PgConnectionFactory};
use crate::resilience::{BackoffPolicy, RetryDirector};
use crate::services::{ClaimQueryService, ReadinessReporter};

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<ClaimsApiConfig>,
    pub claims: Arc<ClaimQueryService>,
    pub readiness: Arc<ReadinessReporter>,
}

impl AppState {
    /// State backed by the configured warehouse
    pub fn from_config(config: ClaimsApiConfig) -> Self {
        let factory = Arc::new(PgConnectionFactory::from_config(&config.database));
        Self::with_factory(config, factory)
    }

    /// State over an arbitrary connection factory
    pub fn with_factory(config: ClaimsApiConfig, factory: Arc<dyn ConnectionFactory>) -> Self {
        let policy = BackoffPolicy::from_config(&config.retry);
        let worst_case_ms = policy.total_delay().as_millis() as u64;
        if worst_case_ms >= config.web.request_timeout_ms {
            warn!(
                worst_case_backoff_ms = worst_case_ms,
                request_timeout_ms = config.web.request_timeout_ms,
                "Request timeout is shorter than the retry backoff series; slow backends will surface as 408"
            );
        }
        if config.database.query_timeout_ms >= config.web.request_timeout_ms {
            warn!(
                query_timeout_ms = config.database.query_timeout_ms,
                request_timeout_ms = config.web.request_timeout_ms,
                "Request timeout does not exceed the query timeout; stalled statements will surface as 408"
            );
        }

        let retry = RetryDirector::new(
            Arc::clone(&factory),
            policy,
            config.database.connect_timeout(),
        );
        let claims = ClaimQueryService::new(
            retry,
            config.query.clone(),
            config.database.query_timeout(),
        );
        let readiness = ReadinessReporter::new(factory, config.database.readiness_timeout());

        info!(
            max_attempts = policy.max_attempts,
            base_delay_ms = policy.base_delay.as_millis() as u64,
            max_delay_ms = policy.max_delay.as_millis() as u64,
            "Application state initialized"
        );

        Self {
            config: Arc::new(config),
            claims: Arc::new(claims),
            readiness: Arc::new(readiness),
        }
    }
}
