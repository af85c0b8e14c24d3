//! # Health and Readiness Reporting
//!
//! Liveness answers from process state alone. Readiness makes one bounded
//! round trip to the backend and encodes every failure in its result.

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::database::ConnectionFactory;
use crate::error::QueryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liveness {
    pub ok: bool,
}

/// The process is up and scheduling requests. Never touches the backend.
pub fn report_liveness() -> Liveness {
    Liveness { ok: true }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readiness {
    pub ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Readiness {
    pub fn ready() -> Self {
        Self {
            ready: true,
            reason: None,
        }
    }

    pub fn not_ready(reason: impl Into<String>) -> Self {
        Self {
            ready: false,
            reason: Some(reason.into()),
        }
    }
}

/// Single-attempt backend probe.
///
/// Goes straight to the [`ConnectionFactory`], never through the retry path,
/// so one probe costs at most two readiness timeouts.
pub struct ReadinessReporter {
    factory: Arc<dyn ConnectionFactory>,
    timeout: Duration,
}

impl std::fmt::Debug for ReadinessReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadinessReporter")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ReadinessReporter {
    pub fn new(factory: Arc<dyn ConnectionFactory>, timeout: Duration) -> Self {
        Self { factory, timeout }
    }

    /// Probe the backend. Never fails; problems become `ready: false`.
    pub async fn report_readiness(&self) -> Readiness {
        let started = Instant::now();

        let outcome = match AssertUnwindSafe(self.probe()).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(_) => Err("readiness probe panicked".to_string()),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(()) => {
                debug!(elapsed_ms, "Readiness probe succeeded");
                Readiness::ready()
            }
            Err(reason) => {
                warn!(elapsed_ms, reason = %reason, "Readiness probe failed");
                Readiness::not_ready(reason)
            }
        }
    }

    async fn probe(&self) -> Result<(), String> {
        let mut session = self
            .factory
            .acquire(self.timeout)
            .await
            .map_err(|e| e.to_string())?;

        match tokio::time::timeout(self.timeout, session.ping()).await {
            Ok(result) => {
                session.close().await;
                result.map_err(|e| e.to_string())
            }
            // A session stuck mid-statement is dropped rather than closed
            Err(_) => Err(QueryError::Timeout {
                timeout: self.timeout,
            }
            .to_string()),
        }
    }
}
