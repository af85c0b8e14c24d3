//! # Health Check Handlers
//!
//! Probe endpoints for process supervisors and load balancers. Both always
//! answer 200; readiness encodes backend trouble in the body.

use axum::extract::State;
use axum::Json;
use tracing::debug;

use crate::services::health::{report_liveness, Liveness, Readiness};
use crate::web::state::AppState;

/// Liveness probe: GET /health
///
/// Answers from process state alone, even with no backend configured.
pub async fn basic_health() -> Json<Liveness> {
    Json(report_liveness())
}

/// Readiness probe: GET /ready
///
/// One connection attempt and a `SELECT 1`, each bounded by the readiness
/// timeout. Never retried.
pub async fn readiness_probe(State(state): State<AppState>) -> Json<Readiness> {
    debug!("Performing readiness probe");
    Json(state.readiness.report_readiness().await)
}
