//! # Web API Route Definitions

use crate::web::handlers;
use crate::web::state::AppState;
use axum::routing::get;
use axum::Router;

/// Create API v1 routes
///
/// Static segments win over parameters: `/claims/status/{status}` always
/// lists, so a claim whose id is literally `status` is shadowed for paths
/// below it.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/claims/status/:status",
            get(handlers::claims::list_claims_by_status),
        )
        .route("/claims/:claim_id", get(handlers::claims::get_claim))
}

/// Create probe routes
///
/// - `/health` - Liveness, never touches the backend
/// - `/ready` - Readiness, one bounded backend round trip
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::basic_health))
        .route("/ready", get(handlers::health::readiness_probe))
}
