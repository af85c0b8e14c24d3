//! # Web API Module
//!
//! Axum HTTP surface over the claim services.
//!
//! ## Core Components
//!
//! - [`routes`] - Route table for probes and the versioned claims API
//! - [`handlers`] - Request handlers, one module per endpoint group
//! - [`middleware`] - Request id propagation
//! - [`state`] - Shared, read-only application state
//! - [`errors`] - Mapping of service outcomes onto HTTP responses

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod response_types;
pub mod routes;
pub mod state;

use axum::Router;
use state::AppState;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Create the Axum application with all routes and middleware.
///
/// `/health` and `/ready` sit at the root; the claims API is nested under
/// `/v1`. A stalled statement is cut off by `database.query_timeout_ms` and
/// answered with 503; `web.request_timeout_ms` is the outer bound, answered
/// with 408, after which the handler future and any open backend session are
/// dropped.
pub fn create_app(app_state: AppState) -> Router {
    let request_timeout = app_state.config.web.request_timeout();

    Router::new()
        .merge(routes::health_routes())
        .nest("/v1", routes::api_v1_routes())
        .layer(axum::middleware::from_fn(
            middleware::request_id::add_request_id,
        ))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CatchPanicLayer::custom(errors::panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
