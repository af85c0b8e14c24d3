#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Claims API
//!
//! Read-only HTTP interface over the insurance claims table in the data
//! warehouse, built to stay up and diagnosable while the warehouse is paused,
//! resuming, or unreachable.
//!
//! ## Architecture
//!
//! Every request opens its own backend session. Query paths acquire it
//! through a bounded exponential-backoff retry; the readiness probe makes a
//! single short attempt; the liveness probe never touches the backend.
//! Failures are typed at each layer and mapped to 404 or 503 at the edge.
//!
//! ## Module Organization
//!
//! - [`config`] - Immutable process configuration (TOML + environment)
//! - [`error`] - Connection, statement and service failure types
//! - [`database`] - Connection Factory and parameterized claim statements
//! - [`resilience`] - Backoff policy and Retry Director
//! - [`services`] - Claim Query Service and Health/Readiness Reporters
//! - [`models`] - Claim rows and response shapes
//! - [`web`] - Axum routes, handlers and middleware
//! - [`logging`] - Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use claims_api::config::ConfigLoader;
//! use claims_api::web::{create_app, state::AppState};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::from_process_env().load()?;
//! let addr = config.web.socket_addr()?;
//! let app = create_app(AppState::from_config(config));
//!
//! let listener = tokio::net::TcpListener::bind(addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test                      # Unit and in-memory integration tests
//! cargo test --features test-db   # Adds SQL tests against DATABASE_URL
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod models;
pub mod resilience;
pub mod services;
pub mod web;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;

pub use config::{ClaimsApiConfig, ConfigLoader};
pub use error::{ClaimServiceError, ClaimServiceResult, ConnectError, QueryError};
pub use models::{ClaimIdList, ClaimRecord, ClaimView};
pub use services::{ClaimQueryService, ReadinessReporter};
