//! # Resilience
//!
//! Bounded retry with exponential backoff around backend connection
//! acquisition. Query-path requests ride out short warehouse outages here;
//! readiness probes bypass it and make a single attempt.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use claims_api::config::DatabaseConfig;
//! use claims_api::database::PgConnectionFactory;
//! use claims_api::resilience::{BackoffPolicy, RetryDirector};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let factory = Arc::new(PgConnectionFactory::from_config(&DatabaseConfig::default()));
//! let director = RetryDirector::new(factory, BackoffPolicy::default(), Duration::from_secs(3));
//!
//! let session = director.acquire().await?;
//! session.close().await;
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod retry;

pub use backoff::BackoffPolicy;
pub use retry::RetryDirector;
