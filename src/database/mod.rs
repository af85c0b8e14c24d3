//! # Database Access
//!
//! Per-request sessions against the claims warehouse. There is no pool: every
//! operation opens one connection through a [`ConnectionFactory`], runs its
//! statement and releases the connection before returning.
//!
//! ## Key Components
//!
//! - [`connection`] - The [`ConnectionFactory`] seam and its sqlx implementation
//! - [`claims`] - Parameterized claim statements and the [`ClaimStore`] session trait

pub mod claims;
pub mod connection;

pub use claims::{ClaimSql, ClaimStore, PgClaimConnection, StatusQuery};
pub use connection::{ConnectionFactory, PgConnectionFactory};

/// A live session handed out by a [`ConnectionFactory`]
pub type BoxedClaimStore = Box<dyn ClaimStore>;
