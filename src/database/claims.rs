//! Claim statements and the session trait that executes them.
//!
//! Caller-supplied values are always bound as parameters. The only text
//! interpolated into SQL is the claims table name, which is validated as an
//! identifier when configuration loads.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{Connection, PgConnection};
use std::sync::Arc;
use tracing::debug;

use crate::config::SqlDialect;
use crate::error::QueryError;
use crate::models::ClaimRecord;

/// Parameters of a status listing, already normalised and clamped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusQuery {
    /// Lowercase ASCII-alphanumeric form of the requested status
    pub normalized_status: String,
    /// Only rows inserted at or after this instant qualify
    pub inserted_since: NaiveDateTime,
    pub limit: i64,
}

/// An open backend session.
///
/// Implementations release the underlying connection when dropped;
/// [`ClaimStore::close`] additionally says goodbye to the backend.
#[async_trait]
pub trait ClaimStore: Send {
    /// Trivial round trip proving the session can execute statements
    async fn ping(&mut self) -> Result<(), QueryError>;

    /// Most recent record for `claim_id`, if any
    async fn latest_claim(&mut self, claim_id: &str) -> Result<Option<ClaimRecord>, QueryError>;

    /// Claim ids whose normalised status matches, newest first
    async fn claim_ids_by_status(&mut self, query: &StatusQuery)
        -> Result<Vec<String>, QueryError>;

    /// Graceful shutdown of the session
    async fn close(self: Box<Self>);
}

/// SQL text for the claim statements, rendered once per table and dialect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSql {
    pub latest_claim: String,
    pub claim_ids_by_status: String,
}

impl ClaimSql {
    pub fn new(table: &str, dialect: SqlDialect) -> Self {
        let latest_claim = format!(
            "SELECT claim_id, claim_status, \
             CAST(inserted_at AS TIMESTAMP) AS inserted_at, \
             CAST(fraud_prediction AS VARCHAR) AS fraud_prediction, \
             CAST(fraud_score AS DOUBLE PRECISION) AS fraud_score, \
             fraud_explanation \
             FROM {table} \
             WHERE claim_id = $1 \
             ORDER BY inserted_at DESC NULLS LAST \
             LIMIT 1"
        );

        let claim_ids_by_status = format!(
            "SELECT claim_id \
             FROM {table} \
             WHERE {status} = $1 \
             AND inserted_at >= $2 \
             ORDER BY inserted_at DESC \
             LIMIT $3",
            status = normalized_status_expr(dialect)
        );

        Self {
            latest_claim,
            claim_ids_by_status,
        }
    }
}

/// Server-side equivalent of `normalize_status`: drop every character outside
/// `[A-Za-z0-9]`, then lowercase.
fn normalized_status_expr(dialect: SqlDialect) -> &'static str {
    match dialect {
        // Redshift's REGEXP_REPLACE replaces every occurrence by default
        SqlDialect::Redshift => "LOWER(REGEXP_REPLACE(claim_status, '[^A-Za-z0-9]', ''))",
        SqlDialect::Postgres => "LOWER(REGEXP_REPLACE(claim_status, '[^A-Za-z0-9]', '', 'g'))",
    }
}

/// [`ClaimStore`] over a single sqlx connection
pub struct PgClaimConnection {
    conn: PgConnection,
    sql: Arc<ClaimSql>,
}

impl PgClaimConnection {
    pub fn new(conn: PgConnection, sql: Arc<ClaimSql>) -> Self {
        Self { conn, sql }
    }
}

#[async_trait]
impl ClaimStore for PgClaimConnection {
    async fn ping(&mut self) -> Result<(), QueryError> {
        sqlx::query("SELECT 1").execute(&mut self.conn).await?;
        Ok(())
    }

    async fn latest_claim(&mut self, claim_id: &str) -> Result<Option<ClaimRecord>, QueryError> {
        let record = sqlx::query_as::<_, ClaimRecord>(self.sql.latest_claim.as_str())
            .bind(claim_id)
            .fetch_optional(&mut self.conn)
            .await?;

        Ok(record)
    }

    async fn claim_ids_by_status(
        &mut self,
        query: &StatusQuery,
    ) -> Result<Vec<String>, QueryError> {
        let ids = sqlx::query_scalar::<_, String>(self.sql.claim_ids_by_status.as_str())
            .bind(query.normalized_status.as_str())
            .bind(query.inserted_since)
            .bind(query.limit)
            .fetch_all(&mut self.conn)
            .await?;

        Ok(ids)
    }

    async fn close(self: Box<Self>) {
        let this = *self;
        if let Err(e) = this.conn.close().await {
            debug!(error = %e, "Backend session did not close cleanly");
        }
    }
}
