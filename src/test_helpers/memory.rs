//! In-memory stand-in for the claims warehouse.
//!
//! [`MemoryConnectionFactory`] hands out [`MemorySession`]s that answer the
//! claim statements over a fixed set of records, using the same selection
//! rules as the SQL: newest row per claim, status compared in normalised form,
//! lookback inclusive, newest-first listing truncated to the limit. Failure
//! modes and counters let tests observe retry and release behaviour.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDateTime, Utc};
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::database::{BoxedClaimStore, ClaimStore, ConnectionFactory, StatusQuery};
use crate::error::{ConnectError, QueryError};
use crate::models::ClaimRecord;
use crate::services::status_filter::normalize_status;

#[derive(Debug, Clone)]
enum AcquireMode {
    Healthy,
    Refusing,
    FailingFirst(u32),
    Hanging,
    Panicking,
    Unconfigured(Vec<String>),
}

#[derive(Debug, Clone, Copy)]
enum QueryMode {
    Healthy,
    Failing,
    Hanging,
}

#[derive(Debug, Default)]
struct Counters {
    attempts: AtomicU32,
    open: AtomicI64,
    closed: AtomicU32,
    queries: AtomicU32,
}

/// Timestamp `days` days before now, in the naive UTC form the table stores
pub fn at_days_ago(days: i64) -> NaiveDateTime {
    Utc::now().naive_utc() - ChronoDuration::days(days)
}

/// Timestamp `hours` hours before now
pub fn at_hours_ago(hours: i64) -> NaiveDateTime {
    Utc::now().naive_utc() - ChronoDuration::hours(hours)
}

#[derive(Debug, Clone)]
pub struct MemoryConnectionFactory {
    records: Arc<Vec<ClaimRecord>>,
    acquire_mode: AcquireMode,
    query_mode: QueryMode,
    counters: Arc<Counters>,
}

impl MemoryConnectionFactory {
    pub fn new(records: Vec<ClaimRecord>) -> Self {
        Self {
            records: Arc::new(records),
            acquire_mode: AcquireMode::Healthy,
            query_mode: QueryMode::Healthy,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Factory whose every acquisition reports the given settings as missing
    pub fn unconfigured<I, S>(missing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            acquire_mode: AcquireMode::Unconfigured(missing.into_iter().map(Into::into).collect()),
            ..Self::new(Vec::new())
        }
    }

    /// Every acquisition fails as if the connection were refused
    pub fn refusing(mut self) -> Self {
        self.acquire_mode = AcquireMode::Refusing;
        self
    }

    /// The first `failures` acquisitions are refused, later ones succeed
    pub fn failing_first(mut self, failures: u32) -> Self {
        self.acquire_mode = AcquireMode::FailingFirst(failures);
        self
    }

    /// Acquisitions never complete and time out after the connect timeout
    pub fn hanging(mut self) -> Self {
        self.acquire_mode = AcquireMode::Hanging;
        self
    }

    /// Acquisitions panic
    pub fn panicking(mut self) -> Self {
        self.acquire_mode = AcquireMode::Panicking;
        self
    }

    /// Sessions open but every statement fails
    pub fn with_failing_queries(mut self) -> Self {
        self.query_mode = QueryMode::Failing;
        self
    }

    /// Sessions open but statements never complete
    pub fn with_hanging_queries(mut self) -> Self {
        self.query_mode = QueryMode::Hanging;
        self
    }

    /// Number of acquisition attempts made so far
    pub fn attempts(&self) -> u32 {
        self.counters.attempts.load(Ordering::SeqCst)
    }

    /// Sessions handed out and not yet dropped
    pub fn open_sessions(&self) -> i64 {
        self.counters.open.load(Ordering::SeqCst)
    }

    /// Sessions released through [`ClaimStore::close`]
    pub fn closed_sessions(&self) -> u32 {
        self.counters.closed.load(Ordering::SeqCst)
    }

    /// Statements executed, including pings
    pub fn queries(&self) -> u32 {
        self.counters.queries.load(Ordering::SeqCst)
    }

    fn open_session(&self) -> BoxedClaimStore {
        self.counters.open.fetch_add(1, Ordering::SeqCst);
        Box::new(MemorySession {
            records: Arc::clone(&self.records),
            query_mode: self.query_mode,
            counters: Arc::clone(&self.counters),
        })
    }
}

#[async_trait]
impl ConnectionFactory for MemoryConnectionFactory {
    async fn acquire(&self, connect_timeout: Duration) -> Result<BoxedClaimStore, ConnectError> {
        let attempt = self.counters.attempts.fetch_add(1, Ordering::SeqCst);
        match &self.acquire_mode {
            AcquireMode::Healthy => Ok(self.open_session()),
            AcquireMode::Refusing => Err(refused()),
            AcquireMode::FailingFirst(failures) if attempt < *failures => Err(refused()),
            AcquireMode::FailingFirst(_) => Ok(self.open_session()),
            AcquireMode::Hanging => {
                tokio::time::sleep(connect_timeout).await;
                Err(ConnectError::Timeout {
                    timeout: connect_timeout,
                })
            }
            AcquireMode::Panicking => panic!("connection factory panicked"),
            AcquireMode::Unconfigured(missing) => {
                Err(ConnectError::missing_settings(missing.iter().cloned()))
            }
        }
    }
}

fn refused() -> ConnectError {
    ConnectError::Unreachable("connection refused".to_string())
}

/// Session over the factory's records
#[derive(Debug)]
pub struct MemorySession {
    records: Arc<Vec<ClaimRecord>>,
    query_mode: QueryMode,
    counters: Arc<Counters>,
}

impl MemorySession {
    async fn begin_statement(&self) -> Result<(), QueryError> {
        self.counters.queries.fetch_add(1, Ordering::SeqCst);
        match self.query_mode {
            QueryMode::Healthy => Ok(()),
            QueryMode::Failing => Err(QueryError::Backend(
                "server closed the connection unexpectedly".to_string(),
            )),
            QueryMode::Hanging => std::future::pending().await,
        }
    }
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        self.counters.open.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClaimStore for MemorySession {
    async fn ping(&mut self) -> Result<(), QueryError> {
        self.begin_statement().await
    }

    async fn latest_claim(&mut self, claim_id: &str) -> Result<Option<ClaimRecord>, QueryError> {
        self.begin_statement().await?;
        Ok(self
            .records
            .iter()
            .filter(|record| record.claim_id == claim_id)
            .max_by_key(|record| record.inserted_at)
            .cloned())
    }

    async fn claim_ids_by_status(
        &mut self,
        query: &StatusQuery,
    ) -> Result<Vec<String>, QueryError> {
        self.begin_statement().await?;

        let mut matching: Vec<&ClaimRecord> = self
            .records
            .iter()
            .filter(|record| {
                record
                    .claim_status
                    .as_deref()
                    .is_some_and(|status| normalize_status(status) == query.normalized_status)
            })
            .filter(|record| {
                record
                    .inserted_at
                    .is_some_and(|inserted| inserted >= query.inserted_since)
            })
            .collect();
        matching.sort_by(|a, b| b.inserted_at.cmp(&a.inserted_at));

        Ok(matching
            .into_iter()
            .take(usize::try_from(query.limit).unwrap_or(0))
            .map(|record| record.claim_id.clone())
            .collect())
    }

    async fn close(self: Box<Self>) {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
    }
}
