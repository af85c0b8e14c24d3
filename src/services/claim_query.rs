//! Claim Query Service
//!
//! Each operation acquires its own session through the [`RetryDirector`],
//! runs one statement, and closes the session before returning, whatever the
//! statement's outcome. If the caller abandons the request the in-flight
//! future is dropped and the session with it.
//!
//! Every statement runs under a client-side deadline. sqlx gives no control
//! over socket keep-alive, so this deadline is what turns a half-open
//! connection into a `ServiceUnavailable` instead of a request that hangs.

use chrono::Utc;
use std::time::Duration;
use tokio::time::error::Elapsed;
use tracing::{debug, info, warn};

use super::status_filter::StatusFilter;
use crate::config::QueryLimitsConfig;
use crate::database::BoxedClaimStore;
use crate::error::{ClaimServiceError, ClaimServiceResult, QueryError};
use crate::models::{ClaimIdList, ClaimView};
use crate::resilience::RetryDirector;

#[derive(Debug, Clone)]
pub struct ClaimQueryService {
    retry: RetryDirector,
    limits: QueryLimitsConfig,
    query_timeout: Duration,
}

impl ClaimQueryService {
    pub fn new(retry: RetryDirector, limits: QueryLimitsConfig, query_timeout: Duration) -> Self {
        Self {
            retry,
            limits,
            query_timeout,
        }
    }

    /// Release `session` once its statement has finished or missed the deadline.
    ///
    /// A session whose statement timed out may sit on a dead socket, so it is
    /// dropped instead of closed.
    async fn settle<T>(
        &self,
        session: BoxedClaimStore,
        outcome: Result<Result<T, QueryError>, Elapsed>,
    ) -> Result<T, QueryError> {
        match outcome {
            Ok(result) => {
                if tokio::time::timeout(self.query_timeout, session.close())
                    .await
                    .is_err()
                {
                    debug!("Backend session close did not finish in time, dropping it");
                }
                result
            }
            Err(_) => {
                drop(session);
                Err(QueryError::Timeout {
                    timeout: self.query_timeout,
                })
            }
        }
    }

    /// Most recent record of a claim
    pub async fn fetch_claim(&self, claim_id: &str) -> ClaimServiceResult<ClaimView> {
        debug!(claim_id = %claim_id, "Fetching claim");

        let mut session = self.retry.acquire().await.map_err(|e| {
            warn!(claim_id = %claim_id, error = %e, "Claim lookup could not reach backend");
            ClaimServiceError::from(e)
        })?;

        let outcome =
            tokio::time::timeout(self.query_timeout, session.latest_claim(claim_id)).await;
        let result = self.settle(session, outcome).await;

        let record = result.map_err(|e| {
            warn!(claim_id = %claim_id, error = %e, "Claim lookup failed");
            ClaimServiceError::from(e)
        })?;

        match record {
            Some(record) => Ok(ClaimView::from(record)),
            None => {
                debug!(claim_id = %claim_id, "Claim not found");
                Err(ClaimServiceError::not_found(claim_id))
            }
        }
    }

    /// Ids of recent claims whose status matches `status` after normalisation.
    ///
    /// `days` and `limit` are clamped into the configured bounds; the
    /// response reports the values actually used.
    pub async fn list_claims_by_status(
        &self,
        status: &str,
        days: Option<i64>,
        limit: Option<i64>,
    ) -> ClaimServiceResult<ClaimIdList> {
        let filter = StatusFilter::new(status, days, limit, &self.limits);
        let query = filter.to_query(Utc::now().naive_utc());

        debug!(
            status = %filter.status,
            normalized_status = %filter.normalized_status,
            days = filter.days,
            limit = filter.limit,
            "Listing claims by status"
        );

        let mut session = self.retry.acquire().await.map_err(|e| {
            warn!(status = %filter.status, error = %e, "Status listing could not reach backend");
            ClaimServiceError::from(e)
        })?;

        let outcome =
            tokio::time::timeout(self.query_timeout, session.claim_ids_by_status(&query)).await;
        let result = self.settle(session, outcome).await;

        let claim_ids = result.map_err(|e| {
            warn!(status = %filter.status, error = %e, "Status listing failed");
            ClaimServiceError::from(e)
        })?;

        info!(
            status = %filter.status,
            count = claim_ids.len(),
            "Status listing completed"
        );

        Ok(ClaimIdList::new(
            filter.status,
            filter.days,
            filter.limit,
            claim_ids,
        ))
    }
}
