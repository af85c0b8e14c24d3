//! # Claims Handlers
//!
//! Read-only claim lookups. Every backend problem surfaces as 503 once the
//! retry budget is spent; an unknown claim is 404.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use crate::models::{ClaimIdList, ClaimView};
use crate::web::errors::{ApiError, ApiResult};
use crate::web::state::AppState;

/// Query string of the status listing. Values are clamped, never rejected,
/// once they parse as integers.
#[derive(Debug, Default, Deserialize)]
pub struct StatusListParams {
    pub days: Option<i64>,
    pub limit: Option<i64>,
}

/// Most recent record of a claim: GET /v1/claims/{claim_id}
pub async fn get_claim(
    State(state): State<AppState>,
    Path(claim_id): Path<String>,
) -> ApiResult<Json<ClaimView>> {
    debug!(claim_id = %claim_id, "Getting claim");

    let view = state.claims.fetch_claim(&claim_id).await?;
    Ok(Json(view))
}

/// Recent claim ids with a matching status: GET /v1/claims/status/{status}
pub async fn list_claims_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
    params: Result<Query<StatusListParams>, QueryRejection>,
) -> ApiResult<Json<ClaimIdList>> {
    let Query(params) = params.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let list = state
        .claims
        .list_claims_by_status(&status, params.days, params.limit)
        .await?;
    Ok(Json(list))
}
