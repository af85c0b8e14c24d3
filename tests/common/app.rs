//! In-process router harness over the in-memory backend.

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use claims_api::config::ClaimsApiConfig;
use claims_api::models::ClaimRecord;
use claims_api::test_helpers::{at_days_ago, MemoryConnectionFactory};
use claims_api::web::{create_app, state::AppState};

/// Configuration with a short retry series so failure paths finish quickly
pub fn fast_config() -> ClaimsApiConfig {
    let mut config = ClaimsApiConfig::default();
    config.retry.max_attempts = 3;
    config.retry.base_delay_ms = 5;
    config.retry.max_delay_ms = 20;
    config.database.readiness_timeout_ms = 200;
    config
}

pub fn app_with(factory: &Arc<MemoryConnectionFactory>, config: ClaimsApiConfig) -> Router {
    create_app(AppState::with_factory(config, factory.clone()))
}

pub fn app(factory: &Arc<MemoryConnectionFactory>) -> Router {
    app_with(factory, fast_config())
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub json: serde_json::Value,
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

    TestResponse {
        status,
        headers,
        json,
    }
}

/// Three "In Review" claims at t-1, t-2 and t-10 days plus unrelated rows
pub fn review_claims() -> Vec<ClaimRecord> {
    vec![
        ClaimRecord::new("claim-t1", "In Review", at_days_ago(1)),
        ClaimRecord::new("claim-t2", "In Review", at_days_ago(2)),
        ClaimRecord::new("claim-t10", "In Review", at_days_ago(10)),
        ClaimRecord::new("claim-approved", "Approved", at_days_ago(1)),
        ClaimRecord::new("CLM-1001", "Submitted", at_days_ago(6)),
        ClaimRecord::new("CLM-1001", "Approved", at_days_ago(3)).with_fraud(
            "likely_fraud",
            0.87,
            "billing pattern matches known fraud ring",
        ),
    ]
}
