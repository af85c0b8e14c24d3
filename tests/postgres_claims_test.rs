//! Claim statements executed against a real Postgres.
//!
//! Requires: DATABASE_URL pointing at a Postgres server
//! Enable with: --features test-db

#![cfg(feature = "test-db")]

use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;

use claims_api::config::{QueryLimitsConfig, SqlDialect};
use claims_api::database::{ClaimSql, ClaimStore, PgClaimConnection};
use claims_api::services::StatusFilter;

const CLAIMS_TABLE: &str = "claims_processed";

async fn seed(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE claims_processed (
            claim_id VARCHAR(64) NOT NULL,
            claim_status VARCHAR(64),
            inserted_at TIMESTAMP,
            fraud_prediction VARCHAR(32),
            fraud_score NUMERIC(6, 4),
            fraud_explanation TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO claims_processed VALUES
            ('t-1',  'In Review', NOW() AT TIME ZONE 'UTC' - INTERVAL '1 day',  NULL, NULL, NULL),
            ('t-2',  'in_review', NOW() AT TIME ZONE 'UTC' - INTERVAL '2 days', NULL, NULL, NULL),
            ('t-10', 'IN-REVIEW', NOW() AT TIME ZONE 'UTC' - INTERVAL '10 days', NULL, NULL, NULL),
            ('C-1',  'Submitted', NOW() AT TIME ZONE 'UTC' - INTERVAL '5 days', NULL, NULL, NULL),
            ('C-1',  'Approved',  NOW() AT TIME ZONE 'UTC' - INTERVAL '1 day',
                'likely_fraud', 0.8731, 'duplicate invoice'),
            ('C-2',  'Denied',    NULL, NULL, NULL, NULL)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn session(pool: &PgPool) -> Result<PgClaimConnection, sqlx::Error> {
    session_on(pool, CLAIMS_TABLE).await
}

async fn session_on(pool: &PgPool, table: &str) -> Result<PgClaimConnection, sqlx::Error> {
    let conn = pool.acquire().await?.detach();
    let sql = Arc::new(ClaimSql::new(table, SqlDialect::Postgres));
    Ok(PgClaimConnection::new(conn, sql))
}

#[sqlx::test(migrations = false)]
async fn test_latest_claim_selects_newest_row(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    seed(&pool).await?;
    let mut session = session(&pool).await?;

    let record = session.latest_claim("C-1").await?.expect("claim C-1 exists");
    assert_eq!(record.claim_status.as_deref(), Some("Approved"));
    assert_eq!(record.fraud_prediction.as_deref(), Some("likely_fraud"));
    assert!((record.fraud_score.unwrap() - 0.8731).abs() < 1e-9);

    let record = session.latest_claim("t-1").await?.expect("claim t-1 exists");
    assert_eq!(record.fraud_score, None);

    assert!(session.latest_claim("nope").await?.is_none());
    // injection attempt is just an unknown id
    assert!(session.latest_claim("' OR '1'='1").await?.is_none());

    Box::new(session).close().await;
    Ok(())
}

#[sqlx::test(migrations = false)]
async fn test_non_text_predictions_are_read_as_text(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    sqlx::query(
        r#"
        CREATE TABLE labelled_claims (
            claim_id VARCHAR(64) NOT NULL,
            claim_status VARCHAR(64),
            inserted_at TIMESTAMP,
            fraud_prediction INTEGER,
            fraud_score REAL,
            fraud_explanation TEXT
        )
        "#,
    )
    .execute(&pool)
    .await?;
    sqlx::query(
        r#"
        INSERT INTO labelled_claims VALUES
            ('L-1', 'Approved', NOW() AT TIME ZONE 'UTC', 1, 0.5, 'label one'),
            ('L-2', 'Approved', NOW() AT TIME ZONE 'UTC', NULL, NULL, NULL)
        "#,
    )
    .execute(&pool)
    .await?;
    sqlx::query(
        r#"
        CREATE TABLE flagged_claims (
            claim_id VARCHAR(64) NOT NULL,
            claim_status VARCHAR(64),
            inserted_at TIMESTAMP,
            fraud_prediction BOOLEAN,
            fraud_score REAL,
            fraud_explanation TEXT
        )
        "#,
    )
    .execute(&pool)
    .await?;
    sqlx::query("INSERT INTO flagged_claims VALUES ('F-1', 'Denied', NOW() AT TIME ZONE 'UTC', TRUE, 0.9, NULL)")
        .execute(&pool)
        .await?;

    let mut session = session_on(&pool, "labelled_claims").await?;
    let record = session.latest_claim("L-1").await?.expect("claim L-1 exists");
    assert_eq!(record.fraud_prediction.as_deref(), Some("1"));
    assert_eq!(record.fraud_score, Some(0.5));
    let record = session.latest_claim("L-2").await?.expect("claim L-2 exists");
    assert_eq!(record.fraud_prediction, None);
    Box::new(session).close().await;

    let mut session = session_on(&pool, "flagged_claims").await?;
    let record = session.latest_claim("F-1").await?.expect("claim F-1 exists");
    assert_eq!(record.fraud_prediction.as_deref(), Some("true"));
    Box::new(session).close().await;

    Ok(())
}

#[sqlx::test(migrations = false)]
async fn test_status_listing_normalises_both_sides(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    seed(&pool).await?;
    let mut session = session(&pool).await?;
    let limits = QueryLimitsConfig::default();
    let now = Utc::now().naive_utc();

    let query = StatusFilter::new("in-review", Some(7), Some(2), &limits).to_query(now);
    let ids = session.claim_ids_by_status(&query).await?;
    assert_eq!(ids, vec!["t-1".to_string(), "t-2".to_string()]);

    let query = StatusFilter::new("IN REVIEW", Some(30), None, &limits).to_query(now);
    let ids = session.claim_ids_by_status(&query).await?;
    assert_eq!(
        ids,
        vec!["t-1".to_string(), "t-2".to_string(), "t-10".to_string()]
    );

    // rows without an insertion time never fall inside a window
    let query = StatusFilter::new("denied", Some(90), None, &limits).to_query(now);
    assert!(session.claim_ids_by_status(&query).await?.is_empty());

    Ok(())
}

#[sqlx::test(migrations = false)]
async fn test_ping_round_trips(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = session(&pool).await?;
    session.ping().await?;
    Box::new(session).close().await;
    Ok(())
}
