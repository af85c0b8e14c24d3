//! Error types for the claims API.
//!
//! Failures are classified into a small set of categories as they leave each
//! layer. The Connection Factory and Retry Director speak [`ConnectError`],
//! individual statements speak [`QueryError`], and the Claim Query Service
//! folds both into [`ClaimServiceError`], which the web layer maps onto status
//! codes.

use std::time::Duration;
use thiserror::Error;

/// SQLSTATE codes the backend uses for rejected credentials.
const INVALID_PASSWORD: &str = "28P01";
const INVALID_AUTHORIZATION: &str = "28000";
/// SQLSTATE raised when `statement_timeout` cancels a query.
const QUERY_CANCELED: &str = "57014";

/// Failure while establishing a backend session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConnectError {
    /// Required connection settings are absent. Carries setting names only.
    #[error("backend connection is not configured: missing {}", missing.join(", "))]
    Configuration { missing: Vec<String> },

    #[error("connection attempt timed out after {}ms", timeout.as_millis())]
    Timeout { timeout: Duration },

    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("backend rejected credentials: {0}")]
    Authentication(String),

    #[error("backend connection failed: {0}")]
    Backend(String),

    #[error("gave up after {attempts} connection attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<ConnectError>,
    },
}

impl ConnectError {
    /// Create a configuration error from the names of the missing settings
    pub fn missing_settings<I, S>(missing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Configuration {
            missing: missing.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether another attempt could plausibly succeed.
    ///
    /// Missing configuration cannot fix itself between attempts, and an
    /// exhausted retry series has already spent its budget.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Configuration { .. } | Self::Exhausted { .. })
    }

    /// Classify a driver error raised during connection setup
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) => Self::Unreachable(err.to_string()),
            sqlx::Error::Database(db)
                if matches!(
                    db.code().as_deref(),
                    Some(INVALID_PASSWORD) | Some(INVALID_AUTHORIZATION)
                ) =>
            {
                Self::Authentication(db.message().to_string())
            }
            _ => Self::Backend(err.to_string()),
        }
    }
}

/// Failure while executing a statement on an established session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("statement cancelled by backend statement timeout")]
    StatementTimeout,

    #[error("query did not complete within {}ms", timeout.as_millis())]
    Timeout { timeout: Duration },

    #[error("query failed: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for QueryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(QUERY_CANCELED) => {
                Self::StatementTimeout
            }
            _ => Self::Backend(err.to_string()),
        }
    }
}

/// Outcome categories of the Claim Query Service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClaimServiceError {
    /// The query ran and matched no rows.
    #[error("claim '{claim_id}' not found")]
    NotFound { claim_id: String },

    /// The backend could not be reached or the query failed.
    #[error("database unavailable: {detail}")]
    ServiceUnavailable { detail: String },
}

impl ClaimServiceError {
    pub fn not_found(claim_id: impl Into<String>) -> Self {
        Self::NotFound {
            claim_id: claim_id.into(),
        }
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            detail: detail.into(),
        }
    }
}

impl From<ConnectError> for ClaimServiceError {
    fn from(err: ConnectError) -> Self {
        Self::unavailable(err.to_string())
    }
}

impl From<QueryError> for ClaimServiceError {
    fn from(err: QueryError) -> Self {
        Self::unavailable(err.to_string())
    }
}

pub type ClaimServiceResult<T> = Result<T, ClaimServiceError>;
