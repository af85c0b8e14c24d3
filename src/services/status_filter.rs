//! Status listing parameters: normalisation and clamping.

use chrono::{Duration as ChronoDuration, NaiveDateTime};
use tracing::debug;

use crate::config::QueryLimitsConfig;
use crate::database::StatusQuery;

/// Canonical form of a claim status: ASCII letters and digits only, lowercase.
///
/// `"In Review"`, `"in_review"` and `"IN-REVIEW"` all become `"inreview"`.
/// Non-ASCII characters are dropped, matching the `[^A-Za-z0-9]` pattern the
/// backend applies to stored values.
pub fn normalize_status(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// `value` (or `default` when absent) forced into `[min, max]`
pub fn clamp_param(value: Option<i64>, default: i64, min: i64, max: i64) -> i64 {
    value.unwrap_or(default).clamp(min, max)
}

/// A validated status listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFilter {
    /// Status as the caller sent it, echoed back in the response
    pub status: String,
    pub normalized_status: String,
    pub days: i64,
    pub limit: i64,
}

impl StatusFilter {
    pub fn new(
        status: &str,
        days: Option<i64>,
        limit: Option<i64>,
        limits: &QueryLimitsConfig,
    ) -> Self {
        let clamped_days = clamp_param(days, limits.default_days, limits.min_days, limits.max_days);
        let clamped_limit = clamp_param(
            limit,
            limits.default_limit,
            limits.min_limit,
            limits.max_limit,
        );

        if days.is_some_and(|d| d != clamped_days) || limit.is_some_and(|l| l != clamped_limit) {
            debug!(
                requested_days = ?days,
                requested_limit = ?limit,
                days = clamped_days,
                limit = clamped_limit,
                "Status listing parameters clamped"
            );
        }

        Self {
            status: status.to_string(),
            normalized_status: normalize_status(status),
            days: clamped_days,
            limit: clamped_limit,
        }
    }

    /// Statement parameters with the lookback window ending at `now`
    pub fn to_query(&self, now: NaiveDateTime) -> StatusQuery {
        StatusQuery {
            normalized_status: self.normalized_status.clone(),
            inserted_since: now - ChronoDuration::days(self.days),
            limit: self.limit,
        }
    }
}
