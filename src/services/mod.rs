pub mod claim_query;
pub mod health;
pub mod status_filter;

pub use claim_query::ClaimQueryService;
pub use health::{report_liveness, Liveness, Readiness, ReadinessReporter};
pub use status_filter::{normalize_status, StatusFilter};
