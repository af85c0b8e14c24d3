//! # Claim Models
//!
//! Rows read from the claims table and the JSON shapes served to callers.

pub mod claim;

pub use claim::{AiAnnotations, ClaimIdList, ClaimRecord, ClaimView};
