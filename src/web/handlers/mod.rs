//! # Web API Request Handlers
//!
//! HTTP request handlers organized by endpoint group.

pub mod claims;
pub mod health;
