// Test Helpers Module - in-memory backend for unit and integration tests
//
// Enabled for this crate's own unit tests and, through the `test-utils`
// feature, for the integration tests under tests/.

pub mod memory;

pub use memory::{at_days_ago, at_hours_ago, MemoryConnectionFactory, MemorySession};
