//! Client Module
//!
//! Resilient request client for the coaching service: one normalized error
//! shape for every failure, and bounded retries for transient ones.

mod api;
mod normalize;
mod retry;

pub use api::{ApiClient, Idempotency};
pub use retry::{with_retry, RetryPolicy};
