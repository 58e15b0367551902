//! Nuance Client - persistence and resilience layer for the Nuance writing coach
//!
//! Provides a namespaced TTL cache over durable storage and a request client
//! that normalizes every failure into one error shape and retries transient ones.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use cache::{FileStorage, MemoryStorage, Namespace, TtlStore};
pub use client::{with_retry, ApiClient, RetryPolicy};
pub use config::Config;
pub use error::{ErrorKind, RequestError, StorageError};
pub use tasks::spawn_cleanup_task;
