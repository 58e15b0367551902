//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside the client.
//!
//! # Tasks
//! - TTL Cleanup: Sweeps expired and malformed cache records at a fixed interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;
