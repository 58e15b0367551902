//! Cache Module
//!
//! Namespaced TTL key-value store over a pluggable durable medium.

mod backend;
mod clock;
mod entry;
mod file;
mod namespace;
mod sessions;
mod stats;
mod store;


// Re-export public types
pub use backend::{MemoryStorage, StorageBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use file::FileStorage;
pub use namespace::{Namespace, UnknownNamespace};
pub use stats::CacheStats;
pub use store::{Lookup, StoredEntry, TtlStore};
