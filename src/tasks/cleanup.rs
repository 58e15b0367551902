//! TTL Cleanup Task
//!
//! Background task that periodically sweeps expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{Clock, StorageBackend, TtlStore};

/// Spawns a background task that periodically runs [`TtlStore::cleanup`].
///
/// The task sleeps for `interval` between sweeps and holds the write lock
/// only for the duration of a sweep.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
///
/// # Example
/// ```ignore
/// let store = Arc::new(RwLock::new(TtlStore::new(MemoryStorage::new())));
/// let cleanup_handle = spawn_cleanup_task(store.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<S, C>(store: Arc<RwLock<TtlStore<S, C>>>, interval: Duration) -> JoinHandle<()>
where
    S: StorageBackend + Send + Sync + 'static,
    C: Clock + 'static,
{
    tokio::spawn(async move {
        info!("Starting TTL cleanup task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut guard = store.write().await;
                guard.cleanup()
            };

            if removed > 0 {
                info!("TTL cleanup: removed {} entries", removed);
            } else {
                debug!("TTL cleanup: nothing to remove");
            }
        }
    })
}
