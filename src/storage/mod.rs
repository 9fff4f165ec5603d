//! Snapshot storage.
//!
//! The live snapshot is held in memory and swapped atomically after each
//! refresh. `export` writes a snapshot to disk as JSON for inspection.

pub mod export;

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::Snapshot;

pub use export::write_snapshot;

/// Holder of the current snapshot.
///
/// Readers get a cheap `Arc` clone; a refresh replaces the whole snapshot at
/// once, so nobody ever observes a half-updated one.
pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// The current snapshot.
    pub async fn load(&self) -> Arc<Snapshot> {
        self.current.read().await.clone()
    }

    /// Swap in a new snapshot, returning the previous one.
    pub async fn replace(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let mut guard = self.current.write().await;
        std::mem::replace(&mut *guard, Arc::new(snapshot))
    }
}
