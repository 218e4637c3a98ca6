use netmap_core::NetworkGraph;
use parking_lot::RwLock;
use std::sync::Arc;

/// The result of one generation: the graph and the page rendered from it.
#[derive(Debug)]
pub struct Snapshot {
    pub graph: NetworkGraph,
    pub html: String,
}

/// Holds the most recently published snapshot.
///
/// Readers clone the current `Arc` and release the lock immediately, so a publish never waits on
/// a slow response.
#[derive(Clone, Debug, Default)]
pub struct SharedSnapshot(Arc<RwLock<Option<Arc<Snapshot>>>>);

impl SharedSnapshot {
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.0.read().clone()
    }

    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        *self.0.write() = Some(snapshot.clone());
        snapshot
    }
}
