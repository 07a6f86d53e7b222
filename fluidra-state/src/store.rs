//! Snapshot store
//!
//! Holds the current snapshot behind a cheap read lock. Readers clone an
//! `Arc` out and never block each other; writers replace the snapshot
//! wholesale. Publication is gated on the cycle sequence number so a
//! superseded cycle can never overwrite a newer snapshot.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::model::Snapshot;

#[derive(Debug)]
pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::empty())),
        }
    }

    /// Current snapshot, lock held only for the `Arc` clone
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read())
    }

    /// Publish a cycle result; returns false when a newer cycle already
    /// published and this one must be discarded
    pub fn publish(&self, snapshot: Snapshot) -> bool {
        let mut current = self.current.write();
        if snapshot.cycle <= current.cycle {
            debug!(
                cycle = snapshot.cycle,
                published = current.cycle,
                "discarding superseded cycle result"
            );
            return false;
        }
        *current = Arc::new(snapshot);
        true
    }

    /// Mark the retained snapshot stale after a failed cycle
    pub fn mark_stale(&self) -> Arc<Snapshot> {
        let mut current = self.current.write();
        if !current.stale {
            let mut carried = (**current).clone();
            carried.stale = true;
            *current = Arc::new(carried);
        }
        Arc::clone(&current)
    }

    /// Replace the current snapshot with a locally modified copy
    ///
    /// Used for optimistic command state; the cycle number is untouched so
    /// the next real cycle still publishes over it.
    pub fn amend(&self, amend: impl FnOnce(&mut Snapshot)) -> Arc<Snapshot> {
        let mut current = self.current.write();
        let mut copy = (**current).clone();
        amend(&mut copy);
        *current = Arc::new(copy);
        Arc::clone(&current)
    }
}
