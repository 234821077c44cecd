//! Per-destination write serialization.

use scriptorium_core::Destination;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// One async mutex per destination, shared by every pipeline in the process.
///
/// A pipeline holds the guard from its snapshot read until its write
/// completes, so read-merge-write cycles against the same sheet never
/// interleave. Different destinations do not contend. Entries nobody holds
/// or waits on are pruned on the next acquire, so the table stays as large as
/// the set of destinations currently in use.
#[derive(Debug, Clone, Default)]
pub struct DestinationLocks {
    locks: Arc<Mutex<HashMap<Destination, Arc<Mutex<()>>>>>,
}

impl DestinationLocks {
    /// Empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `destination`.
    pub async fn acquire(&self, destination: &Destination) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(destination.clone()).or_default().clone()
        };
        debug!(destination = %destination, "Waiting for destination lock");
        lock.lock_owned().await
    }
}
