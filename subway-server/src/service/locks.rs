//! Per-line exclusivity.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

use crate::domain::LineId;

/// One reader/writer lock per line.
///
/// Mutations hold a line's write guard across their whole
/// load-modify-store cycle; reads hold the read guard. Different lines
/// never share a lock. An entry only lives while someone holds or waits
/// for it.
#[derive(Default)]
pub(crate) struct LineLocks {
    locks: Mutex<HashMap<LineId, Arc<RwLock<()>>>>,
}

/// A held line lock. Dropping it releases the lock and removes every entry
/// nobody holds or waits for any more.
pub(crate) struct LineGuard<'a, G> {
    locks: &'a LineLocks,
    guard: Option<G>,
}

impl<G> Drop for LineGuard<'_, G> {
    fn drop(&mut self) {
        // The guard owns the only clone this holder had
        drop(self.guard.take());
        self.locks.release_unused();
    }
}

impl LineLocks {
    fn lock_for(&self, id: LineId) -> Arc<RwLock<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(id).or_default().clone()
    }

    /// Clones are only handed out under the map mutex, so a count of one
    /// seen here means no holder or waiter remains. Sweeping every entry
    /// also catches those left by waiters that were cancelled.
    fn release_unused(&self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    pub(crate) async fn read(&self, id: LineId) -> LineGuard<'_, OwnedRwLockReadGuard<()>> {
        let guard = self.lock_for(id).read_owned().await;
        LineGuard {
            locks: self,
            guard: Some(guard),
        }
    }

    pub(crate) async fn write(&self, id: LineId) -> LineGuard<'_, OwnedRwLockWriteGuard<()>> {
        let guard = self.lock_for(id).write_owned().await;
        LineGuard {
            locks: self,
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.lock().unwrap().len()
    }
}
