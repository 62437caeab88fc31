//! In-memory line store.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use crate::domain::LineId;

use super::error::StoreError;
use super::{LineRecord, LineStore};

/// Line store backed by a map. Nothing survives a restart.
#[derive(Clone, Default)]
pub struct MemoryLineStore {
    lines: Arc<RwLock<BTreeMap<LineId, LineRecord>>>,
    last_id: Arc<AtomicU64>,
}

impl MemoryLineStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LineStore for MemoryLineStore {
    async fn next_id(&self) -> Result<LineId, StoreError> {
        Ok(LineId(self.last_id.fetch_add(1, Ordering::Relaxed) + 1))
    }

    async fn load(&self, id: LineId) -> Result<Option<LineRecord>, StoreError> {
        Ok(self.lines.read().await.get(&id).cloned())
    }

    async fn save(&self, record: &LineRecord) -> Result<(), StoreError> {
        self.lines.write().await.insert(record.id, record.clone());
        Ok(())
    }

    async fn delete(&self, id: LineId) -> Result<bool, StoreError> {
        Ok(self.lines.write().await.remove(&id).is_some())
    }

    async fn list_ids(&self) -> Result<Vec<LineId>, StoreError> {
        Ok(self.lines.read().await.keys().copied().collect())
    }
}
