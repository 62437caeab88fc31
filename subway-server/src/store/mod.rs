//! Line persistence.
//!
//! A store only ever sees whole [`LineRecord`]s: the service loads one,
//! applies a mutation in memory, and saves the replacement. Exclusive
//! access per line is the caller's job (see `service`).

mod error;
mod file;
mod memory;
mod record;

use std::future::Future;

use crate::domain::LineId;

pub use error::StoreError;
pub use file::{FileLineStore, STATIONS_FILE};
pub(crate) use file::write_atomic;
pub use memory::MemoryLineStore;
pub use record::LineRecord;

/// Load/replace storage for lines.
pub trait LineStore: Send + Sync {
    /// Reserve a fresh line id.
    fn next_id(&self) -> impl Future<Output = Result<LineId, StoreError>> + Send;

    /// Load a line, or `None` if it does not exist.
    fn load(&self, id: LineId)
    -> impl Future<Output = Result<Option<LineRecord>, StoreError>> + Send;

    /// Atomically replace (or create) a line.
    fn save(&self, record: &LineRecord) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete a line. Returns whether it existed.
    fn delete(&self, id: LineId) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Ids of all stored lines, ascending.
    fn list_ids(&self) -> impl Future<Output = Result<Vec<LineId>, StoreError>> + Send;
}

/// Either store backend, chosen at startup.
#[derive(Clone)]
pub enum AnyLineStore {
    Memory(MemoryLineStore),
    File(FileLineStore),
}

impl LineStore for AnyLineStore {
    async fn next_id(&self) -> Result<LineId, StoreError> {
        match self {
            AnyLineStore::Memory(s) => s.next_id().await,
            AnyLineStore::File(s) => s.next_id().await,
        }
    }

    async fn load(&self, id: LineId) -> Result<Option<LineRecord>, StoreError> {
        match self {
            AnyLineStore::Memory(s) => s.load(id).await,
            AnyLineStore::File(s) => s.load(id).await,
        }
    }

    async fn save(&self, record: &LineRecord) -> Result<(), StoreError> {
        match self {
            AnyLineStore::Memory(s) => s.save(record).await,
            AnyLineStore::File(s) => s.save(record).await,
        }
    }

    async fn delete(&self, id: LineId) -> Result<bool, StoreError> {
        match self {
            AnyLineStore::Memory(s) => s.delete(id).await,
            AnyLineStore::File(s) => s.delete(id).await,
        }
    }

    async fn list_ids(&self) -> Result<Vec<LineId>, StoreError> {
        match self {
            AnyLineStore::Memory(s) => s.list_ids().await,
            AnyLineStore::File(s) => s.list_ids().await,
        }
    }
}
