//! Station lookup and registration.
//!
//! The registry lives in memory and, when opened on a file, rewrites that
//! file after every change so ids stay stable across restarts.

use std::collections::BTreeMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::{StationId, StationRef};
use crate::store::{StoreError, write_atomic};

use super::error::StationError;

/// Resolves station ids to station references.
pub trait StationDirectory: Send + Sync {
    /// Look up a station by id.
    fn find(&self, id: StationId) -> impl Future<Output = Option<StationRef>> + Send;
}

#[derive(Debug, Clone, Default)]
struct Inner {
    stations: BTreeMap<StationId, StationRef>,
    last_id: u64,
}

impl Inner {
    fn name_taken(&self, name: &str, except: Option<StationId>) -> bool {
        self.stations
            .values()
            .any(|s| s.name() == name && Some(s.id()) != except)
    }
}

/// On-disk form of the registry.
#[derive(Serialize, Deserialize)]
struct RegistryFile {
    last_id: u64,
    stations: Vec<StationRef>,
}

impl From<RegistryFile> for Inner {
    fn from(file: RegistryFile) -> Self {
        let highest = file.stations.iter().map(|s| s.id().0).max().unwrap_or(0);
        Inner {
            last_id: file.last_id.max(highest),
            stations: file.stations.into_iter().map(|s| (s.id(), s)).collect(),
        }
    }
}

fn validate_name(name: &str) -> Result<&str, StationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StationError::EmptyName);
    }
    Ok(name)
}

/// Thread-safe station registry.
///
/// Ids are assigned sequentially starting at 1 and never reused.
#[derive(Clone, Default)]
pub struct StationRegistry {
    inner: Arc<RwLock<Inner>>,
    path: Option<Arc<PathBuf>>,
}

impl StationRegistry {
    /// A registry that is never written anywhere.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a registry backed by the JSON file at `path`.
    ///
    /// A missing file gives an empty registry; it is created on the first
    /// change.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StationError> {
        let path = path.into();
        let inner = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let file: RegistryFile =
                    serde_json::from_slice(&bytes).map_err(StoreError::from)?;
                Inner::from(file)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Inner::default(),
            Err(e) => return Err(StoreError::io(&path, e).into()),
        };

        debug!(
            path = %path.display(),
            stations = inner.stations.len(),
            last_id = inner.last_id,
            "opened station registry"
        );
        Ok(Self {
            inner: Arc::new(RwLock::new(inner)),
            path: Some(Arc::new(path)),
        })
    }

    /// Write `next` to the backing file, then make it current.
    async fn commit(&self, current: &mut Inner, next: Inner) -> Result<(), StationError> {
        if let Some(path) = &self.path {
            let file = RegistryFile {
                last_id: next.last_id,
                stations: next.stations.values().cloned().collect(),
            };
            let json = serde_json::to_vec_pretty(&file).map_err(StoreError::from)?;
            write_atomic(path, &json).await?;
        }
        *current = next;
        Ok(())
    }

    /// Register a new station.
    pub async fn create(&self, name: &str) -> Result<StationRef, StationError> {
        let name = validate_name(name)?;

        let mut guard = self.inner.write().await;
        if guard.name_taken(name, None) {
            return Err(StationError::DuplicateName(name.to_string()));
        }

        let mut next = guard.clone();
        next.last_id += 1;
        let station = StationRef::new(StationId(next.last_id), name);
        next.stations.insert(station.id(), station.clone());
        self.commit(&mut guard, next).await?;
        Ok(station)
    }

    /// Get a station, failing if it does not exist.
    pub async fn get(&self, id: StationId) -> Result<StationRef, StationError> {
        let guard = self.inner.read().await;
        guard
            .stations
            .get(&id)
            .cloned()
            .ok_or(StationError::NotFound(id))
    }

    /// All stations, ordered by id.
    pub async fn list(&self) -> Vec<StationRef> {
        let guard = self.inner.read().await;
        guard.stations.values().cloned().collect()
    }

    /// Give a station a new name.
    pub async fn rename(&self, id: StationId, name: &str) -> Result<StationRef, StationError> {
        let name = validate_name(name)?;

        let mut guard = self.inner.write().await;
        if !guard.stations.contains_key(&id) {
            return Err(StationError::NotFound(id));
        }
        if guard.name_taken(name, Some(id)) {
            return Err(StationError::DuplicateName(name.to_string()));
        }

        let mut next = guard.clone();
        let station = StationRef::new(id, name);
        next.stations.insert(id, station.clone());
        self.commit(&mut guard, next).await?;
        Ok(station)
    }

    /// Remove a station from the registry.
    pub async fn remove(&self, id: StationId) -> Result<StationRef, StationError> {
        let mut guard = self.inner.write().await;
        let mut next = guard.clone();
        let removed = next
            .stations
            .remove(&id)
            .ok_or(StationError::NotFound(id))?;
        self.commit(&mut guard, next).await?;
        Ok(removed)
    }

    /// Register stations already referenced elsewhere (by stored lines)
    /// that the registry does not know, keeping their ids.
    ///
    /// Id allocation continues after the highest id seen. Returns how many
    /// stations were added.
    pub async fn restore(
        &self,
        stations: impl IntoIterator<Item = StationRef>,
    ) -> Result<usize, StationError> {
        let mut guard = self.inner.write().await;
        let mut next = guard.clone();
        let mut added = 0;
        for station in stations {
            next.last_id = next.last_id.max(station.id().0);
            if !next.stations.contains_key(&station.id()) {
                next.stations.insert(station.id(), station);
                added += 1;
            }
        }

        if added > 0 || next.last_id != guard.last_id {
            self.commit(&mut guard, next).await?;
        }
        if added > 0 {
            info!(added, "restored stations referenced by stored lines");
        }
        Ok(added)
    }

    /// Get the number of registered stations.
    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.stations.len()
    }

    /// Check if no stations are registered.
    pub async fn is_empty(&self) -> bool {
        let guard = self.inner.read().await;
        guard.stations.is_empty()
    }
}

impl StationDirectory for StationRegistry {
    async fn find(&self, id: StationId) -> Option<StationRef> {
        self.get(id).await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let stations = StationRegistry::new();
        let a = stations.create("정자역").await.unwrap();
        let b = stations.create("미금역").await.unwrap();

        assert_eq!(a.id(), StationId(1));
        assert_eq!(b.id(), StationId(2));
        assert_eq!(stations.len().await, 2);
    }

    #[tokio::test]
    async fn create_rejects_empty_and_duplicate_names() {
        let stations = StationRegistry::new();
        assert!(matches!(
            stations.create("  ").await,
            Err(StationError::EmptyName)
        ));

        stations.create("판교역").await.unwrap();
        assert!(matches!(
            stations.create("판교역").await,
            Err(StationError::DuplicateName(name)) if name == "판교역"
        ));
        assert_eq!(stations.len().await, 1);
    }

    #[tokio::test]
    async fn find_and_remove() {
        let stations = StationRegistry::new();
        let a = stations.create("동천역").await.unwrap();

        assert_eq!(stations.find(a.id()).await, Some(a.clone()));
        assert_eq!(stations.remove(a.id()).await.unwrap(), a);
        assert_eq!(stations.find(a.id()).await, None);
        assert!(matches!(
            stations.remove(a.id()).await,
            Err(StationError::NotFound(id)) if id == a.id()
        ));
        assert!(stations.is_empty().await);
    }

    #[tokio::test]
    async fn ids_not_reused_after_removal() {
        let stations = StationRegistry::new();
        let a = stations.create("성복역").await.unwrap();
        stations.remove(a.id()).await.unwrap();
        let b = stations.create("성복역").await.unwrap();
        assert_eq!(b.id(), StationId(2));
    }

    #[tokio::test]
    async fn list_ordered_by_id() {
        let stations = StationRegistry::new();
        for name in ["c", "a", "b"] {
            stations.create(name).await.unwrap();
        }
        let names: Vec<String> = stations
            .list()
            .await
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn rename_keeps_id() {
        let stations = StationRegistry::new();
        let a = stations.create("정자역").await.unwrap();
        stations.create("미금역").await.unwrap();

        let renamed = stations.rename(a.id(), " 신정자역 ").await.unwrap();
        assert_eq!(renamed.id(), a.id());
        assert_eq!(renamed.name(), "신정자역");
        assert_eq!(stations.get(a.id()).await.unwrap().name(), "신정자역");

        // Renaming to its own name is fine, taking another's is not
        assert!(stations.rename(a.id(), "신정자역").await.is_ok());
        assert!(matches!(
            stations.rename(a.id(), "미금역").await,
            Err(StationError::DuplicateName(_))
        ));
        assert!(matches!(
            stations.rename(StationId(9), "동천역").await,
            Err(StationError::NotFound(StationId(9)))
        ));
        assert!(matches!(
            stations.rename(a.id(), "").await,
            Err(StationError::EmptyName)
        ));
    }

    #[tokio::test]
    async fn reopened_registry_continues_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stations.json");
        {
            let stations = StationRegistry::open(&path).await.unwrap();
            assert!(stations.is_empty().await);
            stations.create("정자역").await.unwrap();
            let b = stations.create("미금역").await.unwrap();
            stations.create("판교역").await.unwrap();
            stations.remove(b.id()).await.unwrap();
        }

        let stations = StationRegistry::open(&path).await.unwrap();
        let names: Vec<String> = stations
            .list()
            .await
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["정자역", "판교역"]);
        assert_eq!(stations.create("강남역").await.unwrap().id(), StationId(4));
        assert!(!dir.path().join("stations.json.tmp").exists());
    }

    #[tokio::test]
    async fn restore_adopts_unknown_stations() {
        let stations = StationRegistry::new();
        stations.create("정자역").await.unwrap();

        let added = stations
            .restore([
                StationRef::new(StationId(1), "정자역"),
                StationRef::new(StationId(7), "판교역"),
            ])
            .await
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(stations.get(StationId(7)).await.unwrap().name(), "판교역");
        assert_eq!(stations.create("강남역").await.unwrap().id(), StationId(8));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stations.json");
        std::fs::write(&path, b"[").unwrap();

        assert!(matches!(
            StationRegistry::open(&path).await,
            Err(StationError::Store(StoreError::Json(_)))
        ));
    }
}
