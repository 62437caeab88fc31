//! JSON-file line store.
//!
//! Each line lives in `line-{id}.json` under the data directory, next to
//! the station registry's `stations.json`. Saves go to a sibling `.tmp`
//! file which is then renamed over the original, so a reader never sees a
//! half-written record.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::domain::LineId;

use super::error::StoreError;
use super::{LineRecord, LineStore};

const PREFIX: &str = "line-";
const EXTENSION: &str = "json";

/// Name of the station registry file kept beside the line files.
pub const STATIONS_FILE: &str = "stations.json";

/// Replace `path` with `bytes` via a temporary sibling and a rename.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|e| StoreError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| StoreError::io(path, e))
}

/// Line store writing one JSON file per line.
#[derive(Clone)]
pub struct FileLineStore {
    dir: PathBuf,
    last_id: Arc<AtomicU64>,
}

impl FileLineStore {
    /// Open (creating if needed) a store rooted at `dir`.
    ///
    /// Id allocation resumes after the highest id already on disk.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::io(&dir, e))?;

        let store = Self {
            dir,
            last_id: Arc::new(AtomicU64::new(0)),
        };
        let highest = store.list_ids().await?.last().map_or(0, |id| id.0);
        store.last_id.store(highest, Ordering::SeqCst);

        debug!(dir = %store.dir.display(), highest, "opened line store");
        Ok(store)
    }

    /// Where the station registry belonging to these lines is kept.
    pub fn stations_path(&self) -> PathBuf {
        self.dir.join(STATIONS_FILE)
    }

    fn path_for(&self, id: LineId) -> PathBuf {
        self.dir.join(format!("{PREFIX}{}.{EXTENSION}", id.0))
    }
}

/// Parse `line-{id}.json` back into an id.
fn parse_file_name(name: &str) -> Option<LineId> {
    let stem = name.strip_prefix(PREFIX)?.strip_suffix(".json")?;
    stem.parse().ok().map(LineId)
}

impl LineStore for FileLineStore {
    async fn next_id(&self) -> Result<LineId, StoreError> {
        Ok(LineId(self.last_id.fetch_add(1, Ordering::SeqCst) + 1))
    }

    async fn load(&self, id: LineId) -> Result<Option<LineRecord>, StoreError> {
        let path = self.path_for(id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn save(&self, record: &LineRecord) -> Result<(), StoreError> {
        let path = self.path_for(record.id);
        let json = serde_json::to_vec_pretty(record)?;
        write_atomic(&path, &json).await?;

        debug!(line = %record.id, path = %path.display(), "saved line");
        Ok(())
    }

    async fn delete(&self, id: LineId) -> Result<bool, StoreError> {
        let path = self.path_for(id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    async fn list_ids(&self) -> Result<Vec<LineId>, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| StoreError::io(&self.dir, e))?;

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&self.dir, e))?
        {
            let name = entry.file_name();
            match name.to_str().and_then(parse_file_name) {
                Some(id) => ids.push(id),
                None => {
                    let name_str = name.to_string_lossy();
                    if name_str != STATIONS_FILE && !name_str.ends_with(".tmp") {
                        warn!(file = ?name, "ignoring unrecognised file in line store");
                    }
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Distance, Line, LineInfo, StationId, StationRef};

    fn record(id: LineId, distance: i64) -> LineRecord {
        let line = Line::new(
            id,
            StationRef::new(StationId(1), "정자역"),
            StationRef::new(StationId(2), "미금역"),
            Distance::new(distance).unwrap(),
        )
        .unwrap();
        LineRecord::new(&line, LineInfo::new("신분당선", "bg-red-600"))
    }

    #[test]
    fn file_names() {
        assert_eq!(parse_file_name("line-12.json"), Some(LineId(12)));
        assert_eq!(parse_file_name("line-12.json.tmp"), None);
        assert_eq!(parse_file_name("line-x.json"), None);
        assert_eq!(parse_file_name("notes.txt"), None);
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLineStore::open(dir.path()).await.unwrap();

        let id = store.next_id().await.unwrap();
        let saved = record(id, 10);
        store.save(&saved).await.unwrap();

        assert_eq!(store.load(id).await.unwrap(), Some(saved));
        assert_eq!(store.load(LineId(99)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_replaces_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLineStore::open(dir.path()).await.unwrap();

        store.save(&record(LineId(1), 10)).await.unwrap();
        let replacement = record(LineId(1), 25);
        store.save(&replacement).await.unwrap();

        assert_eq!(store.load(LineId(1)).await.unwrap(), Some(replacement));

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["line-1.json".to_string()]);
    }

    #[tokio::test]
    async fn reopen_resumes_id_allocation() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileLineStore::open(dir.path()).await.unwrap();
            store.save(&record(LineId(3), 10)).await.unwrap();
            store.save(&record(LineId(1), 10)).await.unwrap();
        }

        let store = FileLineStore::open(dir.path()).await.unwrap();
        assert_eq!(store.list_ids().await.unwrap(), vec![LineId(1), LineId(3)]);
        assert_eq!(store.next_id().await.unwrap(), LineId(4));
    }

    #[tokio::test]
    async fn delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLineStore::open(dir.path()).await.unwrap();
        store.save(&record(LineId(1), 10)).await.unwrap();

        assert!(store.delete(LineId(1)).await.unwrap());
        assert!(!store.delete(LineId(1)).await.unwrap());
        assert_eq!(store.load(LineId(1)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn open_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data").join("lines");
        let store = FileLineStore::open(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.stations_path(), nested.join(STATIONS_FILE));
    }

    #[tokio::test]
    async fn stations_file_is_not_a_line() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLineStore::open(dir.path()).await.unwrap();
        write_atomic(&store.stations_path(), b"{}").await.unwrap();
        store.save(&record(LineId(2), 10)).await.unwrap();

        assert_eq!(store.list_ids().await.unwrap(), vec![LineId(2)]);
        assert!(!dir.path().join("stations.json.tmp").exists());
    }

    #[tokio::test]
    async fn garbage_file_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("line-5.json"), b"not json").unwrap();
        let store = FileLineStore::open(dir.path()).await.unwrap();

        assert!(matches!(
            store.load(LineId(5)).await,
            Err(StoreError::Json(_))
        ));
    }
}
