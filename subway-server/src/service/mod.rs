//! Line operations over a station directory and a line store.
//!
//! Every mutation runs as load, modify in memory, then save, under the
//! line's write lock. A rejected change is never saved, so the stored chain
//! is always one that passed every check.
//!
//! Changes that look across lines (line names, station renames) also hold
//! the catalog lock, always taken before any line lock.

mod error;
mod locks;

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::cache::{CacheConfig, SnapshotCache};
use crate::domain::{
    ChainError, Distance, Line, LineId, LineInfo, LineSnapshot, StationId, StationRef,
};
use crate::stations::{StationDirectory, StationError};
use crate::store::{LineRecord, LineStore};

pub use error::ServiceError;
use locks::LineLocks;

/// The line service.
pub struct LineService<S, P> {
    stations: S,
    store: P,
    cache: SnapshotCache,
    locks: LineLocks,
    catalog: Mutex<()>,
}

impl<S: StationDirectory, P: LineStore> LineService<S, P> {
    pub fn new(stations: S, store: P, cache_config: &CacheConfig) -> Self {
        Self {
            stations,
            store,
            cache: SnapshotCache::new(cache_config),
            locks: LineLocks::default(),
            catalog: Mutex::new(()),
        }
    }

    async fn station(&self, id: StationId) -> Result<StationRef, ServiceError> {
        self.stations
            .find(id)
            .await
            .ok_or(ServiceError::StationNotFound(id))
    }

    async fn load(&self, id: LineId) -> Result<(Line, LineInfo), ServiceError> {
        let record = self
            .store
            .load(id)
            .await?
            .ok_or(ServiceError::LineNotFound(id))?;
        let line = record.to_line()?;
        Ok((line, record.info))
    }

    async fn commit(&self, line: &Line, info: LineInfo) -> Result<Arc<LineSnapshot>, ServiceError> {
        let record = LineRecord::new(line, info);
        self.store.save(&record).await?;
        let snapshot = Arc::new(line.snapshot(&record.info));
        self.cache.insert(snapshot.clone()).await;
        Ok(snapshot)
    }

    /// Fail if a line other than `except` is already called `name`.
    async fn ensure_name_free(&self, name: &str, except: Option<LineId>) -> Result<(), ServiceError> {
        for line in self.list_lines().await? {
            if line.info.name == name && Some(line.id) != except {
                return Err(ServiceError::DuplicateLineName(name.to_string()));
            }
        }
        Ok(())
    }

    /// Create a line with a single segment from `up` to `down`.
    pub async fn create_line(
        &self,
        name: &str,
        color: &str,
        up: StationId,
        down: StationId,
        distance: i64,
    ) -> Result<Arc<LineSnapshot>, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::EmptyLineName);
        }
        let distance = Distance::new(distance).map_err(ChainError::from)?;

        let _catalog = self.catalog.lock().await;
        self.ensure_name_free(name, None).await?;
        let up = self.station(up).await?;
        let down = self.station(down).await?;

        let id = self.store.next_id().await?;
        let _guard = self.locks.write(id).await;
        let line = Line::new(id, up, down, distance)?;
        let snapshot = self.commit(&line, LineInfo::new(name, color)).await?;

        info!(line = %id, name, "created line");
        Ok(snapshot)
    }

    /// Add a station by inserting the segment `up -> down`.
    pub async fn add_station(
        &self,
        line_id: LineId,
        up: StationId,
        down: StationId,
        distance: i64,
    ) -> Result<Arc<LineSnapshot>, ServiceError> {
        let distance = Distance::new(distance).map_err(ChainError::from)?;

        // Resolved under the lock so a concurrent rename cannot be missed
        let _guard = self.locks.write(line_id).await;
        let up = self.station(up).await?;
        let down = self.station(down).await?;
        let (mut line, mut info) = self.load(line_id).await?;
        let placement = line.add_station(up, down, distance)?;
        info.touch();
        let snapshot = self.commit(&line, info).await?;

        info!(
            line = %line_id,
            ?placement,
            total = %snapshot.total_distance,
            "added segment"
        );
        Ok(snapshot)
    }

    /// Remove a station from a line.
    pub async fn remove_station(
        &self,
        line_id: LineId,
        station: StationId,
    ) -> Result<Arc<LineSnapshot>, ServiceError> {
        let _guard = self.locks.write(line_id).await;
        let (mut line, mut info) = self.load(line_id).await?;
        let removal = line.remove_station(station)?;
        info.touch();
        let snapshot = self.commit(&line, info).await?;

        info!(
            line = %line_id,
            station = %station,
            ?removal,
            total = %snapshot.total_distance,
            "removed station"
        );
        Ok(snapshot)
    }

    /// Current state of a line.
    pub async fn snapshot(&self, line_id: LineId) -> Result<Arc<LineSnapshot>, ServiceError> {
        let _guard = self.locks.read(line_id).await;
        if let Some(cached) = self.cache.get(line_id).await {
            return Ok(cached);
        }

        debug!(line = %line_id, "snapshot cache miss");
        let (line, info) = self.load(line_id).await?;
        let snapshot = Arc::new(line.snapshot(&info));
        self.cache.insert(snapshot.clone()).await;
        Ok(snapshot)
    }

    /// All lines, ordered by id.
    pub async fn list_lines(&self) -> Result<Vec<Arc<LineSnapshot>>, ServiceError> {
        let mut lines = Vec::new();
        for id in self.store.list_ids().await? {
            match self.snapshot(id).await {
                Ok(snapshot) => lines.push(snapshot),
                // Deleted between listing and loading
                Err(ServiceError::LineNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(lines)
    }

    /// Change a line's name or color. Empty values are ignored.
    pub async fn update_line(
        &self,
        line_id: LineId,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<Arc<LineSnapshot>, ServiceError> {
        let name = name.map(str::trim).filter(|n| !n.is_empty());

        let _catalog = self.catalog.lock().await;
        if let Some(name) = name {
            self.ensure_name_free(name, Some(line_id)).await?;
        }

        let _guard = self.locks.write(line_id).await;
        let (line, mut info) = self.load(line_id).await?;
        info.update(name, color.map(str::trim));
        let snapshot = self.commit(&line, info).await?;

        info!(line = %line_id, name = %snapshot.info.name, "updated line");
        Ok(snapshot)
    }

    /// Delete a line.
    pub async fn delete_line(&self, line_id: LineId) -> Result<(), ServiceError> {
        let _guard = self.locks.write(line_id).await;
        if !self.store.delete(line_id).await? {
            return Err(ServiceError::LineNotFound(line_id));
        }
        self.cache.invalidate(line_id).await;

        info!(line = %line_id, "deleted line");
        Ok(())
    }

    /// Run `rename` against the station registry, then carry the new name
    /// into every line that contains the station.
    ///
    /// Line timestamps are left alone; the lines' topology did not change.
    pub async fn rename_station(
        &self,
        rename: impl Future<Output = Result<StationRef, StationError>>,
    ) -> Result<StationRef, ServiceError> {
        let _catalog = self.catalog.lock().await;
        let station = rename.await?;

        let mut updated = 0;
        for id in self.store.list_ids().await? {
            let _guard = self.locks.write(id).await;
            let (mut line, info) = match self.load(id).await {
                Ok(loaded) => loaded,
                Err(ServiceError::LineNotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            if line.rename_station(&station) {
                self.commit(&line, info).await?;
                updated += 1;
            }
        }

        info!(station = %station.id(), name = station.name(), lines = updated, "renamed station");
        Ok(station)
    }

    /// Every station referenced by a stored line, ordered by id.
    pub async fn referenced_stations(&self) -> Result<Vec<StationRef>, ServiceError> {
        let mut stations = BTreeMap::new();
        for line in self.list_lines().await? {
            for station in &line.stations {
                stations
                    .entry(station.id())
                    .or_insert_with(|| station.clone());
            }
        }
        Ok(stations.into_values().collect())
    }

    /// Fail with [`ServiceError::StationInUse`] if any line contains `station`.
    pub async fn ensure_station_unused(&self, station: StationId) -> Result<(), ServiceError> {
        for line in self.list_lines().await? {
            if line.has_station(station) {
                return Err(ServiceError::StationInUse {
                    station,
                    line: line.id,
                });
            }
        }
        Ok(())
    }
}
