//! JSON-file store implementation.
//!
//! Same semantics as the in-memory store, with one addition: the whole state
//! is snapshotted to a JSON file after every mutation and read back at
//! startup. The snapshot is a single record (free counts, reservation
//! counter, and the owned collections) keyed by the file path.
//!
//! The mutex is held across the write so the on-disk record can never
//! interleave two mutations. Writes are small and local, so blocking the
//! executor for their duration is acceptable here. Note that this backend
//! still assumes a single process owns the file; it is not a cross-process
//! coordination mechanism.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::api::{
    AccessRecord, ParkingStatus, PlateAssignment, Reservation, ReservationId, SensorUpdate,
    SpotCategory, SpotOccupancy,
};
use crate::ledger::CapacityConfig;
use crate::store::repository::{
    PlateStore, ReservationStore, SensorStore, StoreResult,
};
use crate::store::state::{ParkingState, PersistedState};

/// JSON-file-backed store.
pub struct FileStore {
    state: Mutex<ParkingState>,
    path: PathBuf,
}

impl FileStore {
    /// Open a file store, restoring any previously persisted state.
    ///
    /// A missing file starts a fresh session; an unreadable one is logged and
    /// treated the same way rather than refusing to start.
    pub fn open(capacity: CapacityConfig, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match Self::load(&path) {
            Some(persisted) => {
                info!(path = %path.display(), "restored parking state from file");
                ParkingState::from_persisted(capacity, persisted)
            }
            None => ParkingState::new(capacity),
        };
        Self {
            state: Mutex::new(state),
            path,
        }
    }

    fn load(path: &Path) -> Option<PersistedState> {
        if !path.exists() {
            return None;
        }
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read state file, starting fresh");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(persisted) => Some(persisted),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not parse state file, starting fresh");
                None
            }
        }
    }

    /// Write the current snapshot to disk. Called with the state lock held.
    fn persist(&self, state: &ParkingState) -> StoreResult<()> {
        let snapshot = state.to_persisted();
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[async_trait]
impl ReservationStore for FileStore {
    async fn health_check(&self) -> StoreResult<bool> {
        // Usable as long as the target directory accepts writes.
        let state = self.state.lock();
        Ok(self.persist(&state).is_ok())
    }

    async fn status(&self) -> StoreResult<ParkingStatus> {
        Ok(self.state.lock().status())
    }

    async fn reserve(
        &self,
        category: SpotCategory,
        user_name: &str,
        attachment: Option<&str>,
    ) -> StoreResult<Reservation> {
        let mut state = self.state.lock();
        let reservation = state.reserve(category, user_name, attachment)?;
        self.persist(&state)?;
        Ok(reservation)
    }

    async fn cancel(&self, id: ReservationId) -> StoreResult<Reservation> {
        let mut state = self.state.lock();
        let cancelled = state.cancel(id)?;
        self.persist(&state)?;
        Ok(cancelled)
    }

    async fn list_reservations(&self) -> StoreResult<Vec<Reservation>> {
        Ok(self.state.lock().reservations())
    }

    async fn find_by_code(&self, code: &str) -> StoreResult<Option<Reservation>> {
        Ok(self.state.lock().find_by_code(code))
    }
}

#[async_trait]
impl PlateStore for FileStore {
    async fn list_plates(&self) -> StoreResult<Vec<PlateAssignment>> {
        Ok(self.state.lock().plates())
    }

    async fn upsert_plate(&self, spot: u32, plate: &str) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.upsert_plate(spot, plate)?;
        self.persist(&state)
    }

    async fn remove_plate(&self, spot: u32) -> StoreResult<bool> {
        let mut state = self.state.lock();
        let removed = state.remove_plate(spot);
        if removed {
            self.persist(&state)?;
        }
        Ok(removed)
    }

    async fn replace_plates(&self, plates: Vec<PlateAssignment>) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.replace_plates(plates)?;
        self.persist(&state)
    }

    async fn verify_plate(&self, plate: &str) -> StoreResult<(bool, Option<u32>)> {
        let mut state = self.state.lock();
        let outcome = state.verify_plate(plate);
        // The access log is part of the persisted record.
        self.persist(&state)?;
        Ok(outcome)
    }

    async fn recent_access(&self, limit: usize) -> StoreResult<Vec<AccessRecord>> {
        Ok(self.state.lock().recent_access(limit))
    }
}

#[async_trait]
impl SensorStore for FileStore {
    async fn record_report(&self, spot: u32, occupied: bool) -> StoreResult<SensorUpdate> {
        let mut state = self.state.lock();
        let update = state.record_report(spot, occupied)?;
        self.persist(&state)?;
        Ok(update)
    }

    async fn sensor_overview(&self) -> StoreResult<Vec<SpotOccupancy>> {
        Ok(self.state.lock().sensor_overview())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capacity() -> CapacityConfig {
        CapacityConfig::new(5, 1).unwrap()
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parking_data.json");

        {
            let store = FileStore::open(capacity(), &path);
            store.reserve(SpotCategory::Standard, "Ana", None).await.unwrap();
            store
                .reserve(SpotCategory::Restricted, "Vedad", None)
                .await
                .unwrap();
            store.upsert_plate(2, "SA-123-AB").await.unwrap();
        }

        let store = FileStore::open(capacity(), &path);
        let status = store.status().await.unwrap();
        assert_eq!(status.available_total, 3);
        assert_eq!(status.available_restricted, 0);
        assert_eq!(status.reserved_count, 2);
        assert_eq!(store.list_plates().await.unwrap().len(), 1);

        // The counter continues from the persisted value.
        let res = store.reserve(SpotCategory::Standard, "Mia", None).await.unwrap();
        assert_eq!(res.id.value(), 3);
    }

    #[tokio::test]
    async fn test_missing_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(capacity(), dir.path().join("nope.json"));
        let status = store.status().await.unwrap();
        assert_eq!(status.available_total, 5);
        assert_eq!(status.reserved_count, 0);
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parking_data.json");
        fs::write(&path, "{ not json").unwrap();

        let store = FileStore::open(capacity(), &path);
        assert_eq!(store.status().await.unwrap().available_total, 5);
    }

    #[tokio::test]
    async fn test_failed_reserve_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parking_data.json");

        let store = FileStore::open(CapacityConfig::new(1, 1).unwrap(), &path);
        store
            .reserve(SpotCategory::Restricted, "Ana", None)
            .await
            .unwrap();
        assert!(store.reserve(SpotCategory::Standard, "Mia", None).await.is_err());

        let reopened = FileStore::open(CapacityConfig::new(1, 1).unwrap(), &path);
        assert_eq!(reopened.status().await.unwrap().reserved_count, 1);
    }
}
