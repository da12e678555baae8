//! In-memory local store implementation.
//!
//! All state lives in a single [`ParkingState`] behind one mutex, providing
//! fast, deterministic, and isolated execution for unit tests and for
//! servers whose authority is the process itself. The mutex is the mutation
//! queue: no reservation check can interleave with another caller's count
//! update.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::api::{
    AccessRecord, ParkingStatus, PlateAssignment, Reservation, ReservationId, SensorUpdate,
    SpotCategory, SpotOccupancy,
};
use crate::ledger::CapacityConfig;
use crate::store::repository::{
    PlateStore, ReservationStore, SensorStore, StoreError, StoreResult,
};
use crate::store::state::ParkingState;

/// In-memory store.
///
/// Cloning is cheap and shares the underlying state, which makes it easy to
/// hand the same authority to a router and a test at once.
#[derive(Clone)]
pub struct LocalStore {
    state: Arc<Mutex<ParkingState>>,
    healthy: Arc<AtomicBool>,
}

impl LocalStore {
    /// Create a new store with every spot free.
    pub fn new(capacity: CapacityConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(ParkingState::new(capacity))),
            healthy: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Flip the health flag, for exercising failure paths in tests.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    fn check_health(&self) -> StoreResult<()> {
        if !self.healthy.load(Ordering::SeqCst) {
            return Err(StoreError::InternalError("store is not healthy".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ReservationStore for LocalStore {
    async fn health_check(&self) -> StoreResult<bool> {
        Ok(self.healthy.load(Ordering::SeqCst))
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
        self.check_health()?;
        self.state.lock().reserve(category, user_name, attachment)
    }

    async fn cancel(&self, id: ReservationId) -> StoreResult<Reservation> {
        self.check_health()?;
        self.state.lock().cancel(id)
    }

    async fn list_reservations(&self) -> StoreResult<Vec<Reservation>> {
        Ok(self.state.lock().reservations())
    }

    async fn find_by_code(&self, code: &str) -> StoreResult<Option<Reservation>> {
        Ok(self.state.lock().find_by_code(code))
    }
}

#[async_trait]
impl PlateStore for LocalStore {
    async fn list_plates(&self) -> StoreResult<Vec<PlateAssignment>> {
        Ok(self.state.lock().plates())
    }

    async fn upsert_plate(&self, spot: u32, plate: &str) -> StoreResult<()> {
        self.check_health()?;
        self.state.lock().upsert_plate(spot, plate)
    }

    async fn remove_plate(&self, spot: u32) -> StoreResult<bool> {
        self.check_health()?;
        Ok(self.state.lock().remove_plate(spot))
    }

    async fn replace_plates(&self, plates: Vec<PlateAssignment>) -> StoreResult<()> {
        self.check_health()?;
        self.state.lock().replace_plates(plates)
    }

    async fn verify_plate(&self, plate: &str) -> StoreResult<(bool, Option<u32>)> {
        self.check_health()?;
        Ok(self.state.lock().verify_plate(plate))
    }

    async fn recent_access(&self, limit: usize) -> StoreResult<Vec<AccessRecord>> {
        Ok(self.state.lock().recent_access(limit))
    }
}

#[async_trait]
impl SensorStore for LocalStore {
    async fn record_report(&self, spot: u32, occupied: bool) -> StoreResult<SensorUpdate> {
        self.check_health()?;
        self.state.lock().record_report(spot, occupied)
    }

    async fn sensor_overview(&self) -> StoreResult<Vec<SpotOccupancy>> {
        Ok(self.state.lock().sensor_overview())
    }
}
