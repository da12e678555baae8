//! Store trait for abstracting parking-state persistence.
//!
//! These traits define the interface for every operation that touches the
//! shared occupancy state, allowing different backends (in-memory, JSON
//! file) to be swapped via dependency injection.

use async_trait::async_trait;

use crate::api::{
    AccessRecord, ParkingStatus, PlateAssignment, Reservation, ReservationId, SensorUpdate,
    SpotCategory, SpotOccupancy,
};
use crate::ledger::LedgerError;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Admission control rejected the reservation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    ConfigurationError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<String> for StoreError {
    fn from(s: String) -> Self {
        StoreError::InternalError(s)
    }
}

impl From<&str> for StoreError {
    fn from(s: &str) -> Self {
        StoreError::InternalError(s.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Reservation operations: the ledger plus its record book.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`. Every implementation serializes
/// reserve/cancel behind a single lock so the admission-control check and the
/// count mutation cannot interleave with another caller's.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Check that the backing store is usable.
    async fn health_check(&self) -> StoreResult<bool>;

    /// Read-only aggregate occupancy snapshot.
    async fn status(&self) -> StoreResult<ParkingStatus>;

    /// Claim one free spot of the given category for `user_name`.
    ///
    /// # Arguments
    /// * `attachment` - optional opaque reference carried on the record
    ///
    /// # Returns
    /// * `Ok(Reservation)` - the minted record, including id and QR value
    /// * `Err(StoreError::Ledger)` - when admission control rejects the claim
    async fn reserve(
        &self,
        category: SpotCategory,
        user_name: &str,
        attachment: Option<&str>,
    ) -> StoreResult<Reservation>;

    /// Cancel a reservation by id, returning its spot to the free pool.
    ///
    /// # Returns
    /// * `Ok(Reservation)` - the cancelled record
    /// * `Err(StoreError::NotFound)` - when no such reservation exists
    async fn cancel(&self, id: ReservationId) -> StoreResult<Reservation>;

    /// All active reservations, oldest first.
    async fn list_reservations(&self) -> StoreResult<Vec<Reservation>>;

    /// Find the reservation matching a scanned code, if any.
    ///
    /// Matching is forgiving about scanner noise: exact QR value first, then
    /// a numeric id in the trailing path segment of a URL-shaped code, then a
    /// QR value embedded in surrounding text.
    async fn find_by_code(&self, code: &str) -> StoreResult<Option<Reservation>>;
}

/// Plate-registry operations and their audit trail.
#[async_trait]
pub trait PlateStore: Send + Sync {
    /// All plate assignments, ordered by spot.
    async fn list_plates(&self) -> StoreResult<Vec<PlateAssignment>>;

    /// Assign `plate` to `spot`, replacing any existing assignment.
    async fn upsert_plate(&self, spot: u32, plate: &str) -> StoreResult<()>;

    /// Remove the assignment for `spot`. Returns whether one existed.
    async fn remove_plate(&self, spot: u32) -> StoreResult<bool>;

    /// Replace the whole registry in one operation.
    async fn replace_plates(&self, plates: Vec<PlateAssignment>) -> StoreResult<()>;

    /// Check a plate against the registry and log the attempt.
    ///
    /// # Returns
    /// `(granted, spot)` - whether access was granted and, when it was, the
    /// spot the plate is registered to.
    async fn verify_plate(&self, plate: &str) -> StoreResult<(bool, Option<u32>)>;

    /// The most recent access-log entries, newest first.
    async fn recent_access(&self, limit: usize) -> StoreResult<Vec<AccessRecord>>;
}

/// Sensor-derived occupancy, kept separately from reservation bookkeeping.
#[async_trait]
pub trait SensorStore: Send + Sync {
    /// Apply one occupancy report for a physical spot.
    ///
    /// # Returns
    /// * `Ok(SensorUpdate)` - the applied state, with `changed` set when the
    ///   report flipped the previously recorded state
    /// * `Err(StoreError::InvalidInput)` - when the spot number is out of range
    async fn record_report(&self, spot: u32, occupied: bool) -> StoreResult<SensorUpdate>;

    /// Last known occupancy of every physical spot, ordered by spot.
    async fn sensor_overview(&self) -> StoreResult<Vec<SpotOccupancy>>;
}

/// Convenience trait combining every store capability.
pub trait FullStore: ReservationStore + PlateStore + SensorStore {}

impl<T: ReservationStore + PlateStore + SensorStore> FullStore for T {}
