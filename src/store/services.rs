//! High-level service layer over the store traits.
//!
//! Repository-agnostic business logic that works with any implementation of
//! the store traits: input validation, logging, and the small policy
//! decisions that must stay consistent regardless of the backend. Handlers
//! and binaries call these functions instead of the traits directly.

use tracing::{info, warn};

use crate::api::{
    AccessRecord, ParkingStatus, PlateAssignment, Reservation, ReservationId, SensorUpdate,
    SpotCategory, SpotOccupancy, SpotState,
};
use crate::store::repository::{FullStore, StoreError, StoreResult};

/// Check that the backing store is usable.
pub async fn health_check<S: FullStore + ?Sized>(store: &S) -> StoreResult<bool> {
    store.health_check().await
}

/// Read-only aggregate occupancy snapshot.
pub async fn get_status<S: FullStore + ?Sized>(store: &S) -> StoreResult<ParkingStatus> {
    store.status().await
}

/// Reserve one spot of `category` for the named user.
///
/// The identifying token is required: a missing or blank name is rejected
/// with `InvalidInput` before the ledger is consulted. Admission-control
/// failures are terminal for this attempt; the caller resurfaces them as a
/// rejection message, no retry.
pub async fn reserve_spot<S: FullStore + ?Sized>(
    store: &S,
    category: SpotCategory,
    user_name: Option<&str>,
    attachment: Option<&str>,
) -> StoreResult<Reservation> {
    let user_name = user_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| StoreError::InvalidInput("user name is required".into()))?;

    let result = store.reserve(category, user_name, attachment).await;
    match &result {
        Ok(reservation) => info!(
            id = reservation.id.value(),
            category = %category,
            "reservation issued"
        ),
        Err(e) => warn!(category = %category, error = %e, "reservation rejected"),
    }
    result
}

/// Cancel a reservation by id.
pub async fn cancel_reservation<S: FullStore + ?Sized>(
    store: &S,
    id: ReservationId,
) -> StoreResult<Reservation> {
    let cancelled = store.cancel(id).await?;
    info!(id = id.value(), "reservation cancelled");
    Ok(cancelled)
}

/// All active reservations, oldest first.
pub async fn list_reservations<S: FullStore + ?Sized>(
    store: &S,
) -> StoreResult<Vec<Reservation>> {
    store.list_reservations().await
}

/// Resolve a scanned code to its reservation, if any.
pub async fn verify_code<S: FullStore + ?Sized>(
    store: &S,
    code: Option<&str>,
) -> StoreResult<Option<Reservation>> {
    let code = code
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .ok_or_else(|| StoreError::InvalidInput("code is required".into()))?;
    store.find_by_code(code).await
}

// ==================== Plates ====================

/// All plate assignments, ordered by spot.
pub async fn list_plates<S: FullStore + ?Sized>(store: &S) -> StoreResult<Vec<PlateAssignment>> {
    store.list_plates().await
}

/// Assign a plate to a spot, replacing any existing assignment.
pub async fn set_plate<S: FullStore + ?Sized>(
    store: &S,
    spot: u32,
    plate: Option<&str>,
) -> StoreResult<()> {
    let plate = plate
        .map(str::trim)
        .filter(|plate| !plate.is_empty())
        .ok_or_else(|| StoreError::InvalidInput("plate is required".into()))?;
    store.upsert_plate(spot, plate).await?;
    info!(spot, plate, "plate assigned");
    Ok(())
}

/// Remove the plate assignment for a spot. Returns whether one existed.
pub async fn remove_plate<S: FullStore + ?Sized>(store: &S, spot: u32) -> StoreResult<bool> {
    store.remove_plate(spot).await
}

/// Replace the whole plate registry.
pub async fn replace_plates<S: FullStore + ?Sized>(
    store: &S,
    plates: Vec<PlateAssignment>,
) -> StoreResult<()> {
    let count = plates.len();
    store.replace_plates(plates).await?;
    info!(count, "plate registry replaced");
    Ok(())
}

/// Check a plate against the registry, logging the attempt.
pub async fn verify_plate<S: FullStore + ?Sized>(
    store: &S,
    plate: Option<&str>,
) -> StoreResult<(bool, Option<u32>)> {
    let plate = plate
        .map(str::trim)
        .filter(|plate| !plate.is_empty())
        .ok_or_else(|| StoreError::InvalidInput("plate is required".into()))?;
    let (granted, spot) = store.verify_plate(plate).await?;
    info!(plate, granted, "plate verification");
    Ok((granted, spot))
}

/// The most recent access-log entries, newest first.
pub async fn recent_access<S: FullStore + ?Sized>(
    store: &S,
    limit: usize,
) -> StoreResult<Vec<AccessRecord>> {
    store.recent_access(limit).await
}

// ==================== Sensors ====================

/// Apply one sensor occupancy report.
pub async fn record_sensor_report<S: FullStore + ?Sized>(
    store: &S,
    spot: u32,
    state: SpotState,
) -> StoreResult<SensorUpdate> {
    let update = store.record_report(spot, state.is_occupied()).await?;
    if update.changed {
        info!(spot, occupied = update.occupied, "spot occupancy changed");
    }
    Ok(update)
}

/// Last known occupancy of every physical spot.
pub async fn sensor_overview<S: FullStore + ?Sized>(
    store: &S,
) -> StoreResult<Vec<SpotOccupancy>> {
    store.sensor_overview().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::CapacityConfig;
    use crate::store::repositories::LocalStore;

    fn store() -> LocalStore {
        LocalStore::new(CapacityConfig::new(5, 1).unwrap())
    }

    #[tokio::test]
    async fn reserve_requires_a_user_name() {
        let store = store();

        for bad in [None, Some(""), Some("   ")] {
            let err = reserve_spot(&store, SpotCategory::Standard, bad, None)
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::InvalidInput(_)));
        }

        // Nothing was consumed by the rejected attempts.
        assert_eq!(get_status(&store).await.unwrap().available_total, 5);
    }

    #[tokio::test]
    async fn reserve_trims_the_user_name() {
        let store = store();
        let res = reserve_spot(&store, SpotCategory::Standard, Some("  Ana "), None)
            .await
            .unwrap();
        assert_eq!(res.user_name, "Ana");
    }

    #[tokio::test]
    async fn verify_code_requires_a_code() {
        let store = store();
        assert!(matches!(
            verify_code(&store, None).await,
            Err(StoreError::InvalidInput(_))
        ));
        assert!(verify_code(&store, Some("nothing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sensor_report_round_trip() {
        let store = store();
        let update = record_sensor_report(&store, 2, SpotState::Occupied)
            .await
            .unwrap();
        assert!(update.changed);

        let overview = sensor_overview(&store).await.unwrap();
        assert!(overview.iter().find(|s| s.spot == 2).unwrap().occupied);
    }
}
