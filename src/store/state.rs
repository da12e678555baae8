//! Shared mutable parking state.
//!
//! One value of [`ParkingState`] is the single logical owner of the
//! occupancy counts, the reservation record book, the plate registry, and
//! the sensor-derived occupancy view. Backends wrap it in a mutex; every
//! mutation below runs with that lock held, which is what makes the
//! check-then-act admission control atomic.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::api::{
    AccessRecord, ParkingStatus, PlateAssignment, Reservation, ReservationId, SensorUpdate,
    SpotCategory, SpotOccupancy, normalize_plate,
};
use crate::ledger::{CapacityConfig, OccupancyLedger};
use crate::store::repository::{StoreError, StoreResult};

/// Serializable snapshot of the whole parking state.
///
/// This is the on-disk format of the file store: a single record holding the
/// free counts, the reservation counter, and the owned collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PersistedState {
    pub free_total: u32,
    pub free_restricted: u32,
    pub reservation_counter: i64,
    #[serde(default)]
    pub reservations: Vec<Reservation>,
    #[serde(default)]
    pub plates: Vec<PlateAssignment>,
    #[serde(default)]
    pub access_log: Vec<AccessRecord>,
    #[serde(default)]
    pub sensors: Vec<SpotOccupancy>,
    pub last_updated: chrono::DateTime<Utc>,
}

/// The in-memory parking state shared by every backend.
#[derive(Debug, Clone)]
pub(crate) struct ParkingState {
    ledger: OccupancyLedger,
    reservations: Vec<Reservation>,
    plates: Vec<PlateAssignment>,
    access_log: Vec<AccessRecord>,
    sensors: BTreeMap<u32, SpotOccupancy>,
}

impl ParkingState {
    /// Fresh state: every spot free, every sensor reporting free.
    pub fn new(capacity: CapacityConfig) -> Self {
        let now = Utc::now();
        let sensors = (1..=capacity.total_spots())
            .map(|spot| {
                (
                    spot,
                    SpotOccupancy {
                        spot,
                        occupied: false,
                        last_update: now,
                    },
                )
            })
            .collect();
        Self {
            ledger: OccupancyLedger::new(capacity),
            reservations: Vec::new(),
            plates: Vec::new(),
            access_log: Vec::new(),
            sensors,
        }
    }

    /// Rebuild state from a persisted snapshot.
    ///
    /// Counts are clamped into the configured capacity; sensor entries for
    /// spots that no longer exist are dropped.
    pub fn from_persisted(capacity: CapacityConfig, persisted: PersistedState) -> Self {
        let mut state = Self::new(capacity);
        state.ledger = OccupancyLedger::restore(
            capacity,
            persisted.free_total,
            persisted.free_restricted,
            persisted.reservation_counter,
        );
        state.reservations = persisted.reservations;
        state.plates = persisted.plates;
        state.plates.sort_by_key(|p| p.spot);
        state.access_log = persisted.access_log;
        for sensor in persisted.sensors {
            if state.sensors.contains_key(&sensor.spot) {
                state.sensors.insert(sensor.spot, sensor);
            }
        }
        state
    }

    /// Snapshot for persistence.
    pub fn to_persisted(&self) -> PersistedState {
        let snap = self.ledger.snapshot();
        PersistedState {
            free_total: snap.free_total,
            free_restricted: snap.free_restricted,
            reservation_counter: self.ledger.reservation_counter(),
            reservations: self.reservations.clone(),
            plates: self.plates.clone(),
            access_log: self.access_log.clone(),
            sensors: self.sensors.values().cloned().collect(),
            last_updated: Utc::now(),
        }
    }

    fn total_spots(&self) -> u32 {
        self.ledger.capacity().total_spots()
    }

    fn check_spot_range(&self, spot: u32) -> StoreResult<()> {
        if spot == 0 || spot > self.total_spots() {
            return Err(StoreError::InvalidInput(format!(
                "spot {} is out of range (1-{})",
                spot,
                self.total_spots()
            )));
        }
        Ok(())
    }

    // ==================== Reservations ====================

    pub fn status(&self) -> ParkingStatus {
        let snap = self.ledger.snapshot();
        ParkingStatus {
            total_spots: snap.total_spots,
            restricted_spots: snap.restricted_spots,
            available_total: snap.free_total,
            available_restricted: snap.free_restricted,
            reserved_count: self.reservations.len(),
        }
    }

    pub fn reserve(
        &mut self,
        category: SpotCategory,
        user_name: &str,
        attachment: Option<&str>,
    ) -> StoreResult<Reservation> {
        let id = self.ledger.reserve(category)?;
        let reservation = Reservation::new(id, category, user_name, Utc::now())
            .with_attachment(attachment.map(str::to_string));
        self.reservations.push(reservation.clone());
        Ok(reservation)
    }

    pub fn cancel(&mut self, id: ReservationId) -> StoreResult<Reservation> {
        let index = self
            .reservations
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Reservation {} not found", id)))?;
        let cancelled = self.reservations.remove(index);
        self.ledger.release(cancelled.category);
        Ok(cancelled)
    }

    pub fn reservations(&self) -> Vec<Reservation> {
        self.reservations.clone()
    }

    /// Locate the reservation a scanned code refers to.
    ///
    /// Scans may wrap the QR value in a URL or surrounding whitespace, so
    /// after the exact match this falls back to a numeric trailing path
    /// segment and finally to a substring match.
    pub fn find_by_code(&self, code: &str) -> Option<Reservation> {
        let code = code.trim();

        if let Some(found) = self.reservations.iter().find(|r| r.qr_value == code) {
            return Some(found.clone());
        }

        if code.contains('/') {
            if let Some(last) = code.trim_end_matches('/').rsplit('/').next() {
                if let Ok(raw_id) = last.parse::<i64>() {
                    let id = ReservationId::new(raw_id);
                    if let Some(found) = self.reservations.iter().find(|r| r.id == id) {
                        return Some(found.clone());
                    }
                }
            }
        }

        self.reservations
            .iter()
            .find(|r| code.contains(&r.qr_value))
            .cloned()
    }

    // ==================== Plates ====================

    pub fn plates(&self) -> Vec<PlateAssignment> {
        self.plates.clone()
    }

    pub fn upsert_plate(&mut self, spot: u32, plate: &str) -> StoreResult<()> {
        self.check_spot_range(spot)?;
        let plate = plate.trim();
        if plate.is_empty() {
            return Err(StoreError::InvalidInput("plate must not be empty".into()));
        }

        if let Some(existing) = self.plates.iter_mut().find(|p| p.spot == spot) {
            existing.plate = plate.to_string();
        } else {
            self.plates.push(PlateAssignment {
                spot,
                plate: plate.to_string(),
            });
            self.plates.sort_by_key(|p| p.spot);
        }
        Ok(())
    }

    pub fn remove_plate(&mut self, spot: u32) -> bool {
        let before = self.plates.len();
        self.plates.retain(|p| p.spot != spot);
        self.plates.len() != before
    }

    pub fn replace_plates(&mut self, plates: Vec<PlateAssignment>) -> StoreResult<()> {
        for assignment in &plates {
            self.check_spot_range(assignment.spot)?;
            if assignment.plate.trim().is_empty() {
                return Err(StoreError::InvalidInput(format!(
                    "plate for spot {} must not be empty",
                    assignment.spot
                )));
            }
        }
        let mut plates = plates;
        plates.sort_by_key(|p| p.spot);
        self.plates = plates;
        Ok(())
    }

    pub fn verify_plate(&mut self, plate: &str) -> (bool, Option<u32>) {
        let normalized = normalize_plate(plate);
        let spot = self
            .plates
            .iter()
            .find(|p| normalize_plate(&p.plate) == normalized)
            .map(|p| p.spot);

        self.access_log.push(AccessRecord {
            time: Utc::now(),
            plate: plate.to_string(),
            spot,
            granted: spot.is_some(),
        });

        (spot.is_some(), spot)
    }

    pub fn recent_access(&self, limit: usize) -> Vec<AccessRecord> {
        self.access_log.iter().rev().take(limit).cloned().collect()
    }

    // ==================== Sensors ====================

    pub fn record_report(&mut self, spot: u32, occupied: bool) -> StoreResult<SensorUpdate> {
        self.check_spot_range(spot)?;
        let now = Utc::now();
        let entry = self.sensors.entry(spot).or_insert(SpotOccupancy {
            spot,
            occupied: false,
            last_update: now,
        });
        let changed = entry.occupied != occupied;
        entry.occupied = occupied;
        entry.last_update = now;
        Ok(SensorUpdate {
            spot,
            occupied,
            changed,
            timestamp: now,
        })
    }

    pub fn sensor_overview(&self) -> Vec<SpotOccupancy> {
        self.sensors.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(total: u32, restricted: u32) -> ParkingState {
        ParkingState::new(CapacityConfig::new(total, restricted).unwrap())
    }

    #[test]
    fn cancel_returns_the_spot_to_the_pool() {
        let mut state = state(5, 1);
        let res = state.reserve(SpotCategory::Restricted, "Ana", None).unwrap();
        assert_eq!(state.status().available_restricted, 0);

        let cancelled = state.cancel(res.id).unwrap();
        assert_eq!(cancelled.id, res.id);
        assert_eq!(state.status().available_restricted, 1);
        assert_eq!(state.status().available_total, 5);
    }

    #[test]
    fn find_by_code_matches_exact_url_tail_and_substring() {
        let mut state = state(5, 1);
        let res = state.reserve(SpotCategory::Standard, "Ana", None).unwrap();

        assert_eq!(state.find_by_code(&res.qr_value).unwrap().id, res.id);
        assert_eq!(
            state
                .find_by_code(&format!("https://parking.example/api/qr/{}", res.id))
                .unwrap()
                .id,
            res.id
        );
        assert_eq!(
            state
                .find_by_code(&format!("scanned: {} ", res.qr_value))
                .unwrap()
                .id,
            res.id
        );
        assert!(state.find_by_code("Parking-STANDARD-999-nope").is_none());
    }

    #[test]
    fn verify_plate_normalizes_and_logs() {
        let mut state = state(5, 1);
        state.upsert_plate(2, "ABC-123").unwrap();

        let (granted, spot) = state.verify_plate(" abc-123 ");
        assert!(granted);
        assert_eq!(spot, Some(2));

        let (granted, spot) = state.verify_plate("XYZ-999");
        assert!(!granted);
        assert_eq!(spot, None);

        let log = state.recent_access(10);
        assert_eq!(log.len(), 2);
        // Newest first.
        assert!(!log[0].granted);
        assert!(log[1].granted);
    }

    #[test]
    fn sensor_report_flags_transitions_only() {
        let mut state = state(3, 1);

        let update = state.record_report(1, true).unwrap();
        assert!(update.changed);
        let update = state.record_report(1, true).unwrap();
        assert!(!update.changed);
        let update = state.record_report(1, false).unwrap();
        assert!(update.changed);

        assert!(state.record_report(4, true).is_err());
    }

    #[test]
    fn persistence_round_trip_preserves_counts_and_records() {
        let capacity = CapacityConfig::new(5, 1).unwrap();
        let mut state = ParkingState::new(capacity);
        state.reserve(SpotCategory::Standard, "Ana", None).unwrap();
        state.reserve(SpotCategory::Restricted, "Vedad", None).unwrap();
        state.upsert_plate(3, "SA-123-AB").unwrap();
        state.record_report(2, true).unwrap();

        let restored = ParkingState::from_persisted(capacity, state.to_persisted());
        assert_eq!(restored.status(), state.status());
        assert_eq!(restored.reservations().len(), 2);
        assert_eq!(restored.plates(), state.plates());
        assert_eq!(restored.sensor_overview(), state.sensor_overview());
    }
}
