//! Occupancy ledger: the authoritative free-capacity state machine.
//!
//! The ledger tracks how many spots of each category are free and enforces
//! that reservations never oversubscribe capacity. It is a plain
//! single-threaded value; callers that share it across tasks must serialize
//! access (the store backends wrap it in a mutex so the admission-control
//! check and the count mutation form one atomic unit).
//!
//! Admission control is pure check-then-act: a reserve that arrives while
//! `free_total == 0` is rejected outright, with no speculative queuing for a
//! release that might land concurrently.

use serde::{Deserialize, Serialize};

use crate::api::ReservationId;
use crate::api::SpotCategory;

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error type for ledger operations.
///
/// Admission-control failures are terminal for the attempt; callers surface
/// them to the end user as a rejection naming the violated constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("all parking spots are taken")]
    CapacityExhausted,

    #[error("all restricted parking spots are taken")]
    RestrictedCapacityExhausted,

    #[error("restricted capacity {restricted} exceeds total capacity {total}")]
    RestrictedExceedsTotal { total: u32, restricted: u32 },
}

/// Immutable capacity configuration, fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityConfig {
    total_spots: u32,
    restricted_spots: u32,
}

impl CapacityConfig {
    /// Create a capacity configuration.
    ///
    /// # Errors
    /// Returns [`LedgerError::RestrictedExceedsTotal`] when the restricted
    /// category would not fit inside the total (restricted spots are a subset
    /// of all spots, not an extra pool).
    pub fn new(total_spots: u32, restricted_spots: u32) -> LedgerResult<Self> {
        if restricted_spots > total_spots {
            return Err(LedgerError::RestrictedExceedsTotal {
                total: total_spots,
                restricted: restricted_spots,
            });
        }
        Ok(Self {
            total_spots,
            restricted_spots,
        })
    }

    pub fn total_spots(&self) -> u32 {
        self.total_spots
    }

    pub fn restricted_spots(&self) -> u32 {
        self.restricted_spots
    }
}

/// Read-only view of the ledger counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub free_total: u32,
    pub free_restricted: u32,
    pub total_spots: u32,
    pub restricted_spots: u32,
}

/// The occupancy ledger.
///
/// Tracks how many spots of each category are held, plus the monotone
/// reservation counter; the free counts are derived from the held counts on
/// every read. Counts only; reservation records are owned by whichever store
/// persists them.
///
/// Deriving the free counts rather than mutating them directly is what makes
/// release exact: a standard claim that landed on the restricted spot
/// (because nothing else was left) gives it back on release, while a
/// restricted spot that is still held stays unavailable no matter how many
/// standard claims come and go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyLedger {
    capacity: CapacityConfig,
    reserved_standard: u32,
    reserved_restricted: u32,
    reservation_counter: i64,
}

impl OccupancyLedger {
    /// Create a ledger with every spot free and the counter at zero.
    pub fn new(capacity: CapacityConfig) -> Self {
        Self {
            capacity,
            reserved_standard: 0,
            reserved_restricted: 0,
            reservation_counter: 0,
        }
    }

    /// Restore a ledger from persisted counts.
    ///
    /// The persisted record stores the free counts; the held counts are
    /// reconstructed from them. Out-of-range values are clamped into the
    /// configured capacity rather than rejected, so a capacity change
    /// between runs degrades gracefully.
    pub fn restore(
        capacity: CapacityConfig,
        free_total: u32,
        free_restricted: u32,
        reservation_counter: i64,
    ) -> Self {
        let free_total = free_total.min(capacity.total_spots());
        let free_restricted = free_restricted
            .min(capacity.restricted_spots())
            .min(free_total);
        let reserved_total = capacity.total_spots() - free_total;
        let reserved_restricted =
            (capacity.restricted_spots() - free_restricted).min(reserved_total);
        Self {
            capacity,
            reserved_standard: reserved_total - reserved_restricted,
            reserved_restricted,
            reservation_counter: reservation_counter.max(0),
        }
    }

    pub fn capacity(&self) -> CapacityConfig {
        self.capacity
    }

    /// The value of the monotone counter after the last successful reserve.
    pub fn reservation_counter(&self) -> i64 {
        self.reservation_counter
    }

    fn free_total(&self) -> u32 {
        self.capacity.total_spots() - self.reserved_standard - self.reserved_restricted
    }

    /// Free restricted spots never exceed the overall free count: once only
    /// restricted spots remain, standard claims consume them too.
    fn free_restricted(&self) -> u32 {
        (self.capacity.restricted_spots() - self.reserved_restricted).min(self.free_total())
    }

    /// Attempt to claim one free spot of the given category.
    ///
    /// Checks run in a fixed order: general exhaustion first, then the
    /// restricted pool. Failed attempts leave the counters and the
    /// reservation counter untouched.
    pub fn reserve(&mut self, category: SpotCategory) -> LedgerResult<ReservationId> {
        if self.free_total() == 0 {
            return Err(LedgerError::CapacityExhausted);
        }
        if category == SpotCategory::Restricted && self.free_restricted() == 0 {
            return Err(LedgerError::RestrictedCapacityExhausted);
        }

        match category {
            SpotCategory::Standard => self.reserved_standard += 1,
            SpotCategory::Restricted => self.reserved_restricted += 1,
        }

        self.reservation_counter += 1;
        Ok(ReservationId::new(self.reservation_counter))
    }

    /// Return one spot of the given category to the free pool.
    ///
    /// Never fails; releasing a category with nothing held is a no-op, so
    /// the free counts clamp at capacity instead of overflowing.
    pub fn release(&mut self, category: SpotCategory) {
        match category {
            SpotCategory::Standard => {
                self.reserved_standard = self.reserved_standard.saturating_sub(1);
            }
            SpotCategory::Restricted => {
                self.reserved_restricted = self.reserved_restricted.saturating_sub(1);
            }
        }
    }

    /// Read-only snapshot of the current counts. No side effects.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            free_total: self.free_total(),
            free_restricted: self.free_restricted(),
            total_spots: self.capacity.total_spots(),
            restricted_spots: self.capacity.restricted_spots(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(total: u32, restricted: u32) -> OccupancyLedger {
        OccupancyLedger::new(CapacityConfig::new(total, restricted).unwrap())
    }

    #[test]
    fn capacity_rejects_restricted_larger_than_total() {
        let err = CapacityConfig::new(3, 4).unwrap_err();
        assert_eq!(
            err,
            LedgerError::RestrictedExceedsTotal {
                total: 3,
                restricted: 4
            }
        );
    }

    #[test]
    fn standard_reservations_then_restricted_exhausts_everything() {
        // totalSpots=5, restrictedCapacity=1
        let mut ledger = ledger(5, 1);

        for _ in 0..4 {
            ledger.reserve(SpotCategory::Standard).unwrap();
        }
        let snap = ledger.snapshot();
        assert_eq!(snap.free_total, 1);
        assert_eq!(snap.free_restricted, 1);

        ledger.reserve(SpotCategory::Restricted).unwrap();
        let snap = ledger.snapshot();
        assert_eq!(snap.free_total, 0);
        assert_eq!(snap.free_restricted, 0);

        assert_eq!(
            ledger.reserve(SpotCategory::Standard),
            Err(LedgerError::CapacityExhausted)
        );
    }

    #[test]
    fn restricted_pool_exhausts_independently() {
        // totalSpots=5, restrictedCapacity=1
        let mut ledger = ledger(5, 1);

        ledger.reserve(SpotCategory::Restricted).unwrap();
        assert_eq!(ledger.snapshot().free_restricted, 0);

        let err = ledger.reserve(SpotCategory::Restricted).unwrap_err();
        assert_eq!(err, LedgerError::RestrictedCapacityExhausted);
        assert_eq!(ledger.snapshot().free_total, 4);
    }

    #[test]
    fn general_exhaustion_wins_over_restricted_exhaustion() {
        let mut ledger = ledger(2, 1);
        ledger.reserve(SpotCategory::Standard).unwrap();
        ledger.reserve(SpotCategory::Restricted).unwrap();

        // Both pools are empty; the general check runs first.
        assert_eq!(
            ledger.reserve(SpotCategory::Restricted),
            Err(LedgerError::CapacityExhausted)
        );
    }

    #[test]
    fn counter_is_strictly_increasing_and_unaffected_by_failures() {
        let mut ledger = ledger(2, 1);

        let a = ledger.reserve(SpotCategory::Restricted).unwrap();
        let failed = ledger.reserve(SpotCategory::Restricted);
        assert!(failed.is_err());
        let b = ledger.reserve(SpotCategory::Standard).unwrap();

        assert_eq!(a.value(), 1);
        assert_eq!(b.value(), 2);
        assert_eq!(ledger.reservation_counter(), 2);
    }

    #[test]
    fn release_then_reserve_round_trips() {
        let mut ledger = ledger(5, 2);
        ledger.reserve(SpotCategory::Restricted).unwrap();
        ledger.reserve(SpotCategory::Standard).unwrap();

        let before = ledger.snapshot();
        ledger.release(SpotCategory::Restricted);
        ledger.reserve(SpotCategory::Restricted).unwrap();
        assert_eq!(ledger.snapshot(), before);

        let before = ledger.snapshot();
        ledger.release(SpotCategory::Standard);
        ledger.reserve(SpotCategory::Standard).unwrap();
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn release_clamps_at_capacity() {
        let mut ledger = ledger(3, 1);
        ledger.release(SpotCategory::Standard);
        ledger.release(SpotCategory::Restricted);

        let snap = ledger.snapshot();
        assert_eq!(snap.free_total, 3);
        assert_eq!(snap.free_restricted, 1);
    }

    #[test]
    fn standard_claim_consumes_restricted_spot_when_nothing_else_is_left() {
        let mut ledger = ledger(2, 1);
        ledger.reserve(SpotCategory::Standard).unwrap();

        // The only free spot left is the restricted one.
        let snap = ledger.snapshot();
        assert_eq!(snap.free_total, 1);
        assert_eq!(snap.free_restricted, 1);

        ledger.reserve(SpotCategory::Standard).unwrap();
        let snap = ledger.snapshot();
        assert_eq!(snap.free_total, 0);
        assert_eq!(snap.free_restricted, 0);
    }

    #[test]
    fn restricted_spot_returns_after_a_standard_claim_consumed_it() {
        let mut ledger = ledger(1, 1);
        ledger.reserve(SpotCategory::Standard).unwrap();
        assert_eq!(
            ledger.reserve(SpotCategory::Restricted),
            Err(LedgerError::CapacityExhausted)
        );

        // Cancelling the standard claim empties the lot again, so the
        // restricted spot must be reservable.
        ledger.release(SpotCategory::Standard);
        let snap = ledger.snapshot();
        assert_eq!(snap.free_total, 1);
        assert_eq!(snap.free_restricted, 1);
        ledger.reserve(SpotCategory::Restricted).unwrap();
    }

    #[test]
    fn standard_release_does_not_over_restore_a_held_restricted_spot() {
        let mut ledger = ledger(5, 1);
        ledger.reserve(SpotCategory::Restricted).unwrap();
        ledger.reserve(SpotCategory::Standard).unwrap();

        ledger.release(SpotCategory::Standard);
        let snap = ledger.snapshot();
        assert_eq!(snap.free_total, 4);
        assert_eq!(snap.free_restricted, 0);
    }

    #[test]
    fn restore_clamps_out_of_range_counts() {
        let capacity = CapacityConfig::new(5, 1).unwrap();
        let ledger = OccupancyLedger::restore(capacity, 9, 4, 12);

        let snap = ledger.snapshot();
        assert_eq!(snap.free_total, 5);
        assert_eq!(snap.free_restricted, 1);
        assert_eq!(ledger.reservation_counter(), 12);
    }
}
