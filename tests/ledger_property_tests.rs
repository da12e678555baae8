//! Property tests for the occupancy ledger.
//!
//! For every sequence of reserve/release calls the count invariants must
//! hold after every single step, the reservation counter must be strictly
//! increasing across successes and untouched by failures, and each failure
//! must name the constraint that actually rejected the attempt.

use proptest::prelude::*;

use parking_rust::api::SpotCategory;
use parking_rust::ledger::{CapacityConfig, LedgerError, OccupancyLedger};

#[derive(Debug, Clone, Copy)]
enum Op {
    Reserve(SpotCategory),
    Release(SpotCategory),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Reserve(SpotCategory::Standard)),
        Just(Op::Reserve(SpotCategory::Restricted)),
        Just(Op::Release(SpotCategory::Standard)),
        Just(Op::Release(SpotCategory::Restricted)),
    ]
}

fn capacity_strategy() -> impl Strategy<Value = (u32, u32)> {
    (0u32..=20).prop_flat_map(|total| (Just(total), 0u32..=total))
}

proptest! {
    #[test]
    fn invariants_hold_after_every_call(
        (total, restricted) in capacity_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..200),
    ) {
        let capacity = CapacityConfig::new(total, restricted).unwrap();
        let mut ledger = OccupancyLedger::new(capacity);
        let mut last_counter = ledger.reservation_counter();

        for op in ops {
            let before = ledger.snapshot();

            match op {
                Op::Reserve(category) => {
                    let result = ledger.reserve(category);
                    match result {
                        Ok(id) => {
                            // Strictly increasing, unique per issued reservation.
                            prop_assert_eq!(id.value(), last_counter + 1);
                            last_counter = id.value();
                        }
                        Err(LedgerError::CapacityExhausted) => {
                            prop_assert_eq!(before.free_total, 0);
                            prop_assert_eq!(ledger.snapshot(), before);
                        }
                        Err(LedgerError::RestrictedCapacityExhausted) => {
                            prop_assert_eq!(category, SpotCategory::Restricted);
                            prop_assert_eq!(before.free_restricted, 0);
                            prop_assert!(before.free_total > 0);
                            prop_assert_eq!(ledger.snapshot(), before);
                        }
                        Err(e) => prop_assert!(false, "unexpected error: {e}"),
                    }
                    // Failures leave the counter untouched.
                    prop_assert_eq!(ledger.reservation_counter(), last_counter);
                }
                Op::Release(category) => {
                    ledger.release(category);
                    prop_assert_eq!(ledger.reservation_counter(), last_counter);
                }
            }

            let snap = ledger.snapshot();
            prop_assert!(snap.free_total <= total);
            prop_assert!(snap.free_restricted <= restricted);
            prop_assert!(snap.free_restricted <= snap.free_total);
        }
    }

    #[test]
    fn reserve_outcome_is_determined_by_the_counts(
        (total, restricted) in capacity_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..100),
    ) {
        let capacity = CapacityConfig::new(total, restricted).unwrap();
        let mut ledger = OccupancyLedger::new(capacity);

        for op in ops {
            if let Op::Release(category) = op {
                ledger.release(category);
                continue;
            }
            let Op::Reserve(category) = op else { unreachable!() };

            let before = ledger.snapshot();
            let expected: Result<(), LedgerError> = if before.free_total == 0 {
                Err(LedgerError::CapacityExhausted)
            } else if category == SpotCategory::Restricted && before.free_restricted == 0 {
                Err(LedgerError::RestrictedCapacityExhausted)
            } else {
                Ok(())
            };

            let actual = ledger.reserve(category).map(|_| ());
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn release_then_reserve_round_trips(
        (total, restricted) in capacity_strategy(),
        warmup in prop::collection::vec(op_strategy(), 0..50),
        category_restricted in any::<bool>(),
    ) {
        let capacity = CapacityConfig::new(total, restricted).unwrap();
        let mut ledger = OccupancyLedger::new(capacity);

        // Shadow the held counts so we know whether a release has anything
        // to give back; a no-op release is not reversible.
        let mut held_standard = 0u32;
        let mut held_restricted = 0u32;
        for op in warmup {
            match op {
                Op::Reserve(category) => {
                    if ledger.reserve(category).is_ok() {
                        match category {
                            SpotCategory::Standard => held_standard += 1,
                            SpotCategory::Restricted => held_restricted += 1,
                        }
                    }
                }
                Op::Release(category) => {
                    ledger.release(category);
                    match category {
                        SpotCategory::Standard => {
                            held_standard = held_standard.saturating_sub(1);
                        }
                        SpotCategory::Restricted => {
                            held_restricted = held_restricted.saturating_sub(1);
                        }
                    }
                }
            }
        }

        let category = if category_restricted {
            SpotCategory::Restricted
        } else {
            SpotCategory::Standard
        };

        let release_is_noop = match category {
            SpotCategory::Standard => held_standard == 0,
            SpotCategory::Restricted => held_restricted == 0,
        };
        prop_assume!(!release_is_noop);

        let before = ledger.snapshot();
        ledger.release(category);
        prop_assert!(ledger.reserve(category).is_ok());
        prop_assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn releasing_every_reservation_restores_the_initial_state(
        (total, restricted) in capacity_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..150),
    ) {
        let capacity = CapacityConfig::new(total, restricted).unwrap();
        let mut ledger = OccupancyLedger::new(capacity);
        let initial = ledger.snapshot();

        // Drive the ledger the way a store does: cancel only what is
        // actually held, then drain everything that is still outstanding.
        let mut outstanding: Vec<SpotCategory> = Vec::new();
        for op in ops {
            match op {
                Op::Reserve(category) => {
                    if ledger.reserve(category).is_ok() {
                        outstanding.push(category);
                    }
                }
                Op::Release(category) => {
                    if let Some(pos) = outstanding.iter().position(|&held| held == category) {
                        outstanding.remove(pos);
                        ledger.release(category);
                    }
                }
            }
        }

        for category in outstanding.drain(..) {
            ledger.release(category);
        }

        // An emptied lot is indistinguishable from a fresh one; in
        // particular every restricted spot is reservable again.
        let snap = ledger.snapshot();
        prop_assert_eq!(snap, initial);
        prop_assert_eq!(snap.free_total, total);
        prop_assert_eq!(snap.free_restricted, restricted);
    }
}
