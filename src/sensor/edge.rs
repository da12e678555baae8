//! Edge detection over distance readings.
//!
//! Keeps the last known occupancy per spot and emits a transition only when
//! a reading flips it. This is what keeps the remote endpoint from being
//! flooded with one redundant report per poll cycle.

use std::collections::HashMap;

/// A single occupancy state change for one spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub spot: u32,
    pub occupied: bool,
}

/// Threshold comparison plus per-spot last-state tracking.
///
/// Spots start out free; the first occupied reading for a spot therefore
/// emits a transition.
#[derive(Debug, Clone)]
pub struct EdgeDetector {
    threshold_cm: f64,
    last: HashMap<u32, bool>,
}

impl EdgeDetector {
    pub fn new(threshold_cm: f64) -> Self {
        Self {
            threshold_cm,
            last: HashMap::new(),
        }
    }

    /// Interpret one raw reading.
    ///
    /// `None` means the echo timed out, which reads as "no object detected",
    /// not as an error.
    pub fn classify(&self, distance_cm: Option<f64>) -> bool {
        match distance_cm {
            Some(distance) => distance < self.threshold_cm,
            None => false,
        }
    }

    /// Feed one reading for `spot`; returns a transition when the derived
    /// occupancy differs from the last known state.
    pub fn observe(&mut self, spot: u32, distance_cm: Option<f64>) -> Option<Transition> {
        let occupied = self.classify(distance_cm);
        let last = self.last.entry(spot).or_insert(false);
        if *last == occupied {
            return None;
        }
        *last = occupied;
        Some(Transition { spot, occupied })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_only_on_state_changes() {
        // Readings 25, 15, 15, 30 cm with a 20 cm threshold: transitions at
        // index 1 (occupied) and index 3 (free) only.
        let mut detector = EdgeDetector::new(20.0);

        assert_eq!(detector.observe(1, Some(25.0)), None);
        assert_eq!(
            detector.observe(1, Some(15.0)),
            Some(Transition {
                spot: 1,
                occupied: true
            })
        );
        assert_eq!(detector.observe(1, Some(15.0)), None);
        assert_eq!(
            detector.observe(1, Some(30.0)),
            Some(Transition {
                spot: 1,
                occupied: false
            })
        );
    }

    #[test]
    fn timeout_reads_as_free() {
        let mut detector = EdgeDetector::new(20.0);

        // Timed-out echo on a free spot: nothing to report.
        assert_eq!(detector.observe(1, None), None);

        // An occupied spot whose echo goes silent flips back to free.
        assert!(detector.observe(1, Some(10.0)).unwrap().occupied);
        assert_eq!(
            detector.observe(1, None),
            Some(Transition {
                spot: 1,
                occupied: false
            })
        );
    }

    #[test]
    fn spots_are_tracked_independently() {
        let mut detector = EdgeDetector::new(20.0);

        assert!(detector.observe(1, Some(5.0)).is_some());
        // Spot 2 has its own state; an occupied reading there still fires.
        assert!(detector.observe(2, Some(5.0)).is_some());
        assert_eq!(detector.observe(1, Some(6.0)), None);
    }

    #[test]
    fn threshold_is_exclusive() {
        let detector = EdgeDetector::new(20.0);
        assert!(!detector.classify(Some(20.0)));
        assert!(detector.classify(Some(19.9)));
    }
}
