//! Simulated distance sensor.
//!
//! Stands in for the ultrasonic hardware during development and tests: the
//! simulated spot randomly flips between occupied and free, returns a
//! plausible distance for its current state, and occasionally drops an echo
//! to exercise the timeout path.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::DistanceSensor;

/// Randomized stand-in for one ultrasonic sensor.
pub struct SimulatedSensor {
    spot: u32,
    occupied: bool,
    flip_chance: f64,
    dropout_chance: f64,
    rng: StdRng,
}

impl SimulatedSensor {
    /// Create a simulated sensor for `spot`, seeded for reproducibility.
    pub fn new(spot: u32, seed: u64) -> Self {
        Self {
            spot,
            occupied: false,
            flip_chance: 0.2,
            dropout_chance: 0.05,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Override the per-poll probability that the spot changes state.
    pub fn with_flip_chance(mut self, flip_chance: f64) -> Self {
        self.flip_chance = flip_chance;
        self
    }

    /// Override the per-poll probability of a lost echo.
    pub fn with_dropout_chance(mut self, dropout_chance: f64) -> Self {
        self.dropout_chance = dropout_chance;
        self
    }
}

#[async_trait]
impl DistanceSensor for SimulatedSensor {
    fn spot(&self) -> u32 {
        self.spot
    }

    async fn measure(&mut self) -> Option<f64> {
        if self.rng.gen_bool(self.flip_chance) {
            self.occupied = !self.occupied;
        }
        if self.rng.gen_bool(self.dropout_chance) {
            return None;
        }
        let distance = if self.occupied {
            // A parked car sits well inside the threshold.
            self.rng.gen_range(4.0..15.0)
        } else {
            self.rng.gen_range(40.0..250.0)
        };
        Some(distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn distances_match_the_simulated_state() {
        let mut sensor = SimulatedSensor::new(1, 42).with_dropout_chance(0.0);
        for _ in 0..50 {
            let distance = sensor.measure().await.unwrap();
            if sensor.occupied {
                assert!(distance < 15.0);
            } else {
                assert!(distance >= 40.0);
            }
        }
    }

    #[tokio::test]
    async fn same_seed_replays_the_same_readings() {
        let mut a = SimulatedSensor::new(1, 7);
        let mut b = SimulatedSensor::new(1, 7);
        for _ in 0..20 {
            assert_eq!(a.measure().await, b.measure().await);
        }
    }
}
