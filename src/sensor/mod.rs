//! Sensor-side occupancy detection.
//!
//! Converts raw distance measurements into discrete occupancy transitions:
//! a spot counts as occupied while something sits closer than the configured
//! threshold, and only *changes* of that state are forwarded upstream. An
//! echo read that times out is treated as "no object detected" rather than
//! an error, since the physical sensor cannot distinguish "far object" from
//! "no echo".

pub mod edge;
pub mod poller;
pub mod sim;

pub use edge::{EdgeDetector, Transition};
pub use poller::{PollerConfig, SensorPoller};
pub use sim::SimulatedSensor;

use async_trait::async_trait;

/// A distance sensor watching one physical spot.
///
/// `measure` resolves to the distance in centimeters, or `None` when no echo
/// arrived within the sensor's own bounded window. Implementations are read
/// sequentially by the poller, one in-flight measurement at a time.
#[async_trait]
pub trait DistanceSensor: Send {
    /// The spot this sensor watches (1-based).
    fn spot(&self) -> u32;

    /// Take one distance measurement.
    async fn measure(&mut self) -> Option<f64>;
}
