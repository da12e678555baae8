//! Periodic sensor polling.
//!
//! One cancellable task owns every sensor: each tick it reads them
//! sequentially (a single in-flight measurement at a time), bounds each read
//! with the echo timeout, and pushes the resulting transitions into a
//! channel for the caller to forward.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::debug;

use super::edge::{EdgeDetector, Transition};
use super::DistanceSensor;

/// Timing and threshold settings for the poll loop.
#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    /// Delay between poll cycles.
    pub interval: Duration,
    /// Bound on the wait for a single echo.
    pub echo_timeout: Duration,
    /// Distance below which a spot counts as occupied.
    pub threshold_cm: f64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            echo_timeout: Duration::from_millis(30),
            threshold_cm: 20.0,
        }
    }
}

/// Polls a set of sensors and reduces their readings to transitions.
pub struct SensorPoller {
    sensors: Vec<Box<dyn DistanceSensor>>,
    detector: EdgeDetector,
    config: PollerConfig,
}

impl SensorPoller {
    pub fn new(sensors: Vec<Box<dyn DistanceSensor>>, config: PollerConfig) -> Self {
        Self {
            sensors,
            detector: EdgeDetector::new(config.threshold_cm),
            config,
        }
    }

    /// Read every sensor once, in order, and collect the transitions.
    ///
    /// A read that exceeds the echo timeout is recorded as "no echo", which
    /// the detector treats as a free spot.
    pub async fn poll_once(&mut self) -> Vec<Transition> {
        let mut transitions = Vec::new();
        for sensor in &mut self.sensors {
            let spot = sensor.spot();
            let reading = match timeout(self.config.echo_timeout, sensor.measure()).await {
                Ok(reading) => reading,
                Err(_) => None,
            };
            debug!(spot, ?reading, "sensor read");
            if let Some(transition) = self.detector.observe(spot, reading) {
                transitions.push(transition);
            }
        }
        transitions
    }

    /// Run the poll loop until `shutdown` flips to `true` or the receiving
    /// side of `transitions` goes away.
    pub async fn run(
        mut self,
        transitions: mpsc::Sender<Transition>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    for transition in self.poll_once().await {
                        if transitions.send(transition).await.is_err() {
                            return;
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return;
                    }
                }
            }
        }
    }
}
