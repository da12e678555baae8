//! Sensor reporter binary.
//!
//! The device-side daemon: polls one distance sensor per spot at a fixed
//! interval, reduces the readings to occupancy transitions, and forwards
//! each transition to the parking server fire-and-forget. A failed report is
//! logged and dropped; the next transition corrects the remote view.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin parking-reporter
//! ```
//!
//! Configure via the `[reporter]` section of `parking.toml` (endpoint, spot
//! count, poll interval, threshold) and `RUST_LOG` for the log filter.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use parking_rust::client::ParkingClient;
use parking_rust::sensor::{DistanceSensor, PollerConfig, SensorPoller, SimulatedSensor};
use parking_rust::store::ParkingConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(true)
        .init();

    let config = ParkingConfig::load();
    let settings = config.reporter.clone();

    info!(
        endpoint = %settings.endpoint,
        spots = settings.spots,
        interval_ms = settings.poll_interval_ms,
        "starting sensor reporter"
    );

    let client = ParkingClient::new(
        &settings.endpoint,
        Duration::from_millis(settings.request_timeout_ms),
    )?;

    // Hardware would be wired in here; the simulator stands in for it.
    let sensors: Vec<Box<dyn DistanceSensor>> = (1..=settings.spots)
        .map(|spot| {
            Box::new(SimulatedSensor::new(spot, rand::random())) as Box<dyn DistanceSensor>
        })
        .collect();

    let poller = SensorPoller::new(
        sensors,
        PollerConfig {
            interval: Duration::from_millis(settings.poll_interval_ms),
            echo_timeout: Duration::from_millis(settings.echo_timeout_ms),
            threshold_cm: settings.threshold_cm,
        },
    );

    let (transitions_tx, mut transitions_rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poll_task = tokio::spawn(poller.run(transitions_tx, shutdown_rx));

    loop {
        tokio::select! {
            transition = transitions_rx.recv() => {
                let Some(transition) = transition else { break };
                info!(
                    spot = transition.spot,
                    occupied = transition.occupied,
                    "occupancy transition"
                );
                if let Err(e) = client
                    .report_transition(transition.spot, transition.occupied)
                    .await
                {
                    warn!(spot = transition.spot, error = %e, "report dropped");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                let _ = shutdown_tx.send(true);
                break;
            }
        }
    }

    poll_task.await?;
    Ok(())
}
