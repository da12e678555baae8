//! Parking HTTP server binary.
//!
//! Entry point for the parking REST API. It loads the configuration,
//! initializes the selected store backend, sets up the HTTP router, and
//! starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Run with the in-memory store (default)
//! cargo run --bin parking-server
//!
//! # Run with the JSON-file store
//! STORE_TYPE=file PARKING_DATA_FILE=parking_data.json \
//!   cargo run --bin parking-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST` / `PORT`: bind address (default from config, 0.0.0.0:8080)
//! - `STORE_TYPE`: `local` or `file`
//! - `PARKING_TOTAL_SPOTS` / `PARKING_RESTRICTED_SPOTS`: capacity overrides
//! - `RUST_LOG`: log filter (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use parking_rust::http::{create_router, AppState};
use parking_rust::store::{ParkingConfig, StoreFactory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(true)
        .init();

    info!("Starting parking HTTP server");

    let config = ParkingConfig::load();
    let capacity = config.capacity()?;
    info!(
        total = capacity.total_spots(),
        restricted = capacity.restricted_spots(),
        store = %config.store.store_type,
        "configuration loaded"
    );

    let store = StoreFactory::from_config(&config)?;
    let state = AppState::new(store);
    let app = create_router(state);

    let host = env::var("HOST").unwrap_or_else(|_| config.server.host.clone());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
