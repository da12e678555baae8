//! Store module: the occupancy state and its persistence.
//!
//! This module owns the shared parking state via the repository pattern,
//! allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (REST API, binaries, tests)          │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                            │
//! │  - Input validation (required tokens, spot ranges)      │
//! │  - Logging                                              │
//! └───────────────────┬─────────────────────────────────────┘
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Store Traits (repository.rs)                           │
//! │  - ReservationStore / PlateStore / SensorStore          │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//!     │                                │
//! ┌───▼──────────────┐     ┌───────────▼─────────────┐
//! │ Local Store      │     │ File Store              │
//! │ (in-memory)      │     │ (JSON snapshot per      │
//! │                  │     │  mutation)              │
//! └──────────────────┘     └─────────────────────────┘
//! ```
//!
//! Both backends funnel every mutation through one mutex around a shared
//! [`state::ParkingState`], which is what keeps the ledger's check-then-act
//! admission control atomic under concurrent callers.

#[cfg(not(any(feature = "local-store", feature = "file-store")))]
compile_error!("Enable at least one store backend feature.");

pub mod factory;
pub mod repositories;
pub mod repository;
pub mod services;
pub(crate) mod state;
pub mod store_config;

pub use factory::{StoreFactory, StoreType};
#[cfg(feature = "file-store")]
pub use repositories::FileStore;
#[cfg(feature = "local-store")]
pub use repositories::LocalStore;
pub use repository::{
    FullStore, PlateStore, ReservationStore, SensorStore, StoreError, StoreResult,
};
pub use store_config::ParkingConfig;
