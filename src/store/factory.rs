//! Store factory for dependency injection.
//!
//! Creates and configures store instances based on runtime configuration,
//! keeping the choice of backend out of the binaries and handlers.

use std::str::FromStr;
use std::sync::Arc;

use super::repository::{FullStore, StoreError, StoreResult};
#[cfg(feature = "file-store")]
use super::repositories::FileStore;
#[cfg(feature = "local-store")]
use super::repositories::LocalStore;
use super::store_config::ParkingConfig;

/// Store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreType {
    /// In-memory store
    Local,
    /// JSON-file-backed store
    File,
}

impl FromStr for StoreType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::Local),
            "file" | "json" => Ok(Self::File),
            _ => Err(format!("Unknown store type: {}", s)),
        }
    }
}

impl StoreType {
    /// Get store type from environment.
    ///
    /// Reads `STORE_TYPE`; when unset, the presence of `PARKING_DATA_FILE`
    /// selects the file store, otherwise the in-memory store.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("STORE_TYPE") {
            return val.parse().unwrap_or(Self::Local);
        }

        if std::env::var("PARKING_DATA_FILE").is_ok() {
            Self::File
        } else {
            Self::Local
        }
    }
}

/// Factory for creating store instances.
pub struct StoreFactory;

impl StoreFactory {
    /// Create a store instance of the given type from the configuration.
    pub fn create(store_type: StoreType, config: &ParkingConfig) -> StoreResult<Arc<dyn FullStore>> {
        let capacity = config.capacity()?;
        match store_type {
            StoreType::Local => {
                #[cfg(feature = "local-store")]
                {
                    Ok(Arc::new(LocalStore::new(capacity)))
                }
                #[cfg(not(feature = "local-store"))]
                {
                    Err(StoreError::ConfigurationError(
                        "Local store feature not enabled".to_string(),
                    ))
                }
            }
            StoreType::File => {
                #[cfg(feature = "file-store")]
                {
                    Ok(Arc::new(FileStore::open(capacity, config.file.path.clone())))
                }
                #[cfg(not(feature = "file-store"))]
                {
                    Err(StoreError::ConfigurationError(
                        "File store feature not enabled".to_string(),
                    ))
                }
            }
        }
    }

    /// Create the store selected by the configuration's `[store] type`.
    pub fn from_config(config: &ParkingConfig) -> StoreResult<Arc<dyn FullStore>> {
        let store_type = config.store.store_type.parse().map_err(|e| {
            StoreError::ConfigurationError(format!("Invalid store type: {}", e))
        })?;
        Self::create(store_type, config)
    }

    /// Create a store from environment configuration alone.
    pub fn from_env() -> StoreResult<Arc<dyn FullStore>> {
        let mut config = ParkingConfig::default();
        config.apply_env_overrides();
        Self::create(StoreType::from_env(), &config)
    }
}
