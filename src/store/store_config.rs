//! Configuration file support.
//!
//! The deployed installations never agreed on one capacity or one
//! persistence mode, so both are configuration rather than constants: a
//! `parking.toml` file with optional environment overrides.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ledger::CapacityConfig;
use crate::store::repository::StoreError;

/// Top-level configuration for the parking backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParkingConfig {
    #[serde(default)]
    pub parking: ParkingSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub file: FileSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub reporter: ReporterSettings,
}

/// Capacity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingSettings {
    #[serde(default = "default_total_spots")]
    pub total_spots: u32,
    #[serde(default = "default_restricted_spots")]
    pub restricted_spots: u32,
}

/// Store backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(rename = "type", default = "default_store_type")]
    pub store_type: String,
}

/// File-store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default = "default_data_file")]
    pub path: String,
}

/// HTTP server bind settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Sensor reporter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReporterSettings {
    /// Base URL of the parking server the reporter forwards transitions to.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Number of physical spots covered by sensors.
    #[serde(default = "default_reporter_spots")]
    pub spots: u32,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Distance below which a spot counts as occupied.
    #[serde(default = "default_threshold_cm")]
    pub threshold_cm: f64,
    /// Bound on the wait for an echo; expiry reads as "no object detected".
    #[serde(default = "default_echo_timeout_ms")]
    pub echo_timeout_ms: u64,
    /// Timeout on HTTP calls before falling back to cached state.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_total_spots() -> u32 {
    15
}

fn default_restricted_spots() -> u32 {
    1
}

fn default_store_type() -> String {
    "local".to_string()
}

fn default_data_file() -> String {
    "parking_data.json".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_reporter_spots() -> u32 {
    5
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_threshold_cm() -> f64 {
    20.0
}

fn default_echo_timeout_ms() -> u64 {
    30
}

fn default_request_timeout_ms() -> u64 {
    3000
}

impl Default for ParkingSettings {
    fn default() -> Self {
        Self {
            total_spots: default_total_spots(),
            restricted_spots: default_restricted_spots(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            store_type: default_store_type(),
        }
    }
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            path: default_data_file(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ReporterSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            spots: default_reporter_spots(),
            poll_interval_ms: default_poll_interval_ms(),
            threshold_cm: default_threshold_cm(),
            echo_timeout_ms: default_echo_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ParkingConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            StoreError::ConfigurationError(format!("Failed to read config file: {}", e))
        })?;

        let config: ParkingConfig = toml::from_str(&content).map_err(|e| {
            StoreError::ConfigurationError(format!("Failed to parse config file: {}", e))
        })?;

        Ok(config)
    }

    /// Load configuration from the default locations.
    ///
    /// Searches for `parking.toml` in the current directory, `config/`, and
    /// the parent directory.
    pub fn from_default_location() -> Result<Self, StoreError> {
        let search_paths = [
            PathBuf::from("parking.toml"),
            PathBuf::from("config/parking.toml"),
            PathBuf::from("../parking.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(StoreError::ConfigurationError(
            "No parking.toml found in standard locations".to_string(),
        ))
    }

    /// Load from the default locations, falling back to built-in defaults,
    /// then apply environment overrides.
    pub fn load() -> Self {
        let mut config = Self::from_default_location().unwrap_or_default();
        config.apply_env_overrides();
        config
    }

    /// Apply `PARKING_TOTAL_SPOTS`, `PARKING_RESTRICTED_SPOTS`, `STORE_TYPE`
    /// and `PARKING_DATA_FILE` from the environment.
    pub fn apply_env_overrides(&mut self) {
        if let Some(total) = env_parse("PARKING_TOTAL_SPOTS") {
            self.parking.total_spots = total;
        }
        if let Some(restricted) = env_parse("PARKING_RESTRICTED_SPOTS") {
            self.parking.restricted_spots = restricted;
        }
        if let Ok(store_type) = std::env::var("STORE_TYPE") {
            self.store.store_type = store_type;
        }
        if let Ok(path) = std::env::var("PARKING_DATA_FILE") {
            self.file.path = path;
        }
    }

    /// Validated capacity configuration.
    pub fn capacity(&self) -> Result<CapacityConfig, StoreError> {
        CapacityConfig::new(self.parking.total_spots, self.parking.restricted_spots)
            .map_err(|e| StoreError::ConfigurationError(e.to_string()))
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ParkingConfig::default();
        assert_eq!(config.parking.total_spots, 15);
        assert_eq!(config.parking.restricted_spots, 1);
        assert_eq!(config.store.store_type, "local");
        assert_eq!(config.server.port, 8080);
        assert!(config.capacity().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[parking]
total_spots = 5
restricted_spots = 1

[store]
type = "file"

[file]
path = "/var/lib/parking/state.json"

[server]
host = "127.0.0.1"
port = 9090

[reporter]
endpoint = "http://10.0.0.5:8080"
spots = 5
poll_interval_ms = 500
threshold_cm = 18.5
"#;

        let config: ParkingConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.parking.total_spots, 5);
        assert_eq!(config.store.store_type, "file");
        assert_eq!(config.file.path, "/var/lib/parking/state.json");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.reporter.threshold_cm, 18.5);
        // Unset reporter fields fall back to defaults.
        assert_eq!(config.reporter.echo_timeout_ms, 30);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
[parking]
total_spots = 5
"#;
        let config: ParkingConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.parking.total_spots, 5);
        assert_eq!(config.parking.restricted_spots, 1);
        assert_eq!(config.store.store_type, "local");
    }

    #[test]
    fn test_invalid_capacity_is_a_configuration_error() {
        let toml = r#"
[parking]
total_spots = 2
restricted_spots = 3
"#;
        let config: ParkingConfig = toml::from_str(toml).unwrap();
        assert!(matches!(
            config.capacity(),
            Err(StoreError::ConfigurationError(_))
        ));
    }
}
