//! Public API surface for the parking backend.
//!
//! This file consolidates the domain types and the DTO types for the HTTP
//! API. All types derive Serialize/Deserialize so the server, the typed
//! client, and the file store share one JSON contract instead of three
//! drifting copies of it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==================== Identifiers ====================

/// Reservation identifier, minted from the ledger's monotone counter.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ReservationId(pub i64);

impl ReservationId {
    pub fn new(value: i64) -> Self {
        ReservationId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==================== Spot categories ====================

/// Category of a parking spot.
///
/// The wire names follow the deployed JSON contract: `"standard"` for
/// ordinary spots and `"invalid"` for the restricted (accessibility)
/// category. `"obicno"` is accepted on input for compatibility with the
/// first-generation clients.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpotCategory {
    #[default]
    #[serde(alias = "obicno")]
    Standard,
    #[serde(rename = "invalid")]
    Restricted,
}

impl SpotCategory {
    /// Wire name as used in request/response bodies and QR values.
    pub fn wire_name(&self) -> &'static str {
        match self {
            SpotCategory::Standard => "standard",
            SpotCategory::Restricted => "invalid",
        }
    }
}

impl fmt::Display for SpotCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for SpotCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" | "obicno" => Ok(SpotCategory::Standard),
            "invalid" | "restricted" => Ok(SpotCategory::Restricted),
            _ => Err(format!("Unknown spot category: {}", s)),
        }
    }
}

// ==================== Reservations ====================

/// A single admission-controlled claim on one free spot.
///
/// Owned by the store that persists it; the ledger itself only keeps
/// aggregate counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    #[serde(rename = "type")]
    pub category: SpotCategory,
    /// Opaque identifying token: user name, license plate, or sensor index.
    pub user_name: String,
    /// Opaque attachment reference supplied with the request, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub qr_value: String,
}

impl Reservation {
    /// Mint a reservation record for a freshly issued id.
    ///
    /// The QR value format (`Parking-{CATEGORY}-{id}-{timestamp}`) is part of
    /// the deployed contract; scanners match on it verbatim.
    pub fn new(
        id: ReservationId,
        category: SpotCategory,
        user_name: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let qr_value = format!(
            "Parking-{}-{}-{}",
            category.wire_name().to_uppercase(),
            id.value(),
            timestamp.to_rfc3339(),
        );
        Self {
            id,
            category,
            user_name: user_name.into(),
            attachment: None,
            timestamp,
            qr_value,
        }
    }

    /// Attach an opaque reference (e.g. an uploaded document id).
    pub fn with_attachment(mut self, attachment: Option<String>) -> Self {
        self.attachment = attachment;
        self
    }
}

// ==================== Status ====================

/// Aggregate occupancy view returned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingStatus {
    pub total_spots: u32,
    pub restricted_spots: u32,
    pub available_total: u32,
    pub available_restricted: u32,
    pub reserved_count: usize,
}

// ==================== Plates ====================

/// Assignment of an identifying plate to a spot slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateAssignment {
    pub spot: u32,
    pub plate: String,
}

/// Normalize a plate for comparison: strip whitespace, uppercase.
pub fn normalize_plate(plate: &str) -> String {
    plate.split_whitespace().collect::<String>().to_uppercase()
}

/// One entry in the plate-verification audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRecord {
    pub time: DateTime<Utc>,
    pub plate: String,
    pub spot: Option<u32>,
    pub granted: bool,
}

// ==================== Sensor occupancy ====================

/// Reported state of a physical spot, as seen by its distance sensor.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpotState {
    Occupied,
    Free,
}

impl SpotState {
    pub fn is_occupied(&self) -> bool {
        matches!(self, SpotState::Occupied)
    }

    pub fn from_occupied(occupied: bool) -> Self {
        if occupied {
            SpotState::Occupied
        } else {
            SpotState::Free
        }
    }
}

/// Last known sensor-derived occupancy of one physical spot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotOccupancy {
    pub spot: u32,
    pub occupied: bool,
    pub last_update: DateTime<Utc>,
}

/// Outcome of applying one sensor report to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorUpdate {
    pub spot: u32,
    pub occupied: bool,
    /// Whether this report flipped the previously recorded state.
    pub changed: bool,
    pub timestamp: DateTime<Utc>,
}

// ==================== Wire DTOs (requests) ====================

/// Request body for `POST /api/reserve`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReserveRequest {
    #[serde(default)]
    pub spot_type: SpotCategory,
    /// Required; rejected with `InvalidInput` when missing or blank.
    #[serde(default)]
    pub user_name: Option<String>,
    /// Optional opaque attachment reference.
    #[serde(default)]
    pub attachment: Option<String>,
}

/// Request body for `POST /api/verify`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VerifyRequest {
    #[serde(default)]
    pub code: Option<String>,
}

/// Request body for `PUT /api/plates/{spot}`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlateUpdateRequest {
    #[serde(default)]
    pub plate: Option<String>,
}

/// Request body for `POST /api/plates` (bulk replace).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlatesReplaceRequest {
    #[serde(default)]
    pub plates: Vec<PlateAssignment>,
}

/// Request body for `POST /api/verify_plate`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VerifyPlateRequest {
    #[serde(default)]
    pub plate: Option<String>,
}

/// Request body for `POST /api/sensors/report`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensorReportRequest {
    pub spot: u32,
    pub status: SpotState,
}

// ==================== Wire DTOs (responses) ====================

/// Response body for `GET /api/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    pub data: StatusData,
}

/// Occupancy counts as exposed on the wire.
///
/// `available_invalid` / `invalid_spots` are the restricted-category fields;
/// the names are pinned by the deployed contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusData {
    pub available_total: u32,
    pub available_invalid: u32,
    pub total_spots: u32,
    pub invalid_spots: u32,
    pub reserved_count: usize,
}

impl From<ParkingStatus> for StatusData {
    fn from(status: ParkingStatus) -> Self {
        Self {
            available_total: status.available_total,
            available_invalid: status.available_restricted,
            total_spots: status.total_spots,
            invalid_spots: status.restricted_spots,
            reserved_count: status.reserved_count,
        }
    }
}

/// Response body for `POST /api/reserve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveResponse {
    pub success: bool,
    pub message: String,
    pub reservation_id: ReservationId,
    pub qr_value: String,
    pub timestamp: DateTime<Utc>,
}

/// Generic success/message envelope used by cancel, plate and verify routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SimpleResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn ok_with(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

/// Response body for `GET /api/reservations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationsResponse {
    pub success: bool,
    pub reservations: Vec<Reservation>,
    pub total_count: usize,
}

/// Response body for `POST /api/verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation: Option<Reservation>,
}

/// Response body for `GET /api/plates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatesResponse {
    pub success: bool,
    pub plates: Vec<PlateAssignment>,
}

/// Response body for `POST /api/verify_plate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPlateResponse {
    pub success: bool,
    pub spot: Option<u32>,
}

/// Response body for `GET /api/access-log`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessLogResponse {
    pub success: bool,
    pub entries: Vec<AccessRecord>,
}

/// Response body for `GET /api/sensors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorsResponse {
    pub success: bool,
    pub spots: Vec<SpotOccupancy>,
}

/// Response body for `POST /api/sensors/report`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReportResponse {
    pub success: bool,
    pub spot: u32,
    pub occupied: bool,
    pub changed: bool,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: String,
}
