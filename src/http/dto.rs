//! Data Transfer Objects for the HTTP API.
//!
//! The wire types live in `crate::api` so the typed client and the file
//! store share them; this module re-exports them for handler code and adds
//! the few server-only query types.

use serde::{Deserialize, Serialize};

pub use crate::api::{
    AccessLogResponse, HealthResponse, PlateUpdateRequest, PlatesReplaceRequest, PlatesResponse,
    ReservationsResponse, ReserveRequest, ReserveResponse, SensorReportRequest,
    SensorReportResponse, SensorsResponse, SimpleResponse, StatusData, StatusResponse,
    VerifyPlateRequest, VerifyPlateResponse, VerifyRequest, VerifyResponse,
};

/// Query parameters for the access-log endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AccessLogQuery {
    /// Number of entries to return, newest first (default 50).
    #[serde(default)]
    pub limit: Option<usize>,
}
