//! Typed HTTP client for the parking API.
//!
//! Wraps `reqwest::Client` with parking-specific URL construction, envelope
//! handling, and a cached-status fallback. Every request carries the
//! configured timeout; a transport failure is downgraded to
//! [`ClientError::NetworkUnavailable`] so callers can fall back to the last
//! known status instead of blocking indefinitely.

use std::time::Duration;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::{
    PlateAssignment, PlatesReplaceRequest, PlatesResponse, Reservation, ReservationId,
    ReservationsResponse, ReserveRequest, ReserveResponse, SensorReportRequest,
    SensorReportResponse, SensorsResponse, SimpleResponse, SpotCategory, SpotOccupancy, SpotState,
    StatusData, StatusResponse, VerifyPlateRequest, VerifyPlateResponse, VerifyRequest,
    VerifyResponse, PlateUpdateRequest,
};

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The remote call failed or timed out; fall back to cached state.
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// The server rejected the request; `message` resurfaces its reason.
    #[error("request rejected ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else {
            ClientError::NetworkUnavailable(err.to_string())
        }
    }
}

/// Typed client for a remote parking server.
pub struct ParkingClient {
    http: reqwest::Client,
    base_url: String,
    /// Last successfully fetched status, served when the server is away.
    cached_status: RwLock<Option<StatusData>>,
}

impl ParkingClient {
    /// Create a client for `base_url` (e.g. `http://127.0.0.1:8080`) with a
    /// hard per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cached_status: RwLock::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// Unwrap a response: success statuses parse as `T`, error statuses parse
    /// the `{success, message}` envelope into [`ClientError::Api`].
    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let message = match response.json::<SimpleResponse>().await {
            Ok(body) => body.message.unwrap_or_else(|| status.to_string()),
            Err(_) => status.to_string(),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    // ==================== Status ====================

    /// Fetch the current occupancy status, refreshing the cache.
    pub async fn status(&self) -> ClientResult<StatusData> {
        let response = self.http.get(self.url("status")).send().await?;
        let parsed: StatusResponse = Self::parse(response).await?;
        *self.cached_status.write() = Some(parsed.data);
        Ok(parsed.data)
    }

    /// The last successfully fetched status, if any.
    pub fn cached_status(&self) -> Option<StatusData> {
        *self.cached_status.read()
    }

    /// Fetch the status, falling back to the cached value when the server
    /// is unreachable. Only a cold cache surfaces the network error.
    pub async fn status_or_cached(&self) -> ClientResult<StatusData> {
        match self.status().await {
            Ok(data) => Ok(data),
            Err(ClientError::NetworkUnavailable(reason)) => {
                let cached = *self.cached_status.read();
                match cached {
                    Some(data) => {
                        warn!(%reason, "status fetch failed, serving cached status");
                        Ok(data)
                    }
                    None => Err(ClientError::NetworkUnavailable(reason)),
                }
            }
            Err(e) => Err(e),
        }
    }

    // ==================== Reservations ====================

    /// Reserve one spot of `category` for the named user.
    pub async fn reserve(
        &self,
        category: SpotCategory,
        user_name: impl Into<String>,
    ) -> ClientResult<ReserveResponse> {
        self.reserve_with_attachment(category, user_name, None).await
    }

    /// Reserve with an optional opaque attachment reference.
    pub async fn reserve_with_attachment(
        &self,
        category: SpotCategory,
        user_name: impl Into<String>,
        attachment: Option<String>,
    ) -> ClientResult<ReserveResponse> {
        let request = ReserveRequest {
            spot_type: category,
            user_name: Some(user_name.into()),
            attachment,
        };
        let response = self
            .http
            .post(self.url("reserve"))
            .json(&request)
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Cancel a reservation by id.
    pub async fn cancel(&self, id: ReservationId) -> ClientResult<SimpleResponse> {
        let response = self
            .http
            .delete(self.url(&format!("cancel/{}", id)))
            .send()
            .await?;
        Self::parse(response).await
    }

    /// All active reservations.
    pub async fn reservations(&self) -> ClientResult<Vec<Reservation>> {
        let response = self.http.get(self.url("reservations")).send().await?;
        let parsed: ReservationsResponse = Self::parse(response).await?;
        Ok(parsed.reservations)
    }

    /// Resolve a scanned code; `None` means access was denied.
    pub async fn verify(&self, code: impl Into<String>) -> ClientResult<Option<Reservation>> {
        let request = VerifyRequest {
            code: Some(code.into()),
        };
        let response = self
            .http
            .post(self.url("verify"))
            .json(&request)
            .send()
            .await?;
        match Self::parse::<VerifyResponse>(response).await {
            Ok(parsed) => Ok(parsed.reservation),
            Err(ClientError::Api { status: 403, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    // ==================== Plates ====================

    /// All plate assignments.
    pub async fn plates(&self) -> ClientResult<Vec<PlateAssignment>> {
        let response = self.http.get(self.url("plates")).send().await?;
        let parsed: PlatesResponse = Self::parse(response).await?;
        Ok(parsed.plates)
    }

    /// Assign a plate to a spot slot.
    pub async fn assign_plate(&self, spot: u32, plate: impl Into<String>) -> ClientResult<()> {
        let request = PlateUpdateRequest {
            plate: Some(plate.into()),
        };
        let response = self
            .http
            .put(self.url(&format!("plates/{}", spot)))
            .json(&request)
            .send()
            .await?;
        Self::parse::<SimpleResponse>(response).await.map(|_| ())
    }

    /// Remove the plate assignment for a spot.
    pub async fn remove_plate(&self, spot: u32) -> ClientResult<()> {
        let response = self
            .http
            .delete(self.url(&format!("plates/{}", spot)))
            .send()
            .await?;
        Self::parse::<SimpleResponse>(response).await.map(|_| ())
    }

    /// Replace the whole plate registry.
    pub async fn replace_plates(&self, plates: Vec<PlateAssignment>) -> ClientResult<()> {
        let request = PlatesReplaceRequest { plates };
        let response = self
            .http
            .post(self.url("plates"))
            .json(&request)
            .send()
            .await?;
        Self::parse::<SimpleResponse>(response).await.map(|_| ())
    }

    /// Check a plate against the registry: `(granted, spot)`.
    pub async fn verify_plate(
        &self,
        plate: impl Into<String>,
    ) -> ClientResult<(bool, Option<u32>)> {
        let request = VerifyPlateRequest {
            plate: Some(plate.into()),
        };
        let response = self
            .http
            .post(self.url("verify_plate"))
            .json(&request)
            .send()
            .await?;
        let parsed: VerifyPlateResponse = Self::parse(response).await?;
        Ok((parsed.success, parsed.spot))
    }

    // ==================== Sensors ====================

    /// Last known sensor-derived occupancy per spot.
    pub async fn sensors(&self) -> ClientResult<Vec<SpotOccupancy>> {
        let response = self.http.get(self.url("sensors")).send().await?;
        let parsed: SensorsResponse = Self::parse(response).await?;
        Ok(parsed.spots)
    }

    /// Forward one occupancy transition, fire-and-forget.
    ///
    /// The response body is logged but never drives control flow, and there
    /// is no retry; a lost report is corrected by the next transition.
    pub async fn report_transition(&self, spot: u32, occupied: bool) -> ClientResult<()> {
        let request = SensorReportRequest {
            spot,
            status: SpotState::from_occupied(occupied),
        };
        let response = self
            .http
            .post(self.url("sensors/report"))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        match response.json::<SensorReportResponse>().await {
            Ok(body) => debug!(
                spot = body.spot,
                occupied = body.occupied,
                changed = body.changed,
                "transition reported"
            ),
            Err(_) => debug!(%status, "transition reported (unparsed body)"),
        }
        Ok(())
    }
}
