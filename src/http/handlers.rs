//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the store
//! service layer for business logic.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    AccessLogQuery, AccessLogResponse, HealthResponse, PlateUpdateRequest, PlatesReplaceRequest,
    PlatesResponse, ReservationsResponse, ReserveRequest, ReserveResponse, SensorReportRequest,
    SensorReportResponse, SensorsResponse, SimpleResponse, StatusResponse, VerifyPlateRequest,
    VerifyPlateResponse, VerifyRequest, VerifyResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::ReservationId;
use crate::store::services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the store is
/// usable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let store_status = match services::health_check(state.store.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "degraded".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        store: store_status,
    }))
}

// =============================================================================
// Occupancy & Reservations
// =============================================================================

/// GET /api/status
///
/// Read-only occupancy snapshot.
pub async fn get_status(State(state): State<AppState>) -> HandlerResult<StatusResponse> {
    let status = services::get_status(state.store.as_ref()).await?;
    Ok(Json(StatusResponse {
        success: true,
        data: status.into(),
    }))
}

/// POST /api/reserve
///
/// Claim one free spot. Rejections name the violated constraint: 409 with a
/// distinct message for general vs restricted exhaustion, 400 for a missing
/// user name.
pub async fn reserve(
    State(state): State<AppState>,
    Json(request): Json<ReserveRequest>,
) -> Result<(StatusCode, Json<ReserveResponse>), AppError> {
    let reservation = services::reserve_spot(
        state.store.as_ref(),
        request.spot_type,
        request.user_name.as_deref(),
        request.attachment.as_deref(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReserveResponse {
            success: true,
            message: format!("Spot ({}) reserved", reservation.category),
            reservation_id: reservation.id,
            qr_value: reservation.qr_value,
            timestamp: reservation.timestamp,
        }),
    ))
}

/// DELETE /api/cancel/{id}
///
/// Cancel a reservation, returning its spot to the free pool.
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<SimpleResponse> {
    let cancelled =
        services::cancel_reservation(state.store.as_ref(), ReservationId::new(id)).await?;
    Ok(Json(SimpleResponse::ok_with(format!(
        "Reservation {} cancelled",
        cancelled.id
    ))))
}

/// GET /api/reservations
///
/// All active reservations.
pub async fn list_reservations(
    State(state): State<AppState>,
) -> HandlerResult<ReservationsResponse> {
    let reservations = services::list_reservations(state.store.as_ref()).await?;
    let total_count = reservations.len();
    Ok(Json(ReservationsResponse {
        success: true,
        reservations,
        total_count,
    }))
}

/// POST /api/verify
///
/// Resolve a scanned code to its reservation; 403 when nothing matches.
pub async fn verify(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> HandlerResult<VerifyResponse> {
    let found = services::verify_code(state.store.as_ref(), request.code.as_deref()).await?;
    match found {
        Some(reservation) => Ok(Json(VerifyResponse {
            success: true,
            message: "Access granted".to_string(),
            reservation: Some(reservation),
        })),
        None => Err(AppError::Forbidden("Access denied".to_string())),
    }
}

// =============================================================================
// Plate Registry
// =============================================================================

/// GET /api/plates
pub async fn list_plates(State(state): State<AppState>) -> HandlerResult<PlatesResponse> {
    let plates = services::list_plates(state.store.as_ref()).await?;
    Ok(Json(PlatesResponse {
        success: true,
        plates,
    }))
}

/// POST /api/plates
///
/// Replace the whole plate registry.
pub async fn replace_plates(
    State(state): State<AppState>,
    Json(request): Json<PlatesReplaceRequest>,
) -> HandlerResult<SimpleResponse> {
    services::replace_plates(state.store.as_ref(), request.plates).await?;
    Ok(Json(SimpleResponse::ok()))
}

/// PUT /api/plates/{spot}
pub async fn update_plate(
    State(state): State<AppState>,
    Path(spot): Path<u32>,
    Json(request): Json<PlateUpdateRequest>,
) -> HandlerResult<SimpleResponse> {
    services::set_plate(state.store.as_ref(), spot, request.plate.as_deref()).await?;
    Ok(Json(SimpleResponse::ok()))
}

/// DELETE /api/plates/{spot}
pub async fn delete_plate(
    State(state): State<AppState>,
    Path(spot): Path<u32>,
) -> HandlerResult<SimpleResponse> {
    let removed = services::remove_plate(state.store.as_ref(), spot).await?;
    if !removed {
        return Err(AppError::NotFound(format!(
            "No plate assigned to spot {}",
            spot
        )));
    }
    Ok(Json(SimpleResponse::ok()))
}

/// POST /api/verify_plate
///
/// Check a plate against the registry. Always 200; `success` carries the
/// verdict and the attempt lands in the access log either way.
pub async fn verify_plate(
    State(state): State<AppState>,
    Json(request): Json<VerifyPlateRequest>,
) -> HandlerResult<VerifyPlateResponse> {
    let (granted, spot) =
        services::verify_plate(state.store.as_ref(), request.plate.as_deref()).await?;
    Ok(Json(VerifyPlateResponse {
        success: granted,
        spot,
    }))
}

/// GET /api/access-log
pub async fn access_log(
    State(state): State<AppState>,
    Query(query): Query<AccessLogQuery>,
) -> HandlerResult<AccessLogResponse> {
    let limit = query.limit.unwrap_or(50);
    let entries = services::recent_access(state.store.as_ref(), limit).await?;
    Ok(Json(AccessLogResponse {
        success: true,
        entries,
    }))
}

// =============================================================================
// Sensors
// =============================================================================

/// GET /api/sensors
///
/// Last known sensor-derived occupancy per spot.
pub async fn sensor_overview(State(state): State<AppState>) -> HandlerResult<SensorsResponse> {
    let spots = services::sensor_overview(state.store.as_ref()).await?;
    Ok(Json(SensorsResponse {
        success: true,
        spots,
    }))
}

/// POST /api/sensors/report
///
/// Apply one occupancy report from the sensor daemon.
pub async fn sensor_report(
    State(state): State<AppState>,
    Json(request): Json<SensorReportRequest>,
) -> HandlerResult<SensorReportResponse> {
    let update =
        services::record_sensor_report(state.store.as_ref(), request.spot, request.status).await?;
    Ok(Json(SensorReportResponse {
        success: true,
        spot: update.spot,
        occupied: update.occupied,
        changed: update.changed,
    }))
}
