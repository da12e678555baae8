//! Router configuration for the HTTP API.
//!
//! Sets up all routes and middleware (CORS, tracing) and returns the axum
//! router ready for serving.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS for the browser front-ends; restrict in production.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Occupancy & reservations
        .route("/status", get(handlers::get_status))
        .route("/reserve", post(handlers::reserve))
        .route("/cancel/{id}", delete(handlers::cancel))
        .route("/reservations", get(handlers::list_reservations))
        .route("/verify", post(handlers::verify))
        // Plate registry
        .route("/plates", get(handlers::list_plates))
        .route("/plates", post(handlers::replace_plates))
        .route("/plates/{spot}", put(handlers::update_plate))
        .route("/plates/{spot}", delete(handlers::delete_plate))
        .route("/verify_plate", post(handlers::verify_plate))
        .route("/access-log", get(handlers::access_log))
        // Sensors
        .route("/sensors", get(handlers::sensor_overview))
        .route("/sensors/report", post(handlers::sensor_report));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(all(test, feature = "local-store"))]
mod tests {
    use super::*;
    use crate::ledger::CapacityConfig;
    use crate::store::{FullStore, LocalStore};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn app() -> Router {
        let store =
            Arc::new(LocalStore::new(CapacityConfig::new(5, 1).unwrap())) as Arc<dyn FullStore>;
        create_router(AppState::new(store))
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_status_route() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/nonsense")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
