// File: tracker/src/web/server.rs
use crate::web::{handlers, AppState};
use anyhow::Result;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub async fn start_web_server(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // === SWEEP TRIGGER ===
        .route("/api/cron/check-vehicles", get(handlers::check_vehicles))
        // === VEHICLE ROUTES ===
        .route(
            "/api/vehicles",
            get(handlers::list_vehicles).post(handlers::create_vehicle),
        )
        .route(
            "/api/vehicles/{vehicle_id}",
            get(handlers::get_vehicle)
                .patch(handlers::update_vehicle)
                .delete(handlers::delete_vehicle),
        )
        .route(
            "/api/vehicles/{vehicle_id}/mileage",
            post(handlers::log_mileage),
        )
        // === SERVICE AND MILEAGE HISTORY ===
        .route("/api/oil-changes", post(handlers::record_oil_change))
        .route(
            "/api/mileage-history/{entry_id}",
            delete(handlers::delete_mileage_entry),
        )
        // === OWNER SETTINGS ===
        .route(
            "/api/settings",
            get(handlers::get_settings).patch(handlers::update_settings),
        )
        .route("/api/fcm-token", post(handlers::register_fcm_token))
        .route(
            "/api/test-notifications",
            get(handlers::send_test_notification),
        )
        // === LIVENESS ===
        .route("/api/health", get(handlers::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
