// Liveness endpoint

use axum::{extract::State, response::Json};
use serde::Serialize;

use super::common::{ApiResponse, ApiResult};
use crate::sweep_tracker::ActiveSweep;
use crate::web::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Set while a sweep is in progress
    pub active_sweep: Option<ActiveSweep>,
}

pub async fn health(State(state): State<AppState>) -> ApiResult<HealthResponse> {
    let active_sweep = state.sweep_service.tracker().current();

    Ok(Json(ApiResponse::success(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        active_sweep,
    })))
}
