// Sweep trigger endpoint for the external scheduler

use axum::{extract::State, response::Json};
use serde::Serialize;
use tracing::info;

use super::common::{error_response, ApiError};
use crate::services::SweepSummary;
use crate::sweep_tracker::SweepTrigger;
use crate::web::middleware::CronAuth;
use crate::web::AppState;

/// Bare summary, the scheduler does not understand the `ApiResponse` envelope
#[derive(Serialize)]
pub struct CronResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: SweepSummary,
}

/// Run one sweep over every vehicle
pub async fn check_vehicles(
    _auth: CronAuth,
    State(state): State<AppState>,
) -> Result<Json<CronResponse>, ApiError> {
    info!("Sweep requested by external scheduler");

    let summary = state
        .sweep_service
        .run(SweepTrigger::Endpoint)
        .await
        .map_err(|e| error_response(e.into()))?;

    Ok(Json(CronResponse {
        success: true,
        summary,
    }))
}
