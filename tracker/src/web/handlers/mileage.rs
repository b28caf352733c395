// Mileage history endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use tracing::info;

use super::common::{api_error, internal_error, not_found, ApiError, ApiResponse, ApiResult};
use crate::database::{MileageDeletion, MileageEntry};
use crate::validation::{LogMileageRequest, ValidatedJson};
use crate::web::middleware::CurrentUser;
use crate::web::AppState;

/// Log an odometer reading, which becomes the vehicle's current mileage
pub async fn log_mileage(
    CurrentUser(user): CurrentUser,
    Path(vehicle_id): Path<String>,
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LogMileageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MileageEntry>>), ApiError> {
    let vehicle = state
        .database
        .get_vehicle(&user.id, &vehicle_id)
        .await
        .map_err(|e| internal_error("Failed to load vehicle", e))?
        .ok_or_else(|| not_found("Vehicle"))?;

    let entry = state
        .database
        .log_mileage(&vehicle.id, request.mileage)
        .await
        .map_err(|e| internal_error("Failed to log mileage", e))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(entry))))
}

pub async fn delete_mileage_entry(
    CurrentUser(user): CurrentUser,
    Path(entry_id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Value> {
    let deletion = state
        .database
        .delete_mileage_entry(&user.id, &entry_id)
        .await
        .map_err(|e| internal_error("Failed to delete mileage entry", e))?;

    match deletion {
        MileageDeletion::NotFound => Err(not_found("Mileage history entry")),
        MileageDeletion::Forbidden => Err(api_error(StatusCode::FORBIDDEN, "Forbidden")),
        MileageDeletion::Deleted {
            vehicle_id,
            current_mileage,
        } => {
            info!("User {} deleted mileage entry {}", user.id, entry_id);
            Ok(Json(ApiResponse::success(json!({
                "vehicle_id": vehicle_id,
                "current_mileage": current_mileage
            }))))
        }
    }
}
