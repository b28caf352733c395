// Service (oil change) recording

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;

use super::common::{api_error, internal_error, not_found, ApiError, ApiResponse};
use crate::database::ServiceRecord;
use crate::validation::{RecordServiceRequest, ValidatedJson};
use crate::web::middleware::CurrentUser;
use crate::web::AppState;

/// Record an oil change; next-due values come from the vehicle's intervals
pub async fn record_oil_change(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RecordServiceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ServiceRecord>>), ApiError> {
    let vehicle = state
        .database
        .get_vehicle(&user.id, &request.vehicle_id)
        .await
        .map_err(|e| internal_error("Failed to load vehicle", e))?
        .ok_or_else(|| not_found("Vehicle"))?;

    let service_date = request.service_date.unwrap_or_else(Utc::now);
    if service_date > Utc::now() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Service date cannot be in the future",
        ));
    }

    let record = state
        .database
        .record_service(&vehicle, request.mileage_at_service, service_date, request.notes)
        .await
        .map_err(|e| internal_error("Failed to record oil change", e))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))))
}
