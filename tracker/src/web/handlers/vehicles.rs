// Vehicle CRUD endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::common::{internal_error, not_found, ApiError, ApiResponse, ApiResult};
use crate::database::{MileageEntry, ServiceRecord, UserRecord, VehicleRecord};
use crate::due_status::{evaluate, DueStatus, LastService, Thresholds};
use crate::validation::{CreateVehicleRequest, UpdateVehicleRequest, ValidatedJson};
use crate::web::middleware::CurrentUser;
use crate::web::AppState;

#[derive(Debug, Serialize)]
pub struct VehicleOverview {
    #[serde(flatten)]
    pub vehicle: VehicleRecord,
    pub latest_service: Option<ServiceRecord>,
    pub mileage_history: Vec<MileageEntry>,
    pub due_status: Option<DueStatus>,
}

#[derive(Debug, Serialize)]
pub struct VehicleDetail {
    #[serde(flatten)]
    pub vehicle: VehicleRecord,
    pub service_records: Vec<ServiceRecord>,
    pub mileage_history: Vec<MileageEntry>,
    pub due_status: Option<DueStatus>,
}

/// Dashboard view of the due status; invalid stored thresholds fall back to the defaults
fn due_status_for(
    owner: &UserRecord,
    vehicle: &VehicleRecord,
    service: Option<&ServiceRecord>,
) -> Option<DueStatus> {
    let service = service?;
    let thresholds = owner.thresholds().unwrap_or_else(|e| {
        warn!("Using default thresholds for user {}: {}", owner.id, e);
        Thresholds::default()
    });

    Some(evaluate(
        vehicle.current_mileage,
        &LastService::from(service),
        Utc::now(),
        thresholds,
    ))
}

/// List the owner's vehicles with their latest service and due status
pub async fn list_vehicles(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> ApiResult<Vec<VehicleOverview>> {
    let vehicles = state
        .database
        .list_vehicles(&user.id)
        .await
        .map_err(|e| internal_error("Failed to list vehicles", e))?;

    let mut overviews = Vec::with_capacity(vehicles.len());
    for vehicle in vehicles {
        let latest_service = state
            .database
            .latest_service_record(&vehicle.id)
            .await
            .map_err(|e| internal_error("Failed to load service record", e))?;
        let mileage_history = state
            .database
            .list_mileage_history(&vehicle.id)
            .await
            .map_err(|e| internal_error("Failed to load mileage history", e))?;

        let due_status = due_status_for(&user, &vehicle, latest_service.as_ref());
        overviews.push(VehicleOverview {
            vehicle,
            latest_service,
            mileage_history,
            due_status,
        });
    }

    Ok(Json(ApiResponse::success(overviews)))
}

pub async fn create_vehicle(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<VehicleRecord>>), ApiError> {
    let vehicle = state
        .database
        .create_vehicle(&user.id, &request.into())
        .await
        .map_err(|e| internal_error("Failed to create vehicle", e))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(vehicle))))
}

/// Vehicle with its full service and mileage history
pub async fn get_vehicle(
    CurrentUser(user): CurrentUser,
    Path(vehicle_id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<VehicleDetail> {
    let vehicle = state
        .database
        .get_vehicle(&user.id, &vehicle_id)
        .await
        .map_err(|e| internal_error("Failed to load vehicle", e))?
        .ok_or_else(|| not_found("Vehicle"))?;

    let service_records = state
        .database
        .list_service_records(&vehicle.id)
        .await
        .map_err(|e| internal_error("Failed to load service records", e))?;
    let mileage_history = state
        .database
        .list_mileage_history(&vehicle.id)
        .await
        .map_err(|e| internal_error("Failed to load mileage history", e))?;

    let due_status = due_status_for(&user, &vehicle, service_records.first());

    Ok(Json(ApiResponse::success(VehicleDetail {
        vehicle,
        service_records,
        mileage_history,
        due_status,
    })))
}

pub async fn update_vehicle(
    CurrentUser(user): CurrentUser,
    Path(vehicle_id): Path<String>,
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<UpdateVehicleRequest>,
) -> ApiResult<VehicleRecord> {
    let vehicle = state
        .database
        .update_vehicle(&user.id, &vehicle_id, &request.into())
        .await
        .map_err(|e| internal_error("Failed to update vehicle", e))?
        .ok_or_else(|| not_found("Vehicle"))?;

    Ok(Json(ApiResponse::success(vehicle)))
}

pub async fn delete_vehicle(
    CurrentUser(user): CurrentUser,
    Path(vehicle_id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Value> {
    let deleted = state
        .database
        .delete_vehicle(&user.id, &vehicle_id)
        .await
        .map_err(|e| internal_error("Failed to delete vehicle", e))?;

    if !deleted {
        return Err(not_found("Vehicle"));
    }

    info!("User {} deleted vehicle {}", user.id, vehicle_id);
    Ok(Json(ApiResponse::success(json!({ "deleted": vehicle_id }))))
}
