//! Validated request bodies.
//!
//! Every mutating endpoint deserializes into one of these structs through
//! [`ValidatedJson`], which turns malformed JSON and rule violations into a
//! 400 response listing the offending fields.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use validator::Validate;

use crate::constants::defaults;
use crate::database::{NewVehicle, SettingsUpdate, VehicleUpdate};
use crate::errors::ValidationError;
use crate::web::handlers::common::{error_response, ApiError, ApiResponse};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 100, message = "Vehicle name is required"))]
    pub name: String,

    #[validate(length(max = 100))]
    pub make: Option<String>,

    #[validate(length(max = 100))]
    pub model: Option<String>,

    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i64>,

    #[validate(length(max = 20))]
    pub license_plate: Option<String>,

    #[validate(length(max = 2048))]
    pub image_url: Option<String>,

    #[validate(range(min = 0, max = 2000000, message = "Mileage must be a non-negative number"))]
    pub current_mileage: Option<i64>,

    #[validate(range(min = 500, max = 50000))]
    pub mileage_interval: Option<i64>,

    #[validate(range(min = 1, max = 24))]
    pub interval_months: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 100, message = "Vehicle name must not be empty"))]
    pub name: Option<String>,

    #[validate(length(max = 100))]
    pub make: Option<String>,

    #[validate(length(max = 100))]
    pub model: Option<String>,

    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i64>,

    #[validate(length(max = 20))]
    pub license_plate: Option<String>,

    #[validate(length(max = 2048))]
    pub image_url: Option<String>,

    #[validate(range(min = 500, max = 50000))]
    pub mileage_interval: Option<i64>,

    #[validate(range(min = 1, max = 24))]
    pub interval_months: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordServiceRequest {
    #[validate(length(min = 1, message = "Vehicle ID is required"))]
    pub vehicle_id: String,

    #[validate(range(min = 0, max = 2000000, message = "Mileage must be a non-negative number"))]
    pub mileage_at_service: i64,

    /// Defaults to now
    pub service_date: Option<DateTime<Utc>>,

    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LogMileageRequest {
    #[validate(range(min = 0, max = 2000000, message = "Mileage must be a non-negative number"))]
    pub mileage: i64,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSettingsRequest {
    #[validate(length(max = 100))]
    pub name: Option<String>,

    #[validate(length(max = 30))]
    pub phone: Option<String>,

    pub email_notifications_enabled: Option<bool>,

    pub sms_notifications_enabled: Option<bool>,

    #[validate(range(min = 50, max = 500, message = "Mileage threshold must be between 50 and 500"))]
    pub notification_mileage_threshold: Option<i64>,

    #[validate(range(min = 3, max = 30, message = "Days threshold must be between 3 and 30"))]
    pub notification_days_threshold: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FcmTokenRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

impl From<CreateVehicleRequest> for NewVehicle {
    fn from(request: CreateVehicleRequest) -> Self {
        Self {
            name: request.name.trim().to_string(),
            make: request.make,
            model: request.model,
            year: request.year,
            license_plate: request.license_plate,
            image_url: request.image_url,
            current_mileage: request.current_mileage,
            mileage_interval: request
                .mileage_interval
                .unwrap_or(defaults::MILEAGE_INTERVAL),
            interval_months: request
                .interval_months
                .unwrap_or(defaults::TIME_INTERVAL_MONTHS),
        }
    }
}

impl From<UpdateVehicleRequest> for VehicleUpdate {
    fn from(request: UpdateVehicleRequest) -> Self {
        Self {
            name: request.name.map(|n| n.trim().to_string()),
            make: request.make,
            model: request.model,
            year: request.year,
            license_plate: request.license_plate,
            image_url: request.image_url,
            mileage_interval: request.mileage_interval,
            interval_months: request.interval_months,
        }
    }
}

impl From<UpdateSettingsRequest> for SettingsUpdate {
    fn from(request: UpdateSettingsRequest) -> Self {
        Self {
            name: request.name,
            phone: request.phone,
            email_notifications_enabled: request.email_notifications_enabled,
            sms_notifications_enabled: request.sms_notifications_enabled,
            notification_mileage_threshold: request.notification_mileage_threshold,
            notification_days_threshold: request.notification_days_threshold,
        }
    }
}

/// JSON body extractor that runs the `validator` rules before the handler sees the value
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(reject_json)?;

        value.validate().map_err(|errors| {
            let error = ValidationError::from(errors);
            debug!("Request rejected: {}", error);
            error_response(error.into())
        })?;

        Ok(ValidatedJson(value))
    }
}

fn reject_json(rejection: JsonRejection) -> ApiError {
    debug!("Malformed request body: {}", rejection.body_text());
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::error(rejection.body_text())),
    )
}
