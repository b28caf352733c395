// Owner settings and push token registration

use axum::{extract::State, response::Json};
use serde::Serialize;
use serde_json::{json, Value};

use super::common::{internal_error, not_found, ApiResponse, ApiResult};
use crate::database::UserRecord;
use crate::validation::{FcmTokenRequest, UpdateSettingsRequest, ValidatedJson};
use crate::web::middleware::CurrentUser;
use crate::web::AppState;

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email_notifications_enabled: bool,
    pub sms_notifications_enabled: bool,
    pub notification_mileage_threshold: i64,
    pub notification_days_threshold: i64,
    pub push_enabled: bool,
}

impl From<UserRecord> for SettingsResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            push_enabled: user.fcm_token.as_deref().is_some_and(|t| !t.is_empty()),
            email: user.email,
            name: user.name,
            phone: user.phone,
            email_notifications_enabled: user.email_notifications_enabled,
            sms_notifications_enabled: user.sms_notifications_enabled,
            notification_mileage_threshold: user.notification_mileage_threshold,
            notification_days_threshold: user.notification_days_threshold,
        }
    }
}

pub async fn get_settings(CurrentUser(user): CurrentUser) -> ApiResult<SettingsResponse> {
    Ok(Json(ApiResponse::success(user.into())))
}

pub async fn update_settings(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<UpdateSettingsRequest>,
) -> ApiResult<SettingsResponse> {
    let updated = state
        .database
        .update_settings(&user.id, &request.into())
        .await
        .map_err(|e| internal_error("Failed to update settings", e))?
        .ok_or_else(|| not_found("User"))?;

    Ok(Json(ApiResponse::success(updated.into())))
}

pub async fn register_fcm_token(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<FcmTokenRequest>,
) -> ApiResult<Value> {
    let stored = state
        .database
        .set_fcm_token(&user.id, request.token.trim())
        .await
        .map_err(|e| internal_error("Failed to store push token", e))?;

    if !stored {
        return Err(not_found("User"));
    }

    Ok(Json(ApiResponse::success(json!({ "registered": true }))))
}
