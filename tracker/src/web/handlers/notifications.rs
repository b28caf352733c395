// Sample notification for checking provider setup

use axum::{extract::State, response::Json};
use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::info;

use super::common::{ApiResponse, ApiResult};
use crate::constants::test_notification;
use crate::due_status::{evaluate, LastService, Thresholds};
use crate::services::{DispatchReport, NotificationContent, Recipient};
use crate::web::middleware::CurrentUser;
use crate::web::AppState;

#[derive(Debug, Serialize)]
pub struct TestNotificationResponse {
    pub message: String,
    pub report: DispatchReport,
}

/// Dispatch a fixed sample notification to the signed-in owner. Nothing is logged
/// to the notification history, so the sweep's dedup window is unaffected.
pub async fn send_test_notification(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> ApiResult<TestNotificationResponse> {
    let now = Utc::now();
    let next_due_date = now + Duration::days(test_notification::DAYS_UNTIL_DUE);
    let last_service = LastService {
        mileage_at_service: test_notification::NEXT_DUE_MILEAGE
            - crate::constants::defaults::MILEAGE_INTERVAL,
        next_due_mileage: test_notification::NEXT_DUE_MILEAGE,
        next_due_date,
    };
    let status = evaluate(
        Some(test_notification::CURRENT_MILEAGE),
        &last_service,
        now,
        Thresholds::default(),
    );

    let content = NotificationContent {
        vehicle_name: test_notification::VEHICLE_NAME.to_string(),
        current_mileage: Some(test_notification::CURRENT_MILEAGE),
        next_due_mileage: test_notification::NEXT_DUE_MILEAGE,
        next_due_date,
        status,
        reason: status.reason(),
    };

    let report = state
        .dispatcher
        .dispatch(&Recipient::from(&user), &content)
        .await;

    info!("Test notification for user {}: {:?}", user.id, report);

    let message = if report.any_delivered() {
        "Test notification sent".to_string()
    } else {
        "Test notification was not delivered on any channel".to_string()
    };

    Ok(Json(ApiResponse::success(TestNotificationResponse {
        message,
        report,
    })))
}
