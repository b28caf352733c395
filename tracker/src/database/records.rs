//! Database record types (entities).
//!
//! This module contains all the record structs used by the database layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::due_status::Thresholds;
use crate::errors::EvaluationError;
use crate::notification_policy::{DeliveryOutcome, NotificationClassification};

// ============================================================================
// Owners and vehicles
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub fcm_token: Option<String>,
    pub email_notifications_enabled: bool,
    // Stored and editable, no delivery channel behind it
    pub sms_notifications_enabled: bool,
    pub notification_mileage_threshold: i64,
    pub notification_days_threshold: i64,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn thresholds(&self) -> Result<Thresholds, EvaluationError> {
        Thresholds::new(
            self.notification_mileage_threshold,
            self.notification_days_threshold,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i64>,
    pub license_plate: Option<String>,
    pub image_url: Option<String>,
    pub current_mileage: Option<i64>,
    pub mileage_interval: i64,
    pub interval_months: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Service and mileage history
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: String,
    pub vehicle_id: String,
    pub mileage_at_service: i64,
    pub service_date: DateTime<Utc>,
    pub next_due_mileage: i64,
    pub next_due_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MileageEntry {
    pub id: String,
    pub vehicle_id: String,
    pub mileage: i64,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Notification log
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationLogEntry {
    pub id: String,
    pub vehicle_id: String,
    pub user_id: String,
    pub classification: NotificationClassification,
    pub outcome: DeliveryOutcome,
    pub reason: String,
    pub sent_at: DateTime<Utc>,
}

/// Everything the sweep needs to decide about one vehicle
#[derive(Debug, Clone)]
pub struct SweepCandidate {
    pub vehicle: VehicleRecord,
    pub owner: UserRecord,
    pub latest_service: Option<ServiceRecord>,
    pub recent_notifications: Vec<NotificationLogEntry>,
}
