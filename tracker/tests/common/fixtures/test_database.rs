//! Test database utilities for in-memory SQLite testing

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::test_data::{new_user, new_vehicle};
use tracker::database::{
    Database, NotificationLogEntry, ServiceRecord, SettingsUpdate, UserRecord, VehicleRecord,
};
use tracker::notification_policy::{DeliveryOutcome, NotificationClassification};

/// In-memory database with seed helpers
pub struct TestDatabase {
    pub db: Arc<Database>,
}

impl TestDatabase {
    pub async fn new() -> Result<Self> {
        Ok(Self {
            db: Arc::new(Database::in_memory().await?),
        })
    }

    pub async fn seed_owner(&self, email: &str) -> Result<UserRecord> {
        self.db.create_user(&new_user(email)).await
    }

    /// Owner with explicit thresholds written past the settings validation
    pub async fn seed_owner_with_thresholds(
        &self,
        email: &str,
        mileage: i64,
        days: i64,
    ) -> Result<UserRecord> {
        let owner = self.seed_owner(email).await?;
        sqlx::query(
            "UPDATE users SET notification_mileage_threshold = ?, notification_days_threshold = ? WHERE id = ?",
        )
        .bind(mileage)
        .bind(days)
        .bind(&owner.id)
        .execute(self.db.pool())
        .await?;

        Ok(self.db.get_user(&owner.id).await?.expect("seeded owner"))
    }

    pub async fn disable_email(&self, owner: &UserRecord) -> Result<()> {
        let update = SettingsUpdate {
            email_notifications_enabled: Some(false),
            ..SettingsUpdate::default()
        };
        self.db.update_settings(&owner.id, &update).await?;
        Ok(())
    }

    pub async fn seed_vehicle(
        &self,
        owner: &UserRecord,
        name: &str,
        current_mileage: Option<i64>,
    ) -> Result<VehicleRecord> {
        self.db
            .create_vehicle(&owner.id, &new_vehicle(name, current_mileage))
            .await
    }

    /// Records a service and restores the vehicle's odometer to `current_mileage`
    pub async fn seed_service(
        &self,
        vehicle: &VehicleRecord,
        mileage_at_service: i64,
        service_date: DateTime<Utc>,
        current_mileage: Option<i64>,
    ) -> Result<ServiceRecord> {
        let record = self
            .db
            .record_service(vehicle, mileage_at_service, service_date, None)
            .await?;
        self.db
            .update_vehicle_current_mileage(&vehicle.id, current_mileage)
            .await?;
        Ok(record)
    }

    pub async fn seed_notification(
        &self,
        vehicle: &VehicleRecord,
        sent_at: DateTime<Utc>,
        outcome: DeliveryOutcome,
    ) -> Result<NotificationLogEntry> {
        let entry = NotificationLogEntry {
            id: Uuid::new_v4().to_string(),
            vehicle_id: vehicle.id.clone(),
            user_id: vehicle.user_id.clone(),
            classification: NotificationClassification::Upcoming,
            outcome,
            reason: "100 miles remaining".to_string(),
            sent_at,
        };
        self.db.append_notification_log(&entry).await?;
        Ok(entry)
    }

    pub async fn notification_count(&self, vehicle_id: &str) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM notification_log WHERE vehicle_id = ?")
            .bind(vehicle_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }
}
