//! Owner accounts and notification settings.

use anyhow::Result;
use chrono::Utc;
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::records::UserRecord;
use super::Database;
use crate::constants::thresholds;

/// Fields supplied when an account is provisioned by the auth layer
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Partial settings update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email_notifications_enabled: Option<bool>,
    pub sms_notifications_enabled: Option<bool>,
    pub notification_mileage_threshold: Option<i64>,
    pub notification_days_threshold: Option<i64>,
}

const USER_COLUMNS: &str = "id, email, name, phone, fcm_token, email_notifications_enabled, \
     sms_notifications_enabled, notification_mileage_threshold, \
     notification_days_threshold, created_at";

pub(super) fn user_from_row(row: &SqliteRow) -> Result<UserRecord> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        fcm_token: row.try_get("fcm_token")?,
        email_notifications_enabled: row.try_get("email_notifications_enabled")?,
        sms_notifications_enabled: row.try_get("sms_notifications_enabled")?,
        notification_mileage_threshold: row.try_get("notification_mileage_threshold")?,
        notification_days_threshold: row.try_get("notification_days_threshold")?,
        created_at: row.try_get("created_at")?,
    })
}

impl Database {
    pub async fn create_user(&self, user: &NewUser) -> Result<UserRecord> {
        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            phone: user.phone.clone(),
            fcm_token: None,
            email_notifications_enabled: true,
            sms_notifications_enabled: false,
            notification_mileage_threshold: thresholds::DEFAULT_MILEAGE,
            notification_days_threshold: thresholds::DEFAULT_DAYS,
            created_at: Utc::now(),
        };

        match sqlx::query(
            r#"
            INSERT INTO users (
                id, email, name, phone, fcm_token, email_notifications_enabled,
                sms_notifications_enabled, notification_mileage_threshold,
                notification_days_threshold, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.email)
        .bind(&record.name)
        .bind(&record.phone)
        .bind(&record.fcm_token)
        .bind(record.email_notifications_enabled)
        .bind(record.sms_notifications_enabled)
        .bind(record.notification_mileage_threshold)
        .bind(record.notification_days_threshold)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        {
            Ok(_) => {
                info!("Created user {} ({})", record.id, record.email);
                Ok(record)
            }
            Err(e) => {
                error!("Failed to create user {}: {}", record.email, e);
                Err(e.into())
            }
        }
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>> {
        debug!("Querying user: {}", user_id);

        let query = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Applies the update and returns the stored settings, `None` for an unknown user
    pub async fn update_settings(
        &self,
        user_id: &str,
        update: &SettingsUpdate,
    ) -> Result<Option<UserRecord>> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = COALESCE(?, name),
                phone = COALESCE(?, phone),
                email_notifications_enabled = COALESCE(?, email_notifications_enabled),
                sms_notifications_enabled = COALESCE(?, sms_notifications_enabled),
                notification_mileage_threshold = COALESCE(?, notification_mileage_threshold),
                notification_days_threshold = COALESCE(?, notification_days_threshold)
            WHERE id = ?
            "#,
        )
        .bind(&update.name)
        .bind(&update.phone)
        .bind(update.email_notifications_enabled)
        .bind(update.sms_notifications_enabled)
        .bind(update.notification_mileage_threshold)
        .bind(update.notification_days_threshold)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            debug!("Settings update for unknown user {}", user_id);
            return Ok(None);
        }

        info!("Updated notification settings for user {}", user_id);
        self.get_user(user_id).await
    }

    /// Returns false when the user does not exist
    pub async fn set_fcm_token(&self, user_id: &str, token: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET fcm_token = ? WHERE id = ?")
            .bind(token)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let updated = result.rows_affected() > 0;
        if updated {
            info!("Stored push token for user {}", user_id);
        }
        Ok(updated)
    }
}
