//! Notification log and sweep candidate lookup.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::collections::HashMap;
use tracing::{debug, error, warn};

use super::records::{NotificationLogEntry, SweepCandidate, UserRecord};
use super::vehicles::{vehicle_from_row, VEHICLE_COLUMNS};
use super::Database;

fn notification_from_row(row: &SqliteRow) -> Result<NotificationLogEntry> {
    let classification: String = row.try_get("notification_type")?;
    let outcome: String = row.try_get("status")?;

    Ok(NotificationLogEntry {
        id: row.try_get("id")?,
        vehicle_id: row.try_get("vehicle_id")?,
        user_id: row.try_get("user_id")?,
        classification: classification.parse()?,
        outcome: outcome.parse()?,
        reason: row.try_get("reason")?,
        sent_at: row.try_get("sent_at")?,
    })
}

impl Database {
    pub async fn append_notification_log(&self, entry: &NotificationLogEntry) -> Result<()> {
        debug!(
            "Logging {} notification for vehicle {}: {}",
            entry.classification, entry.vehicle_id, entry.outcome
        );

        match sqlx::query(
            r#"
            INSERT INTO notification_log (
                id, vehicle_id, user_id, notification_type, status, reason, sent_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.vehicle_id)
        .bind(&entry.user_id)
        .bind(entry.classification.as_str())
        .bind(entry.outcome.as_str())
        .bind(&entry.reason)
        .bind(entry.sent_at)
        .execute(&self.pool)
        .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                error!(
                    "Failed to log notification for vehicle {}: {}",
                    entry.vehicle_id, e
                );
                Err(e.into())
            }
        }
    }

    /// Log entries for `vehicle_id` sent at or after `since`, newest first
    pub async fn recent_notifications(
        &self,
        vehicle_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<NotificationLogEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, vehicle_id, user_id, notification_type, status, reason, sent_at
            FROM notification_log
            WHERE vehicle_id = ? AND sent_at >= ?
            ORDER BY sent_at DESC
            "#,
        )
        .bind(vehicle_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(notification_from_row).collect()
    }

    /// Every vehicle the sweep should look at, with its owner, latest service
    /// record and notifications since `since`. With `require_current_mileage`
    /// vehicles without an odometer reading are left out.
    pub async fn find_sweep_candidates(
        &self,
        since: DateTime<Utc>,
        require_current_mileage: bool,
    ) -> Result<Vec<SweepCandidate>> {
        let filter = if require_current_mileage {
            "WHERE v.current_mileage IS NOT NULL"
        } else {
            ""
        };
        let query = format!(
            "SELECT {} FROM vehicles v {} ORDER BY v.created_at",
            VEHICLE_COLUMNS, filter
        );
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        let mut owners: HashMap<String, UserRecord> = HashMap::new();
        let mut candidates = Vec::with_capacity(rows.len());

        for row in &rows {
            let vehicle = vehicle_from_row(row)?;

            let owner = match owners.get(&vehicle.user_id) {
                Some(owner) => owner.clone(),
                None => {
                    let owner = self.get_user(&vehicle.user_id).await?.ok_or_else(|| {
                        warn!("Vehicle {} has no owner {}", vehicle.id, vehicle.user_id);
                        anyhow!("Owner {} of vehicle {} not found", vehicle.user_id, vehicle.id)
                    })?;
                    owners.insert(owner.id.clone(), owner.clone());
                    owner
                }
            };

            let latest_service = self.latest_service_record(&vehicle.id).await?;
            let recent_notifications = self.recent_notifications(&vehicle.id, since).await?;

            candidates.push(SweepCandidate {
                vehicle,
                owner,
                latest_service,
                recent_notifications,
            });
        }

        debug!("Loaded {} sweep candidates", candidates.len());
        Ok(candidates)
    }
}
