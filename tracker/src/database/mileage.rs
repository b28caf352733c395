//! Mileage history database operations.

use anyhow::Result;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, info};
use uuid::Uuid;

use super::records::MileageEntry;
use super::Database;

/// Result of deleting a mileage history entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MileageDeletion {
    NotFound,
    /// Entry exists but belongs to another user's vehicle
    Forbidden,
    Deleted {
        vehicle_id: String,
        /// Vehicle's current mileage after the delete
        current_mileage: Option<i64>,
    },
}

fn mileage_from_row(row: &SqliteRow) -> Result<MileageEntry> {
    Ok(MileageEntry {
        id: row.try_get("id")?,
        vehicle_id: row.try_get("vehicle_id")?,
        mileage: row.try_get("mileage")?,
        created_at: row.try_get("created_at")?,
    })
}

impl Database {
    /// Appends an odometer observation and makes it the vehicle's current mileage
    pub async fn log_mileage(&self, vehicle_id: &str, mileage: i64) -> Result<MileageEntry> {
        let entry = MileageEntry {
            id: Uuid::new_v4().to_string(),
            vehicle_id: vehicle_id.to_string(),
            mileage,
            created_at: Utc::now(),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO mileage_history (id, vehicle_id, mileage, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.vehicle_id)
        .bind(entry.mileage)
        .bind(entry.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE vehicles SET current_mileage = ?, updated_at = ? WHERE id = ?")
            .bind(mileage)
            .bind(entry.created_at)
            .bind(vehicle_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Logged {} miles for vehicle {}", mileage, vehicle_id);
        Ok(entry)
    }

    /// Newest first
    pub async fn list_mileage_history(&self, vehicle_id: &str) -> Result<Vec<MileageEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, vehicle_id, mileage, created_at
            FROM mileage_history
            WHERE vehicle_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(mileage_from_row).collect()
    }

    /// Deletes one entry. When it was the newest entry of its vehicle, the
    /// vehicle's current mileage falls back to the next newest entry, or to
    /// null when none remain.
    pub async fn delete_mileage_entry(&self, user_id: &str, entry_id: &str) -> Result<MileageDeletion> {
        let mut tx = self.pool.begin().await?;

        let owner = sqlx::query(
            r#"
            SELECT m.vehicle_id, v.user_id
            FROM mileage_history m
            JOIN vehicles v ON v.id = m.vehicle_id
            WHERE m.id = ?
            "#,
        )
        .bind(entry_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(owner) = owner else {
            debug!("Mileage entry {} not found", entry_id);
            return Ok(MileageDeletion::NotFound);
        };
        let vehicle_id: String = owner.try_get("vehicle_id")?;
        let owner_id: String = owner.try_get("user_id")?;
        if owner_id != user_id {
            debug!("User {} does not own mileage entry {}", user_id, entry_id);
            return Ok(MileageDeletion::Forbidden);
        }

        let newest: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT id, mileage FROM mileage_history
            WHERE vehicle_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT 2
            "#,
        )
        .bind(&vehicle_id)
        .fetch_all(&mut *tx)
        .await?;

        let rolled_back = match newest.first() {
            Some((newest_id, _)) if newest_id == entry_id => {
                let fallback = newest.get(1).map(|(_, mileage)| *mileage);
                sqlx::query("UPDATE vehicles SET current_mileage = ?, updated_at = ? WHERE id = ?")
                    .bind(fallback)
                    .bind(Utc::now())
                    .bind(&vehicle_id)
                    .execute(&mut *tx)
                    .await?;
                Some(fallback)
            }
            _ => None,
        };

        sqlx::query("DELETE FROM mileage_history WHERE id = ?")
            .bind(entry_id)
            .execute(&mut *tx)
            .await?;

        let current_mileage = match rolled_back {
            Some(fallback) => fallback,
            None => {
                sqlx::query_scalar("SELECT current_mileage FROM vehicles WHERE id = ?")
                    .bind(&vehicle_id)
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        tx.commit().await?;

        info!(
            "Deleted mileage entry {} of vehicle {} (current mileage {:?})",
            entry_id, vehicle_id, current_mileage
        );
        Ok(MileageDeletion::Deleted {
            vehicle_id,
            current_mileage,
        })
    }
}
