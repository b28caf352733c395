//! Vehicle database operations.
//!
//! Every read and write except the sweep's current-mileage update is scoped
//! to the owning user, so a foreign id behaves exactly like a missing one.

use anyhow::Result;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::records::VehicleRecord;
use super::Database;

#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub name: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i64>,
    pub license_plate: Option<String>,
    pub image_url: Option<String>,
    pub current_mileage: Option<i64>,
    pub mileage_interval: i64,
    pub interval_months: i64,
}

/// Partial vehicle update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default)]
pub struct VehicleUpdate {
    pub name: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i64>,
    pub license_plate: Option<String>,
    pub image_url: Option<String>,
    pub mileage_interval: Option<i64>,
    pub interval_months: Option<i64>,
}

pub(super) const VEHICLE_COLUMNS: &str = "v.id, v.user_id, v.name, v.make, v.model, v.year, \
     v.license_plate, v.image_url, v.current_mileage, v.mileage_interval, \
     v.interval_months, v.created_at, v.updated_at";

pub(super) fn vehicle_from_row(row: &SqliteRow) -> Result<VehicleRecord> {
    Ok(VehicleRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        make: row.try_get("make")?,
        model: row.try_get("model")?,
        year: row.try_get("year")?,
        license_plate: row.try_get("license_plate")?,
        image_url: row.try_get("image_url")?,
        current_mileage: row.try_get("current_mileage")?,
        mileage_interval: row.try_get("mileage_interval")?,
        interval_months: row.try_get("interval_months")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl Database {
    /// Creates the vehicle and, when an odometer reading is given, its first
    /// mileage history entry.
    pub async fn create_vehicle(&self, user_id: &str, vehicle: &NewVehicle) -> Result<VehicleRecord> {
        let now = Utc::now();
        let record = VehicleRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: vehicle.name.clone(),
            make: vehicle.make.clone(),
            model: vehicle.model.clone(),
            year: vehicle.year,
            license_plate: vehicle.license_plate.clone(),
            image_url: vehicle.image_url.clone(),
            current_mileage: vehicle.current_mileage,
            mileage_interval: vehicle.mileage_interval,
            interval_months: vehicle.interval_months,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        if let Err(e) = sqlx::query(
            r#"
            INSERT INTO vehicles (
                id, user_id, name, make, model, year, license_plate, image_url,
                current_mileage, mileage_interval, interval_months, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.name)
        .bind(&record.make)
        .bind(&record.model)
        .bind(record.year)
        .bind(&record.license_plate)
        .bind(&record.image_url)
        .bind(record.current_mileage)
        .bind(record.mileage_interval)
        .bind(record.interval_months)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&mut *tx)
        .await
        {
            error!("Failed to create vehicle {}: {}", record.name, e);
            return Err(e.into());
        }

        if let Some(mileage) = record.current_mileage {
            sqlx::query(
                "INSERT INTO mileage_history (id, vehicle_id, mileage, created_at) VALUES (?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&record.id)
            .bind(mileage)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!("Created vehicle {} ({}) for user {}", record.name, record.id, user_id);
        Ok(record)
    }

    pub async fn list_vehicles(&self, user_id: &str) -> Result<Vec<VehicleRecord>> {
        debug!("Listing vehicles for user {}", user_id);

        let query = format!(
            "SELECT {} FROM vehicles v WHERE v.user_id = ? ORDER BY v.created_at DESC",
            VEHICLE_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(vehicle_from_row).collect()
    }

    pub async fn get_vehicle(&self, user_id: &str, vehicle_id: &str) -> Result<Option<VehicleRecord>> {
        debug!("Querying vehicle {} for user {}", vehicle_id, user_id);

        let query = format!(
            "SELECT {} FROM vehicles v WHERE v.id = ? AND v.user_id = ?",
            VEHICLE_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(vehicle_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(vehicle_from_row).transpose()
    }

    pub async fn update_vehicle(
        &self,
        user_id: &str,
        vehicle_id: &str,
        update: &VehicleUpdate,
    ) -> Result<Option<VehicleRecord>> {
        let result = sqlx::query(
            r#"
            UPDATE vehicles SET
                name = COALESCE(?, name),
                make = COALESCE(?, make),
                model = COALESCE(?, model),
                year = COALESCE(?, year),
                license_plate = COALESCE(?, license_plate),
                image_url = COALESCE(?, image_url),
                mileage_interval = COALESCE(?, mileage_interval),
                interval_months = COALESCE(?, interval_months),
                updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&update.name)
        .bind(&update.make)
        .bind(&update.model)
        .bind(update.year)
        .bind(&update.license_plate)
        .bind(&update.image_url)
        .bind(update.mileage_interval)
        .bind(update.interval_months)
        .bind(Utc::now())
        .bind(vehicle_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        info!("Updated vehicle {}", vehicle_id);
        self.get_vehicle(user_id, vehicle_id).await
    }

    /// Deletes the vehicle with its service records, mileage history and
    /// notification log. Returns false when nothing matched.
    pub async fn delete_vehicle(&self, user_id: &str, vehicle_id: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let owned = sqlx::query("SELECT id FROM vehicles WHERE id = ? AND user_id = ?")
            .bind(vehicle_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if owned.is_none() {
            return Ok(false);
        }

        for table in ["service_records", "mileage_history", "notification_log"] {
            let sql = format!("DELETE FROM {} WHERE vehicle_id = ?", table);
            sqlx::query(&sql).bind(vehicle_id).execute(&mut *tx).await?;
        }
        sqlx::query("DELETE FROM vehicles WHERE id = ?")
            .bind(vehicle_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Deleted vehicle {} and its history", vehicle_id);
        Ok(true)
    }

    pub async fn update_vehicle_current_mileage(
        &self,
        vehicle_id: &str,
        mileage: Option<i64>,
    ) -> Result<()> {
        debug!("Setting current mileage of {} to {:?}", vehicle_id, mileage);

        sqlx::query("UPDATE vehicles SET current_mileage = ?, updated_at = ? WHERE id = ?")
            .bind(mileage)
            .bind(Utc::now())
            .bind(vehicle_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
