//! Oil change (service) record database operations.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::records::{ServiceRecord, VehicleRecord};
use super::Database;
use crate::due_status;

const SERVICE_COLUMNS: &str = "id, vehicle_id, mileage_at_service, service_date, \
     next_due_mileage, next_due_date, notes, created_at";

pub(super) fn service_from_row(row: &SqliteRow) -> Result<ServiceRecord> {
    Ok(ServiceRecord {
        id: row.try_get("id")?,
        vehicle_id: row.try_get("vehicle_id")?,
        mileage_at_service: row.try_get("mileage_at_service")?,
        service_date: row.try_get("service_date")?,
        next_due_mileage: row.try_get("next_due_mileage")?,
        next_due_date: row.try_get("next_due_date")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
    })
}

impl Database {
    /// Stores a service performed on `vehicle`, deriving the next-due
    /// odometer and date from the vehicle's intervals. The vehicle's current
    /// mileage becomes the service odometer reading.
    pub async fn record_service(
        &self,
        vehicle: &VehicleRecord,
        mileage_at_service: i64,
        service_date: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<ServiceRecord> {
        let (next_due_mileage, next_due_date) = due_status::next_due(
            mileage_at_service,
            service_date,
            vehicle.mileage_interval,
            vehicle.interval_months,
        )?;

        let record = ServiceRecord {
            id: Uuid::new_v4().to_string(),
            vehicle_id: vehicle.id.clone(),
            mileage_at_service,
            service_date,
            next_due_mileage,
            next_due_date,
            notes,
            created_at: Utc::now(),
        };

        let mut tx = self.pool.begin().await?;

        if let Err(e) = sqlx::query(
            r#"
            INSERT INTO service_records (
                id, vehicle_id, mileage_at_service, service_date,
                next_due_mileage, next_due_date, notes, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.vehicle_id)
        .bind(record.mileage_at_service)
        .bind(record.service_date)
        .bind(record.next_due_mileage)
        .bind(record.next_due_date)
        .bind(&record.notes)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await
        {
            error!("Failed to store service record for {}: {}", vehicle.id, e);
            return Err(e.into());
        }

        sqlx::query("UPDATE vehicles SET current_mileage = ?, updated_at = ? WHERE id = ?")
            .bind(mileage_at_service)
            .bind(record.created_at)
            .bind(&vehicle.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            "Recorded oil change for {} at {} miles, next due at {} miles / {}",
            vehicle.name,
            mileage_at_service,
            next_due_mileage,
            next_due_date.format("%Y-%m-%d")
        );
        Ok(record)
    }

    /// Most recent service by service date, `None` when the vehicle has never been serviced
    pub async fn latest_service_record(&self, vehicle_id: &str) -> Result<Option<ServiceRecord>> {
        debug!("Querying latest service record for: {}", vehicle_id);

        let query = format!(
            "SELECT {} FROM service_records WHERE vehicle_id = ? \
             ORDER BY service_date DESC, created_at DESC LIMIT 1",
            SERVICE_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(vehicle_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(service_from_row).transpose()
    }

    /// Full service history, newest first
    pub async fn list_service_records(&self, vehicle_id: &str) -> Result<Vec<ServiceRecord>> {
        let query = format!(
            "SELECT {} FROM service_records WHERE vehicle_id = ? \
             ORDER BY service_date DESC, created_at DESC",
            SERVICE_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(vehicle_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(service_from_row).collect()
    }
}
