//! Database layer for the oil change tracker.
//!
//! This module provides SQLite persistence for:
//! - Users and their notification settings
//! - Vehicles and their mileage history
//! - Service (oil change) records
//! - The append-only notification log
//!
//! The module is organized into submodules:
//! - `records` - All record types (entities)
//! - `users` - Owner lookups and settings updates
//! - `vehicles` - Vehicle CRUD and current mileage
//! - `service_records` - Service history and latest-record queries
//! - `mileage` - Mileage history with current-mileage rollback
//! - `notifications` - Notification log and sweep candidate lookup

mod mileage;
mod notifications;
mod records;
mod service_records;
mod users;
mod vehicles;

pub use mileage::MileageDeletion;
pub use records::*;
pub use users::{NewUser, SettingsUpdate};
pub use vehicles::{NewVehicle, VehicleUpdate};

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::Path;
use tracing::{debug, error, info};

pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Expose pool for integration test queries
    #[allow(dead_code)]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn new(database_path: &str) -> Result<Self> {
        info!("Database path: {}", database_path);

        if let Some(parent) = Path::new(database_path).parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                error!("FAILED to create parent directory {:?}: {}", parent, e);
                return Err(e.into());
            }
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path);
        let pool = match SqlitePool::connect(&database_url).await {
            Ok(pool) => pool,
            Err(e) => {
                error!("FAILED to connect to database: {}", e);
                error!("   Connection URL: {}", database_url);
                return Err(e.into());
            }
        };

        let database = Self { pool };
        database.initialize_tables().await?;

        info!("Database initialized at {}", database_path);
        Ok(database)
    }

    /// Single-connection in-memory database, used by tests and dry runs
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let database = Self { pool };
        database.initialize_tables().await?;
        Ok(database)
    }

    async fn initialize_tables(&self) -> Result<()> {
        let statements: [(&str, &str); 10] = [
            (
                "users",
                r#"
                CREATE TABLE IF NOT EXISTS users (
                    id TEXT PRIMARY KEY,
                    email TEXT UNIQUE NOT NULL,
                    name TEXT,
                    phone TEXT,
                    fcm_token TEXT,
                    email_notifications_enabled BOOLEAN NOT NULL DEFAULT 1,
                    sms_notifications_enabled BOOLEAN NOT NULL DEFAULT 0,
                    notification_mileage_threshold INTEGER NOT NULL DEFAULT 200,
                    notification_days_threshold INTEGER NOT NULL DEFAULT 14,
                    created_at DATETIME NOT NULL
                )
                "#,
            ),
            (
                "vehicles",
                r#"
                CREATE TABLE IF NOT EXISTS vehicles (
                    id TEXT PRIMARY KEY,
                    user_id TEXT NOT NULL REFERENCES users(id),
                    name TEXT NOT NULL,
                    make TEXT,
                    model TEXT,
                    year INTEGER,
                    license_plate TEXT,
                    image_url TEXT,
                    current_mileage INTEGER,
                    mileage_interval INTEGER NOT NULL DEFAULT 5000,
                    interval_months INTEGER NOT NULL DEFAULT 6,
                    created_at DATETIME NOT NULL,
                    updated_at DATETIME NOT NULL
                )
                "#,
            ),
            (
                "idx_vehicles_user",
                "CREATE INDEX IF NOT EXISTS idx_vehicles_user ON vehicles(user_id)",
            ),
            (
                "service_records",
                r#"
                CREATE TABLE IF NOT EXISTS service_records (
                    id TEXT PRIMARY KEY,
                    vehicle_id TEXT NOT NULL REFERENCES vehicles(id),
                    mileage_at_service INTEGER NOT NULL,
                    service_date DATETIME NOT NULL,
                    next_due_mileage INTEGER NOT NULL,
                    next_due_date DATETIME NOT NULL,
                    notes TEXT,
                    created_at DATETIME NOT NULL
                )
                "#,
            ),
            (
                "idx_service_vehicle_date",
                "CREATE INDEX IF NOT EXISTS idx_service_vehicle_date ON service_records(vehicle_id, service_date DESC)",
            ),
            (
                "mileage_history",
                r#"
                CREATE TABLE IF NOT EXISTS mileage_history (
                    id TEXT PRIMARY KEY,
                    vehicle_id TEXT NOT NULL REFERENCES vehicles(id),
                    mileage INTEGER NOT NULL,
                    created_at DATETIME NOT NULL
                )
                "#,
            ),
            (
                "idx_mileage_vehicle_created",
                "CREATE INDEX IF NOT EXISTS idx_mileage_vehicle_created ON mileage_history(vehicle_id, created_at DESC)",
            ),
            (
                "notification_log",
                r#"
                CREATE TABLE IF NOT EXISTS notification_log (
                    id TEXT PRIMARY KEY,
                    vehicle_id TEXT NOT NULL,
                    user_id TEXT NOT NULL,
                    notification_type TEXT NOT NULL,
                    status TEXT NOT NULL,
                    reason TEXT NOT NULL,
                    sent_at DATETIME NOT NULL
                )
                "#,
            ),
            (
                "idx_notification_vehicle_sent",
                "CREATE INDEX IF NOT EXISTS idx_notification_vehicle_sent ON notification_log(vehicle_id, sent_at DESC)",
            ),
            (
                "idx_notification_sent",
                "CREATE INDEX IF NOT EXISTS idx_notification_sent ON notification_log(sent_at)",
            ),
        ];

        for (name, sql) in statements {
            if let Err(e) = sqlx::query(sql).execute(&self.pool).await {
                error!("FAILED to create {}: {}", name, e);
                return Err(e.into());
            }
            debug!("{} ready", name);
        }

        debug!("Database tables initialized");
        Ok(())
    }
}
