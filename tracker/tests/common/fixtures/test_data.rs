//! Common test data and constants

use chrono::{DateTime, TimeZone, Utc};
use tracker::database::{NewUser, NewVehicle};

/// Fixed evaluation instant so day arithmetic is deterministic
pub fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

pub const CRON_SECRET: &str = "test-cron-secret";

/// Common owner emails
pub mod owners {
    pub const ALICE: &str = "alice@example.com";
    pub const BOB: &str = "bob@example.com";
}

/// Common vehicle names
pub mod vehicles {
    pub const CIVIC: &str = "Civic";
    pub const TRUCK: &str = "Work Truck";
    pub const WAGON: &str = "Wagon";
}

pub fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        name: Some("Test Owner".to_string()),
        phone: None,
    }
}

pub fn new_vehicle(name: &str, current_mileage: Option<i64>) -> NewVehicle {
    NewVehicle {
        name: name.to_string(),
        make: Some("Honda".to_string()),
        model: None,
        year: Some(2018),
        license_plate: None,
        image_url: None,
        current_mileage,
        mileage_interval: 5000,
        interval_months: 6,
    }
}
