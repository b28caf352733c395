//! Application-wide constants for thresholds, windows, timeouts and defaults
//!
//! This module organizes constants by category to provide a single source of
//! truth for the numbers the due-status evaluation and notification sweep
//! depend on.

use std::time::Duration;

/// Notification threshold constants (per-user tunable)
pub mod thresholds {
    /// Default miles-remaining threshold at which a vehicle counts as due
    pub const DEFAULT_MILEAGE: i64 = 200;

    /// Default days-remaining threshold at which a vehicle counts as due
    pub const DEFAULT_DAYS: i64 = 14;

    /// Accepted mileage threshold range (inclusive)
    pub const MILEAGE_MIN: i64 = 50;
    pub const MILEAGE_MAX: i64 = 500;

    /// Accepted days threshold range (inclusive)
    pub const DAYS_MIN: i64 = 3;
    pub const DAYS_MAX: i64 = 30;
}

/// Notification dedup and formatting constants
pub mod notifications {
    /// Lookback window during which a notified vehicle is not notified again,
    /// regardless of whether the previous delivery succeeded
    pub const DEDUP_WINDOW_DAYS: i64 = 3;

    /// Joins the mileage and time parts of a reason string
    pub const REASON_SEPARATOR: &str = " and ";

    /// Dashboard path linked from emails and push notifications
    pub const DASHBOARD_PATH: &str = "/dashboard";
}

/// HTTP client timeout constants for notification providers
pub mod http {
    use super::Duration;

    /// Timeout for a single provider request (email or push)
    pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

    /// Timeout for establishing provider connections
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
}

/// Default configuration values
pub mod defaults {
    pub const HOST: &str = "0.0.0.0";

    pub const PORT: u16 = 8095;

    pub const DATABASE_PATH: &str = "data/tracker.db";

    pub const DASHBOARD_URL: &str = "http://localhost:3000";

    /// Oil change interval for new vehicles, in miles
    pub const MILEAGE_INTERVAL: i64 = 5000;

    /// Oil change interval for new vehicles, in months
    pub const TIME_INTERVAL_MONTHS: i64 = 6;

    pub const EMAIL_API_BASE: &str = "https://api.resend.com";

    pub const EMAIL_FROM_NAME: &str = "Oil Change Tracker";

    pub const EMAIL_FROM_ADDRESS: &str = "onboarding@resend.dev";
}

/// Sample values used by the test-notification endpoint
pub mod test_notification {
    pub const VEHICLE_NAME: &str = "Test Vehicle";
    pub const CURRENT_MILEAGE: i64 = 51_800;
    pub const NEXT_DUE_MILEAGE: i64 = 51_900;
    pub const DAYS_UNTIL_DUE: i64 = 30;
}
