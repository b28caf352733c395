//! HTTP request handlers for the tracker API.
//!
//! This module is organized by domain:
//! - `common` - Response envelope and error helpers
//! - `cron` - Shared-secret sweep trigger
//! - `health` - Liveness
//! - `mileage` - Odometer readings
//! - `notifications` - Sample notification dispatch
//! - `oil_changes` - Service recording
//! - `settings` - Owner preferences and push token
//! - `vehicles` - Vehicle CRUD and dashboard view

pub mod common;
pub mod cron;
pub mod health;
pub mod mileage;
pub mod notifications;
pub mod oil_changes;
pub mod settings;
pub mod vehicles;

// Re-export all public handler functions for convenience
pub use cron::*;
pub use health::*;
pub use mileage::*;
pub use notifications::*;
pub use oil_changes::*;
pub use settings::*;
pub use vehicles::*;
