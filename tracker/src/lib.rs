pub mod config;
pub mod constants;
pub mod database;
pub mod due_status;
pub mod errors;
pub mod notification_policy;
pub mod scheduler;
pub mod services;
pub mod sweep_tracker;
pub mod validation;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigManager};
pub use database::Database;
pub use due_status::{evaluate, DueStatus, LastService, Thresholds};
pub use notification_policy::{classify, NotificationClassification, NotificationDedupPolicy};
pub use scheduler::SweepScheduler;
pub use services::{NotificationDispatcher, SweepService, SweepSummary};
pub use sweep_tracker::{SweepTracker, SweepTrigger};
