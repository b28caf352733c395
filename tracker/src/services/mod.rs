// File: tracker/src/services/mod.rs

pub mod email;
pub mod notification_service;
pub mod push;
pub mod sweep_service;

pub use email::ResendEmailClient;
pub use notification_service::{
    ChannelOutcome, DeliveryResult, DispatchReport, EmailSender, NotificationContent,
    NotificationDispatcher, PushSender, Recipient,
};
pub use push::FcmPushClient;
pub use sweep_service::{SweepService, SweepStore, SweepSummary, VehicleNotificationResult};

use crate::database::Database;

/// Dispatcher wired to the real providers
pub type TrackerDispatcher = NotificationDispatcher<ResendEmailClient, FcmPushClient>;

/// Sweep over the SQLite store with the real providers
pub type TrackerSweepService = SweepService<Database, ResendEmailClient, FcmPushClient>;
