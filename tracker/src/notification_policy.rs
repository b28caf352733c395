//! Notification dedup and classification.
//!
//! A vehicle that already has a log entry inside the dedup window is not
//! notified again. Failed deliveries count the same as successful ones, so a
//! transient provider outage delays the next attempt until the window has
//! elapsed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::notifications;
use crate::database::NotificationLogEntry;
use crate::due_status::DueStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationClassification {
    Overdue,
    Upcoming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOutcome {
    Sent,
    Failed,
}

impl NotificationClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationClassification::Overdue => "overdue",
            NotificationClassification::Upcoming => "upcoming",
        }
    }
}

impl DeliveryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryOutcome::Sent => "sent",
            DeliveryOutcome::Failed => "failed",
        }
    }
}

impl fmt::Display for NotificationClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationClassification {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overdue" => Ok(NotificationClassification::Overdue),
            "upcoming" => Ok(NotificationClassification::Upcoming),
            other => Err(anyhow::anyhow!("Unknown notification type: {}", other)),
        }
    }
}

impl FromStr for DeliveryOutcome {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(DeliveryOutcome::Sent),
            "failed" => Ok(DeliveryOutcome::Failed),
            other => Err(anyhow::anyhow!("Unknown delivery outcome: {}", other)),
        }
    }
}

/// Classification recorded with the notification for this status
pub fn classify(status: &DueStatus) -> NotificationClassification {
    if status.is_overdue {
        NotificationClassification::Overdue
    } else {
        NotificationClassification::Upcoming
    }
}

/// Fixed-window recency dedup
#[derive(Debug, Clone, Copy)]
pub struct NotificationDedupPolicy {
    window: Duration,
}

impl NotificationDedupPolicy {
    pub fn new() -> Self {
        Self {
            window: Duration::days(notifications::DEDUP_WINDOW_DAYS),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Oldest timestamp that still suppresses a notification at `now`
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.window
    }

    /// True when none of `entries` falls inside the window ending at `now`
    pub fn is_eligible(&self, entries: &[NotificationLogEntry], now: DateTime<Utc>) -> bool {
        let cutoff = self.cutoff(now);
        !entries.iter().any(|entry| entry.sent_at >= cutoff)
    }
}

impl Default for NotificationDedupPolicy {
    fn default() -> Self {
        Self::new()
    }
}
