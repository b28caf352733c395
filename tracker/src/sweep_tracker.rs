//! Sweep tracking for overlapping triggers
//!
//! Only one sweep may run at a time in a process. The external cron endpoint
//! and the in-process scheduler both go through the same tracker, so a slow
//! sweep is never overlapped by the next trigger.
//!
//! The slot is held by a [`SweepGuard`] and released when the guard drops,
//! including when the sweep future is cancelled halfway (a cron caller that
//! disconnects drops the handler future).
//!
//! # Usage
//!
//! ```ignore
//! let _guard = tracker.try_start(SweepTrigger::Endpoint)?;
//!
//! // Run the sweep...
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, instrument, warn};

use crate::errors::SweepError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepTrigger {
    /// Shared-secret HTTP trigger
    Endpoint,
    /// In-process cron job
    Schedule,
}

impl fmt::Display for SweepTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepTrigger::Endpoint => f.write_str("endpoint"),
            SweepTrigger::Schedule => f.write_str("schedule"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActiveSweep {
    pub trigger: SweepTrigger,
    pub started_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct SweepTracker {
    active: Arc<Mutex<Option<ActiveSweep>>>,
}

/// Holds the sweep slot until dropped
#[must_use = "the sweep slot is released as soon as the guard is dropped"]
pub struct SweepGuard {
    active: Arc<Mutex<Option<ActiveSweep>>>,
    completed: bool,
}

impl SweepTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // The slot is a plain Option, a panic while holding it cannot leave it half-written
    fn slot(&self) -> MutexGuard<'_, Option<ActiveSweep>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims the sweep slot, failing when another sweep holds it
    #[instrument(skip(self), fields(trigger = %trigger))]
    pub fn try_start(&self, trigger: SweepTrigger) -> Result<SweepGuard, SweepError> {
        let mut active = self.slot();

        if let Some(current) = active.as_ref() {
            return Err(SweepError::AlreadyRunning {
                trigger: current.trigger.to_string(),
                started_at: current.started_at.to_rfc3339(),
            });
        }

        *active = Some(ActiveSweep {
            trigger,
            started_at: Utc::now(),
        });
        info!("Started sweep ({})", trigger);

        Ok(SweepGuard {
            active: self.active.clone(),
            completed: false,
        })
    }

    pub fn is_running(&self) -> bool {
        self.slot().is_some()
    }

    pub fn current(&self) -> Option<ActiveSweep> {
        self.slot().clone()
    }
}

impl SweepGuard {
    /// Releases the slot after a sweep that ran to the end
    pub fn finish(mut self) {
        self.completed = true;
    }
}

impl Drop for SweepGuard {
    fn drop(&mut self) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sweep) = active.take() else {
            return;
        };

        let duration = Utc::now().signed_duration_since(sweep.started_at);
        if self.completed {
            info!(
                "Finished sweep ({}) in {}ms",
                sweep.trigger,
                duration.num_milliseconds()
            );
        } else {
            warn!(
                "Sweep ({}) was cancelled after {}ms, releasing the slot",
                sweep.trigger,
                duration.num_milliseconds()
            );
        }
    }
}
