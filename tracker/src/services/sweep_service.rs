// File: tracker/src/services/sweep_service.rs
//! The scheduled sweep: one evaluation-and-dispatch pass over every vehicle.
//!
//! Vehicles are processed one at a time. A failed candidate lookup aborts the
//! sweep before anything is dispatched; after that, per-vehicle problems are
//! logged and the sweep moves on to the next vehicle.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::notification_service::{
    ChannelOutcome, EmailSender, NotificationContent, NotificationDispatcher, PushSender,
    Recipient,
};
use crate::database::{Database, NotificationLogEntry, SweepCandidate};
use crate::due_status::{evaluate, LastService};
use crate::errors::SweepError;
use crate::notification_policy::{DeliveryOutcome, NotificationClassification, NotificationDedupPolicy};
use crate::sweep_tracker::{SweepTracker, SweepTrigger};

/// Storage operations the sweep depends on
pub trait SweepStore: Send + Sync {
    fn find_sweep_candidates(
        &self,
        since: DateTime<Utc>,
        require_current_mileage: bool,
    ) -> impl Future<Output = Result<Vec<SweepCandidate>>> + Send;

    fn recent_notifications(
        &self,
        vehicle_id: &str,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<NotificationLogEntry>>> + Send;

    fn append_notification_log(
        &self,
        entry: &NotificationLogEntry,
    ) -> impl Future<Output = Result<()>> + Send;

    fn update_vehicle_current_mileage(
        &self,
        vehicle_id: &str,
        mileage: Option<i64>,
    ) -> impl Future<Output = Result<()>> + Send;
}

impl SweepStore for Database {
    fn find_sweep_candidates(
        &self,
        since: DateTime<Utc>,
        require_current_mileage: bool,
    ) -> impl Future<Output = Result<Vec<SweepCandidate>>> + Send {
        Database::find_sweep_candidates(self, since, require_current_mileage)
    }

    fn recent_notifications(
        &self,
        vehicle_id: &str,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<NotificationLogEntry>>> + Send {
        Database::recent_notifications(self, vehicle_id, since)
    }

    fn append_notification_log(
        &self,
        entry: &NotificationLogEntry,
    ) -> impl Future<Output = Result<()>> + Send {
        Database::append_notification_log(self, entry)
    }

    fn update_vehicle_current_mileage(
        &self,
        vehicle_id: &str,
        mileage: Option<i64>,
    ) -> impl Future<Output = Result<()>> + Send {
        Database::update_vehicle_current_mileage(self, vehicle_id, mileage)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleNotificationResult {
    pub vehicle_id: String,
    pub vehicle: String,
    pub classification: NotificationClassification,
    pub reason: String,
    pub email: ChannelOutcome,
    pub push: ChannelOutcome,
    pub miles_remaining: Option<i64>,
    pub days_remaining: i64,
}

/// A vehicle the sweep could not evaluate, dedup-check or record
#[derive(Debug, Clone, Serialize)]
pub struct SkippedVehicle {
    pub vehicle_id: String,
    pub vehicle: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepSummary {
    /// Candidates loaded from storage, whether or not they were due
    pub checked: usize,
    pub notifications: Vec<VehicleNotificationResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<SkippedVehicle>,
}

enum VehicleOutcome {
    Notified(VehicleNotificationResult),
    /// Dispatched, but the log row is missing so the next sweep will not dedup it
    NotifiedUnrecorded(VehicleNotificationResult, SkippedVehicle),
    Skipped,
    Error(SkippedVehicle),
}

pub struct SweepService<S, E, P> {
    store: Arc<S>,
    dispatcher: Arc<NotificationDispatcher<E, P>>,
    tracker: SweepTracker,
    policy: NotificationDedupPolicy,
    require_current_mileage: bool,
}

impl<S, E, P> SweepService<S, E, P>
where
    S: SweepStore,
    E: EmailSender,
    P: PushSender,
{
    pub fn new(
        store: Arc<S>,
        dispatcher: Arc<NotificationDispatcher<E, P>>,
        tracker: SweepTracker,
        require_current_mileage: bool,
    ) -> Self {
        Self {
            store,
            dispatcher,
            tracker,
            policy: NotificationDedupPolicy::new(),
            require_current_mileage,
        }
    }

    pub fn tracker(&self) -> &SweepTracker {
        &self.tracker
    }

    pub async fn run(&self, trigger: SweepTrigger) -> Result<SweepSummary, SweepError> {
        self.run_at(trigger, Utc::now()).await
    }

    /// Runs one sweep evaluated as of `now`. Rejected while another sweep holds the tracker.
    #[instrument(skip(self), fields(trigger = %trigger))]
    pub async fn run_at(
        &self,
        trigger: SweepTrigger,
        now: DateTime<Utc>,
    ) -> Result<SweepSummary, SweepError> {
        let guard = self.tracker.try_start(trigger)?;
        let result = self.sweep(now).await;
        guard.finish();

        match &result {
            Ok(summary) => info!(
                "Sweep complete: {} checked, {} notified, {} skipped with errors",
                summary.checked,
                summary.notifications.len(),
                summary.errors.len()
            ),
            Err(e) => error!("Sweep aborted: {}", e),
        }
        result
    }

    async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepSummary, SweepError> {
        let since = self.policy.cutoff(now);

        let candidates = self
            .store
            .find_sweep_candidates(since, self.require_current_mileage)
            .await
            .map_err(|e| SweepError::StorageFailed {
                reason: e.to_string(),
            })?;

        info!("Checking {} vehicles", candidates.len());

        let mut summary = SweepSummary {
            checked: candidates.len(),
            ..SweepSummary::default()
        };

        for candidate in &candidates {
            match self.process(candidate, now, since).await {
                VehicleOutcome::Notified(result) => summary.notifications.push(result),
                VehicleOutcome::NotifiedUnrecorded(result, skipped) => {
                    summary.notifications.push(result);
                    summary.errors.push(skipped);
                }
                VehicleOutcome::Skipped => {}
                VehicleOutcome::Error(skipped) => summary.errors.push(skipped),
            }
        }

        Ok(summary)
    }

    async fn process(
        &self,
        candidate: &SweepCandidate,
        now: DateTime<Utc>,
        since: DateTime<Utc>,
    ) -> VehicleOutcome {
        let vehicle = &candidate.vehicle;
        let skipped = |error: String| SkippedVehicle {
            vehicle_id: vehicle.id.clone(),
            vehicle: vehicle.name.clone(),
            error,
        };

        let Some(service) = candidate.latest_service.as_ref() else {
            debug!("Skipping {}: no service records", vehicle.name);
            return VehicleOutcome::Skipped;
        };

        let thresholds = match candidate.owner.thresholds() {
            Ok(thresholds) => thresholds,
            Err(e) => {
                warn!("Skipping {}: {}", vehicle.name, e);
                return VehicleOutcome::Error(skipped(e.to_string()));
            }
        };

        let status = evaluate(
            vehicle.current_mileage,
            &LastService::from(service),
            now,
            thresholds,
        );

        if !status.needs_service {
            debug!(
                "Skipping {}: not due ({:?} miles, {} days remaining)",
                vehicle.name, status.miles_remaining, status.days_remaining
            );
            return VehicleOutcome::Skipped;
        }

        if !self.policy.is_eligible(&candidate.recent_notifications, now) {
            info!("Skipping {}: already notified recently", vehicle.name);
            return VehicleOutcome::Skipped;
        }

        // Another process may have notified since the candidates were loaded
        match self.store.recent_notifications(&vehicle.id, since).await {
            Ok(entries) if !self.policy.is_eligible(&entries, now) => {
                info!("Skipping {}: notified by a concurrent sweep", vehicle.name);
                return VehicleOutcome::Skipped;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Skipping {}: notification history unavailable: {}", vehicle.name, e);
                return VehicleOutcome::Error(skipped(format!(
                    "notification history unavailable: {}",
                    e
                )));
            }
        }

        let content = NotificationContent::new(vehicle, service, status);
        let report = self
            .dispatcher
            .dispatch(&Recipient::from(&candidate.owner), &content)
            .await;

        let outcome = if report.any_delivered() {
            DeliveryOutcome::Sent
        } else {
            DeliveryOutcome::Failed
        };

        let entry = NotificationLogEntry {
            id: Uuid::new_v4().to_string(),
            vehicle_id: vehicle.id.clone(),
            user_id: candidate.owner.id.clone(),
            classification: content.classification(),
            outcome,
            reason: content.reason.clone(),
            sent_at: now,
        };

        let logged = self.store.append_notification_log(&entry).await;

        let result = VehicleNotificationResult {
            vehicle_id: vehicle.id.clone(),
            vehicle: vehicle.name.clone(),
            classification: entry.classification,
            reason: entry.reason,
            email: report.email,
            push: report.push,
            miles_remaining: status.miles_remaining,
            days_remaining: status.days_remaining,
        };

        match logged {
            Ok(()) => VehicleOutcome::Notified(result),
            Err(e) => {
                error!(
                    "Failed to record {} notification for {}: {}",
                    entry.outcome, vehicle.name, e
                );
                VehicleOutcome::NotifiedUnrecorded(
                    result,
                    skipped(format!("notification log write failed: {}", e)),
                )
            }
        }
    }
}
