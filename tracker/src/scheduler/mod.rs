//! Cron-based in-process trigger for the notification sweep
//!
//! The sweep is normally triggered by an external scheduler calling the cron
//! endpoint. Setting `sweep_schedule` in `config/main.toml` runs the same sweep
//! from inside the process as well; both triggers share one [`SweepTracker`]
//! so they never overlap.
//!
//! Schedules use 6-field cron expressions (sec min hour day month dow):
//!
//! ```toml
//! sweep_schedule = "0 0 9 * * *"  # Daily at 9 AM
//! ```
//!
//! [`SweepTracker`]: crate::sweep_tracker::SweepTracker

use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info, instrument};

use crate::errors::SweepError;
use crate::services::{EmailSender, PushSender, SweepService, SweepStore};
use crate::sweep_tracker::SweepTrigger;

pub struct SweepScheduler {
    scheduler: JobScheduler,
}

impl SweepScheduler {
    pub async fn new() -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| anyhow!("Failed to create JobScheduler: {}", e))?;

        Ok(Self { scheduler })
    }

    /// Registers the sweep job and starts the scheduler
    #[instrument(skip(self, service))]
    pub async fn start<S, E, P>(&self, schedule: &str, service: Arc<SweepService<S, E, P>>) -> Result<()>
    where
        S: SweepStore + 'static,
        E: EmailSender + 'static,
        P: PushSender + 'static,
    {
        validate_6_field_cron(schedule)
            .map_err(|e| anyhow!("Invalid 6-field cron schedule '{}': {}", schedule, e))?;

        let job = Job::new_async(schedule, move |_uuid, _scheduler| {
            let service = service.clone();

            Box::pin(async move {
                info!("Executing scheduled sweep");

                match service.run(SweepTrigger::Schedule).await {
                    Ok(summary) => info!(
                        "Scheduled sweep finished: {} checked, {} notified",
                        summary.checked,
                        summary.notifications.len()
                    ),
                    Err(SweepError::AlreadyRunning { trigger, started_at }) => info!(
                        "Scheduled sweep skipped, sweep from {} running since {}",
                        trigger, started_at
                    ),
                    Err(e) => error!("Scheduled sweep failed: {}", e),
                }
            })
        })
        .map_err(|e| anyhow!("Failed to create sweep job for '{}': {}", schedule, e))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| anyhow!("Failed to add sweep job to scheduler: {}", e))?;

        self.scheduler
            .start()
            .await
            .map_err(|e| anyhow!("Failed to start scheduler: {}", e))?;

        info!("Sweep scheduler started: {}", schedule);
        Ok(())
    }
}

/// Checks that `schedule` is a 6-field cron expression tokio-cron-scheduler accepts
pub fn validate_6_field_cron(schedule: &str) -> Result<()> {
    let parts: Vec<&str> = schedule.split_whitespace().collect();

    if parts.len() != 6 {
        return Err(anyhow!("tokio-cron-scheduler requires exactly 6 fields: second minute hour day month dayofweek. Got {} fields: '{}'", parts.len(), schedule));
    }

    validate_cron_field(parts[0], "second", 0, 59)?;
    validate_cron_field(parts[1], "minute", 0, 59)?;
    validate_cron_field(parts[2], "hour", 0, 23)?;
    validate_cron_field(parts[3], "day", 1, 31)?;
    validate_cron_field(parts[4], "month", 1, 12)?;
    validate_cron_field(parts[5], "dayofweek", 0, 7)?;

    debug!("Validated 6-field cron: '{}'", schedule);
    Ok(())
}

fn validate_cron_field(field: &str, name: &str, min: u32, max: u32) -> Result<()> {
    if field == "*" || field == "?" {
        return Ok(());
    }

    if let Some(step_str) = field.strip_prefix("*/") {
        let step = step_str
            .parse::<u32>()
            .map_err(|_| anyhow!("Invalid {} step value: {}", name, step_str))?;
        if step == 0 {
            return Err(anyhow!("{} step value cannot be 0", name));
        }
        return Ok(());
    }

    if field.contains(',') {
        for part in field.split(',') {
            check_value(part, name, min, max)?;
        }
        return Ok(());
    }

    if let Some((start, end)) = field.split_once('-') {
        let start = check_value(start, name, min, max)?;
        let end = check_value(end, name, min, max)?;
        if start > end {
            return Err(anyhow!("{} range {}-{} is reversed", name, start, end));
        }
        return Ok(());
    }

    check_value(field, name, min, max)?;
    Ok(())
}

fn check_value(value: &str, name: &str, min: u32, max: u32) -> Result<u32> {
    let parsed = value
        .parse::<u32>()
        .map_err(|_| anyhow!("Invalid {} value: {}", name, value))?;

    if parsed < min || parsed > max {
        return Err(anyhow!(
            "{} value {} is outside valid range {}-{}",
            name,
            parsed,
            min,
            max
        ));
    }
    Ok(parsed)
}
