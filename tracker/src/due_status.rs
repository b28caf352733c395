//! Service-due evaluation for a single vehicle
//!
//! Combines the mileage criterion (odometer vs. next-due odometer) and the
//! time criterion (evaluation date vs. next-due date) into one [`DueStatus`].
//! Everything here is pure: no I/O, no clock reads, same inputs give the same
//! output, so the sweep and the dashboard can share it.

use chrono::{DateTime, Months, Utc};
use serde::Serialize;

use crate::constants::{notifications, thresholds};
use crate::database::ServiceRecord;
use crate::errors::EvaluationError;

const MS_PER_DAY: i64 = 86_400_000;

/// Validated notification thresholds.
///
/// Construction rejects out-of-range values instead of clamping them, so any
/// caller that bypasses the settings form still gets a hard error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Thresholds {
    mileage: i64,
    days: i64,
}

impl Thresholds {
    pub fn new(mileage: i64, days: i64) -> Result<Self, EvaluationError> {
        check_range(
            "mileage_threshold",
            mileage,
            thresholds::MILEAGE_MIN,
            thresholds::MILEAGE_MAX,
        )?;
        check_range(
            "days_threshold",
            days,
            thresholds::DAYS_MIN,
            thresholds::DAYS_MAX,
        )?;
        Ok(Self { mileage, days })
    }

    pub fn mileage(&self) -> i64 {
        self.mileage
    }

    pub fn days(&self) -> i64 {
        self.days
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            mileage: thresholds::DEFAULT_MILEAGE,
            days: thresholds::DEFAULT_DAYS,
        }
    }
}

fn check_range(field: &str, value: i64, min: i64, max: i64) -> Result<(), EvaluationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(EvaluationError::InvalidConfiguration {
            field: field.to_string(),
            value,
            min,
            max,
        })
    }
}

/// The parts of the latest service record the evaluation needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastService {
    pub mileage_at_service: i64,
    pub next_due_mileage: i64,
    pub next_due_date: DateTime<Utc>,
}

impl From<&ServiceRecord> for LastService {
    fn from(record: &ServiceRecord) -> Self {
        Self {
            mileage_at_service: record.mileage_at_service,
            next_due_mileage: record.next_due_mileage,
            next_due_date: record.next_due_date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DueStatus {
    /// `None` when no odometer reading has been recorded
    pub miles_remaining: Option<i64>,
    pub days_remaining: i64,
    pub due_by_mileage: bool,
    pub due_by_time: bool,
    pub overdue_by_mileage: bool,
    pub overdue_by_time: bool,
    pub needs_service: bool,
    pub is_overdue: bool,
}

/// Evaluate the due status of one vehicle as of `as_of`.
pub fn evaluate(
    current_mileage: Option<i64>,
    last_service: &LastService,
    as_of: DateTime<Utc>,
    thresholds: Thresholds,
) -> DueStatus {
    let miles_remaining = current_mileage.map(|current| last_service.next_due_mileage - current);
    let days_remaining = (last_service.next_due_date - as_of)
        .num_milliseconds()
        .div_euclid(MS_PER_DAY);

    let due_by_mileage = miles_remaining.is_some_and(|miles| miles <= thresholds.mileage());
    let due_by_time = days_remaining <= thresholds.days();
    let overdue_by_mileage = miles_remaining.is_some_and(|miles| miles < 0);
    let overdue_by_time = days_remaining < 0;

    DueStatus {
        miles_remaining,
        days_remaining,
        due_by_mileage,
        due_by_time,
        overdue_by_mileage,
        overdue_by_time,
        needs_service: due_by_mileage || due_by_time,
        is_overdue: overdue_by_mileage || overdue_by_time,
    }
}

impl DueStatus {
    /// Human-readable list of the conditions that are met, e.g.
    /// `"100 miles remaining"` or `"200 miles overdue and 3 days overdue"`.
    /// Empty when the vehicle is not due.
    pub fn reason(&self) -> String {
        let mut parts = Vec::with_capacity(2);

        if self.due_by_mileage {
            if let Some(miles) = self.miles_remaining {
                parts.push(describe_remaining(miles, "miles"));
            }
        }
        if self.due_by_time {
            parts.push(describe_remaining(self.days_remaining, "days"));
        }

        parts.join(notifications::REASON_SEPARATOR)
    }
}

fn describe_remaining(remaining: i64, unit: &str) -> String {
    if remaining < 0 {
        format!("{} {} overdue", remaining.unsigned_abs(), unit)
    } else {
        format!("{} {} remaining", remaining, unit)
    }
}

/// Next-due odometer and date for a service performed at `mileage_at_service`
/// on `service_date`.
///
/// Month arithmetic clamps to the end of the target month: Aug 31 + 6 months
/// is Feb 28 (29 in leap years), never a rollover into March (Mar 3).
pub fn next_due(
    mileage_at_service: i64,
    service_date: DateTime<Utc>,
    mileage_interval: i64,
    interval_months: i64,
) -> Result<(i64, DateTime<Utc>), EvaluationError> {
    let months = u32::try_from(interval_months)
        .map_err(|_| EvaluationError::DateOutOfRange {
            months: interval_months,
        })?;
    let next_due_date = service_date
        .checked_add_months(Months::new(months))
        .ok_or(EvaluationError::DateOutOfRange {
            months: interval_months,
        })?;

    Ok((mileage_at_service + mileage_interval, next_due_date))
}
