// File: tracker/src/services/notification_service.rs
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use tracing::{debug, info};

use crate::constants::notifications::DASHBOARD_PATH;
use crate::database::{ServiceRecord, UserRecord, VehicleRecord};
use crate::due_status::DueStatus;
use crate::notification_policy::{classify, NotificationClassification};

/// Outcome of a single provider call. Providers never retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryResult {
    pub success: bool,
    pub error: Option<String>,
}

impl DeliveryResult {
    pub fn delivered() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }

    pub fn not_configured() -> Self {
        Self::failed("not configured")
    }
}

pub trait EmailSender: Send + Sync {
    fn send_email(
        &self,
        to: &str,
        subject: &str,
        html: &str,
    ) -> impl Future<Output = DeliveryResult> + Send;
}

pub trait PushSender: Send + Sync {
    fn send_push(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: &HashMap<String, String>,
    ) -> impl Future<Output = DeliveryResult> + Send;
}

/// Per-channel result reported in the sweep summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelOutcome {
    Sent,
    Failed,
    /// Push only: the owner never registered a device
    NoToken,
    /// Email only: the owner turned email notifications off
    Disabled,
}

impl From<&DeliveryResult> for ChannelOutcome {
    fn from(result: &DeliveryResult) -> Self {
        if result.success {
            ChannelOutcome::Sent
        } else {
            ChannelOutcome::Failed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub email: ChannelOutcome,
    pub push: ChannelOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_error: Option<String>,
}

impl DispatchReport {
    /// True when at least one channel reached the owner
    pub fn any_delivered(&self) -> bool {
        self.email == ChannelOutcome::Sent || self.push == ChannelOutcome::Sent
    }
}

#[derive(Debug, Clone)]
pub struct Recipient {
    pub email: String,
    pub fcm_token: Option<String>,
    pub email_enabled: bool,
}

impl From<&UserRecord> for Recipient {
    fn from(user: &UserRecord) -> Self {
        Self {
            email: user.email.clone(),
            fcm_token: user.fcm_token.clone(),
            email_enabled: user.email_notifications_enabled,
        }
    }
}

/// Everything rendered into an email or push message
#[derive(Debug, Clone)]
pub struct NotificationContent {
    pub vehicle_name: String,
    pub current_mileage: Option<i64>,
    pub next_due_mileage: i64,
    pub next_due_date: DateTime<Utc>,
    pub status: DueStatus,
    pub reason: String,
}

impl NotificationContent {
    pub fn new(vehicle: &VehicleRecord, service: &ServiceRecord, status: DueStatus) -> Self {
        Self {
            vehicle_name: vehicle.name.clone(),
            current_mileage: vehicle.current_mileage,
            next_due_mileage: service.next_due_mileage,
            next_due_date: service.next_due_date,
            status,
            reason: status.reason(),
        }
    }

    pub fn classification(&self) -> NotificationClassification {
        classify(&self.status)
    }

    fn is_overdue(&self) -> bool {
        self.status.is_overdue
    }
}

/// Renders notifications and fans them out to the email and push providers
pub struct NotificationDispatcher<E, P> {
    email: E,
    push: P,
    dashboard_url: String,
}

impl<E: EmailSender, P: PushSender> NotificationDispatcher<E, P> {
    pub fn new(email: E, push: P, dashboard_url: impl Into<String>) -> Self {
        Self {
            email,
            push,
            dashboard_url: dashboard_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn dispatch(
        &self,
        recipient: &Recipient,
        content: &NotificationContent,
    ) -> DispatchReport {
        let (email, email_error) = if recipient.email_enabled {
            let result = self
                .email
                .send_email(
                    &recipient.email,
                    &self.email_subject(content),
                    &self.email_html(content),
                )
                .await;
            (ChannelOutcome::from(&result), result.error)
        } else {
            debug!("Email notifications disabled for {}", recipient.email);
            (ChannelOutcome::Disabled, None)
        };

        let (push, push_error) = match recipient.fcm_token.as_deref() {
            Some(token) if !token.is_empty() => {
                let result = self
                    .push
                    .send_push(
                        token,
                        &self.push_title(content),
                        &content.reason,
                        &self.push_data(content),
                    )
                    .await;
                (ChannelOutcome::from(&result), result.error)
            }
            _ => (ChannelOutcome::NoToken, None),
        };

        info!(
            "Dispatched {} notification for {}: email={:?}, push={:?}",
            content.classification(),
            content.vehicle_name,
            email,
            push
        );

        DispatchReport {
            email,
            push,
            email_error,
            push_error,
        }
    }

    pub fn dashboard_link(&self) -> String {
        format!("{}{}", self.dashboard_url, DASHBOARD_PATH)
    }

    pub fn email_subject(&self, content: &NotificationContent) -> String {
        if content.is_overdue() {
            format!("OVERDUE: {} needs oil change!", content.vehicle_name)
        } else {
            format!("{} needs oil change soon", content.vehicle_name)
        }
    }

    pub fn push_title(&self, content: &NotificationContent) -> String {
        if content.is_overdue() {
            format!("{} - Oil Change Overdue!", content.vehicle_name)
        } else {
            format!("{} - Service Due Soon", content.vehicle_name)
        }
    }

    /// String-only data map, push providers reject other value types
    pub fn push_data(&self, content: &NotificationContent) -> HashMap<String, String> {
        let optional = |value: Option<i64>| value.map(|v| v.to_string()).unwrap_or_default();

        HashMap::from([
            ("vehicleName".to_string(), content.vehicle_name.clone()),
            (
                "currentMileage".to_string(),
                optional(content.current_mileage),
            ),
            (
                "nextDueMileage".to_string(),
                content.next_due_mileage.to_string(),
            ),
            (
                "milesRemaining".to_string(),
                optional(content.status.miles_remaining),
            ),
            (
                "nextDueDate".to_string(),
                content.next_due_date.to_rfc3339(),
            ),
            (
                "daysRemaining".to_string(),
                content.status.days_remaining.to_string(),
            ),
            (
                "type".to_string(),
                content.classification().as_str().to_string(),
            ),
            ("url".to_string(), DASHBOARD_PATH.to_string()),
        ])
    }

    pub fn email_html(&self, content: &NotificationContent) -> String {
        let overdue = content.is_overdue();
        let (header_color, heading) = if overdue {
            ("#DC2626", "Oil Change Overdue!")
        } else {
            ("#F59E0B", "Oil Change Reminder")
        };

        let current = content
            .current_mileage
            .map(|m| format!("{} miles", format_thousands(m)))
            .unwrap_or_else(|| "Not recorded".to_string());

        let miles_line = content
            .status
            .miles_remaining
            .map(|miles| {
                format!(
                    r#"<p style="margin: 5px 0 0 0; font-size: 14px; color: #6b7280;">{}</p>"#,
                    describe(miles, "miles")
                )
            })
            .unwrap_or_default();

        let call_to_action = if overdue {
            "Please schedule an oil change as soon as possible to avoid engine damage."
        } else {
            "We recommend scheduling your oil change appointment soon to stay on top of your vehicle maintenance."
        };

        format!(
            r#"<!DOCTYPE html>
<html>
  <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
    <div style="background: {header_color}; color: white; padding: 20px; border-radius: 8px; text-align: center; margin-bottom: 20px;">
      <h1 style="margin: 0;">{heading}</h1>
      <p style="margin: 10px 0 0 0; font-size: 18px;">{vehicle}</p>
    </div>
    <div style="background: #f9fafb; padding: 20px; border-radius: 8px;">
      <p>Hi there,</p>
      <div style="background: #FEF3C7; border-left: 4px solid #F59E0B; padding: 12px; border-radius: 4px; margin: 15px 0;">
        <strong>Service Due:</strong> {reason}
      </div>
      <div style="background: white; padding: 15px; border-radius: 6px; margin: 10px 0;">
        <div style="font-size: 12px; color: #6b7280; text-transform: uppercase;">Current Mileage</div>
        <div style="font-size: 24px; font-weight: bold;">{current}</div>
      </div>
      <div style="background: white; padding: 15px; border-radius: 6px; margin: 10px 0;">
        <div style="font-size: 12px; color: #6b7280; text-transform: uppercase;">Next Service Due (Mileage)</div>
        <div style="font-size: 24px; font-weight: bold;">{next_due_mileage} miles</div>
        {miles_line}
      </div>
      <div style="background: white; padding: 15px; border-radius: 6px; margin: 10px 0;">
        <div style="font-size: 12px; color: #6b7280; text-transform: uppercase;">Next Service Due (Date)</div>
        <div style="font-size: 24px; font-weight: bold;">{next_due_date}</div>
        <p style="margin: 5px 0 0 0; font-size: 14px; color: #6b7280;">{days_line}</p>
      </div>
      <p>{call_to_action}</p>
      <p style="text-align: center;">
        <a href="{dashboard}" style="display: inline-block; background: #2563eb; color: white; padding: 12px 24px; text-decoration: none; border-radius: 6px; font-weight: bold;">View Dashboard</a>
      </p>
    </div>
    <p style="text-align: center; color: #6b7280; font-size: 12px; margin-top: 20px;">
      This is an automated reminder from your Oil Change Tracker.<br>
      You're receiving this because your vehicle is due for maintenance.
    </p>
  </body>
</html>"#,
            header_color = header_color,
            heading = heading,
            vehicle = escape_html(&content.vehicle_name),
            reason = content.reason,
            current = current,
            next_due_mileage = format_thousands(content.next_due_mileage),
            miles_line = miles_line,
            next_due_date = content.next_due_date.format("%B %-d, %Y"),
            days_line = describe(content.status.days_remaining, "days"),
            call_to_action = call_to_action,
            dashboard = self.dashboard_link(),
        )
    }
}

fn describe(remaining: i64, unit: &str) -> String {
    if remaining < 0 {
        format!("{} {} overdue", group_digits(remaining.unsigned_abs()), unit)
    } else {
        format!("{} {} remaining", format_thousands(remaining), unit)
    }
}

/// `51900` -> `"51,900"`
pub fn format_thousands(value: i64) -> String {
    let grouped = group_digits(value.unsigned_abs());
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn group_digits(magnitude: u64) -> String {
    let digits = magnitude.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::due_status::{evaluate, LastService, Thresholds};
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSender {
        succeed: bool,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingSender {
        fn new(succeed: bool) -> Self {
            Self {
                succeed,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn result(&self) -> DeliveryResult {
            if self.succeed {
                DeliveryResult::delivered()
            } else {
                DeliveryResult::failed("provider down")
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl EmailSender for RecordingSender {
        async fn send_email(&self, to: &str, subject: &str, _html: &str) -> DeliveryResult {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{}|{}", to, subject));
            self.result()
        }
    }

    impl PushSender for RecordingSender {
        async fn send_push(
            &self,
            token: &str,
            title: &str,
            _body: &str,
            _data: &HashMap<String, String>,
        ) -> DeliveryResult {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{}|{}", token, title));
            self.result()
        }
    }

    fn content(current: i64, next_due: i64) -> NotificationContent {
        let as_of = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let last = LastService {
            mileage_at_service: next_due - 5000,
            next_due_mileage: next_due,
            next_due_date: as_of + Duration::days(60),
        };
        let status = evaluate(Some(current), &last, as_of, Thresholds::default());
        NotificationContent {
            vehicle_name: "Civic".to_string(),
            current_mileage: Some(current),
            next_due_mileage: next_due,
            next_due_date: last.next_due_date,
            status,
            reason: status.reason(),
        }
    }

    fn recipient(email_enabled: bool, token: Option<&str>) -> Recipient {
        Recipient {
            email: "owner@example.com".to_string(),
            fcm_token: token.map(str::to_string),
            email_enabled,
        }
    }

    #[tokio::test]
    async fn test_missing_token_reports_no_token() {
        let dispatcher = NotificationDispatcher::new(
            RecordingSender::new(true),
            RecordingSender::new(true),
            "http://localhost:3000",
        );

        let report = dispatcher
            .dispatch(&recipient(true, None), &content(51_800, 51_900))
            .await;

        assert_eq!(report.email, ChannelOutcome::Sent);
        assert_eq!(report.push, ChannelOutcome::NoToken);
        assert!(report.any_delivered());
        assert_eq!(dispatcher.push.call_count(), 0);
    }

    #[tokio::test]
    async fn test_disabled_email_is_not_sent() {
        let dispatcher = NotificationDispatcher::new(
            RecordingSender::new(true),
            RecordingSender::new(false),
            "http://localhost:3000",
        );

        let report = dispatcher
            .dispatch(&recipient(false, Some("device-1")), &content(51_800, 51_900))
            .await;

        assert_eq!(report.email, ChannelOutcome::Disabled);
        assert_eq!(report.push, ChannelOutcome::Failed);
        assert_eq!(report.push_error.as_deref(), Some("provider down"));
        assert!(!report.any_delivered());
        assert_eq!(dispatcher.email.call_count(), 0);
    }

    #[tokio::test]
    async fn test_push_alone_counts_as_delivered() {
        let dispatcher = NotificationDispatcher::new(
            RecordingSender::new(false),
            RecordingSender::new(true),
            "http://localhost:3000",
        );

        let report = dispatcher
            .dispatch(&recipient(true, Some("device-1")), &content(3_200, 3_000))
            .await;

        assert_eq!(report.email, ChannelOutcome::Failed);
        assert_eq!(report.push, ChannelOutcome::Sent);
        assert!(report.any_delivered());
    }

    #[test]
    fn test_rendering_follows_classification() {
        let dispatcher = NotificationDispatcher::new(
            RecordingSender::new(true),
            RecordingSender::new(true),
            "http://localhost:3000/",
        );

        let upcoming = content(51_800, 51_900);
        assert_eq!(dispatcher.email_subject(&upcoming), "Civic needs oil change soon");
        assert_eq!(dispatcher.push_title(&upcoming), "Civic - Service Due Soon");
        assert_eq!(dispatcher.push_data(&upcoming)["type"], "upcoming");

        let overdue = content(3_200, 3_000);
        assert_eq!(
            dispatcher.email_subject(&overdue),
            "OVERDUE: Civic needs oil change!"
        );
        assert_eq!(dispatcher.push_title(&overdue), "Civic - Oil Change Overdue!");

        let data = dispatcher.push_data(&overdue);
        assert_eq!(data["type"], "overdue");
        assert_eq!(data["milesRemaining"], "-200");
        assert_eq!(data["url"], "/dashboard");

        let html = dispatcher.email_html(&overdue);
        assert!(html.contains("200 miles overdue"));
        assert!(html.contains("3,000 miles"));
        assert!(html.contains("http://localhost:3000/dashboard"));
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(51_900), "51,900");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
        assert_eq!(format_thousands(-4_200), "-4,200");
        assert_eq!(format_thousands(i64::MIN), "-9,223,372,036,854,775,808");
    }

    #[test]
    fn test_describe_matches_reason_wording() {
        assert_eq!(describe(-1_250, "miles"), "1,250 miles overdue");
        assert_eq!(describe(12, "days"), "12 days remaining");
        assert_eq!(
            describe(i64::MIN, "miles"),
            "9,223,372,036,854,775,808 miles overdue"
        );
    }
}
