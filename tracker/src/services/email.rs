use anyhow::Result;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use super::notification_service::{DeliveryResult, EmailSender};
use crate::config::EmailConfig;
use crate::constants::http;
use crate::errors::DispatchError;

const PROVIDER: &str = "email";

#[derive(Debug, Serialize)]
struct ResendRequest<'a> {
    from: String,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
}

/// Resend-compatible transactional email client
#[derive(Clone)]
pub struct ResendEmailClient {
    client: Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl ResendEmailClient {
    pub fn new(config: &EmailConfig, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(http::PROVIDER_TIMEOUT)
            .connect_timeout(http::CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/emails", config.api_base.trim_end_matches('/')),
            api_key: api_key.to_string(),
            from: format!("{} <{}>", config.from_name, config.from_email),
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn post(&self, to: &str, subject: &str, html: &str) -> Result<(), DispatchError> {
        if !self.is_configured() {
            return Err(DispatchError::NotConfigured {
                provider: PROVIDER.to_string(),
            });
        }

        let request = ResendRequest {
            from: self.from.clone(),
            to: vec![to],
            subject,
            html,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DispatchError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Rejected {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

impl EmailSender for ResendEmailClient {
    async fn send_email(&self, to: &str, subject: &str, html: &str) -> DeliveryResult {
        match self.post(to, subject, html).await {
            Ok(()) => {
                debug!(to = %to, subject = %subject, "email sent");
                DeliveryResult::delivered()
            }
            Err(DispatchError::NotConfigured { .. }) => DeliveryResult::not_configured(),
            Err(e) => {
                warn!("Failed to send email to {}: {}", to, e);
                DeliveryResult::failed(e.to_string())
            }
        }
    }
}
