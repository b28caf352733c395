use anyhow::Result;
use reqwest::Client;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::notification_service::{DeliveryResult, PushSender};
use crate::config::PushConfig;
use crate::constants::http;
use crate::errors::DispatchError;

const PROVIDER: &str = "push";

#[derive(Debug, Serialize)]
struct FcmRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Debug, Serialize)]
struct FcmMessage<'a> {
    token: &'a str,
    notification: FcmNotification<'a>,
    data: &'a HashMap<String, String>,
    webpush: FcmWebpush<'a>,
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct FcmWebpush<'a> {
    fcm_options: FcmOptions<'a>,
}

#[derive(Debug, Serialize)]
struct FcmOptions<'a> {
    link: &'a str,
}

/// FCM HTTP v1 style push client
#[derive(Clone)]
pub struct FcmPushClient {
    client: Client,
    endpoint: String,
    access_token: String,
    link: String,
}

impl FcmPushClient {
    /// `link` is opened when the web notification is clicked
    pub fn new(config: &PushConfig, access_token: &str, link: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(http::PROVIDER_TIMEOUT)
            .connect_timeout(http::CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            access_token: access_token.to_string(),
            link,
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.endpoint.is_empty() && !self.access_token.is_empty()
    }

    async fn post(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: &HashMap<String, String>,
    ) -> Result<(), DispatchError> {
        if !self.is_configured() {
            return Err(DispatchError::NotConfigured {
                provider: PROVIDER.to_string(),
            });
        }

        let request = FcmRequest {
            message: FcmMessage {
                token,
                notification: FcmNotification { title, body },
                data,
                webpush: FcmWebpush {
                    fcm_options: FcmOptions { link: &self.link },
                },
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
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

impl PushSender for FcmPushClient {
    async fn send_push(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: &HashMap<String, String>,
    ) -> DeliveryResult {
        match self.post(token, title, body, data).await {
            Ok(()) => {
                debug!(title = %title, "push notification sent");
                DeliveryResult::delivered()
            }
            Err(DispatchError::NotConfigured { .. }) => DeliveryResult::not_configured(),
            Err(e) => {
                warn!("Failed to send push notification: {}", e);
                DeliveryResult::failed(e.to_string())
            }
        }
    }
}
