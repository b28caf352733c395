//! Mock email and push provider servers
//!
//! These stand in for the transactional email API and the push endpoint so
//! dispatch can be exercised over real HTTP without credentials.

use serde_json::Value;
use tracker::config::{EmailConfig, PushConfig};
use tracker::services::{FcmPushClient, ResendEmailClient};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const EMAIL_API_KEY: &str = "re_test_key";
pub const PUSH_ACCESS_TOKEN: &str = "push-test-token";
pub const PUSH_PATH: &str = "/v1/projects/test/messages:send";

/// Mock transactional email API
pub struct MockEmailServer {
    pub server: MockServer,
    pub base_url: String,
}

impl MockEmailServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    /// Accept every authenticated send
    pub async fn mock_success(&self) {
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", format!("Bearer {}", EMAIL_API_KEY).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "email-1"
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_failure(&self, status_code: u16) {
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(status_code).set_body_string("provider error"))
            .mount(&self.server)
            .await;
    }

    pub fn config(&self) -> EmailConfig {
        EmailConfig {
            api_base: self.base_url.clone(),
            ..EmailConfig::default()
        }
    }

    pub fn client(&self) -> ResendEmailClient {
        ResendEmailClient::new(&self.config(), EMAIL_API_KEY).expect("email client")
    }

    /// JSON bodies of every request received so far
    pub async fn sent(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|req| req.body_json::<Value>().ok())
            .collect()
    }
}

/// Mock push notification endpoint
pub struct MockPushServer {
    pub server: MockServer,
    pub base_url: String,
}

impl MockPushServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    pub async fn mock_success(&self) {
        Mock::given(method("POST"))
            .and(path(PUSH_PATH))
            .and(header(
                "authorization",
                format!("Bearer {}", PUSH_ACCESS_TOKEN).as_str(),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "projects/test/messages/1"
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_failure(&self, status_code: u16) {
        Mock::given(method("POST"))
            .and(path(PUSH_PATH))
            .respond_with(ResponseTemplate::new(status_code))
            .mount(&self.server)
            .await;
    }

    pub fn config(&self) -> PushConfig {
        PushConfig {
            endpoint: format!("{}{}", self.base_url, PUSH_PATH),
        }
    }

    pub fn client(&self) -> FcmPushClient {
        FcmPushClient::new(
            &self.config(),
            PUSH_ACCESS_TOKEN,
            "http://localhost:3000/dashboard".to_string(),
        )
        .expect("push client")
    }

    pub async fn sent(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|req| req.body_json::<Value>().ok())
            .collect()
    }
}
