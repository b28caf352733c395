//! Router wired to an in-memory database and mock providers

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use super::mock_providers::{MockEmailServer, MockPushServer};
use super::test_data::CRON_SECRET;
use super::test_database::TestDatabase;
use tracker::config::Config;
use tracker::services::{NotificationDispatcher, SweepService};
use tracker::sweep_tracker::SweepTracker;
use tracker::web::{create_router, middleware::USER_ID_HEADER, AppState};

pub struct TestApp {
    pub router: Router,
    pub database: TestDatabase,
    pub email: MockEmailServer,
    pub push: MockPushServer,
    pub tracker: SweepTracker,
}

impl TestApp {
    /// Both providers accept every send
    pub async fn new() -> Self {
        Self::with_cron_secret(CRON_SECRET).await
    }

    pub async fn with_cron_secret(cron_secret: &str) -> Self {
        let database = TestDatabase::new().await.expect("test database");
        let email = MockEmailServer::start().await;
        email.mock_success().await;
        let push = MockPushServer::start().await;
        push.mock_success().await;

        let mut config: Config = toml::from_str("").expect("default config");
        config.secrets.cron_secret = cron_secret.to_string();
        let config = Arc::new(config);

        let dispatcher = Arc::new(NotificationDispatcher::new(
            email.client(),
            push.client(),
            config.dashboard_url.clone(),
        ));
        let tracker = SweepTracker::new();
        let sweep_service = Arc::new(SweepService::new(
            database.db.clone(),
            dispatcher.clone(),
            tracker.clone(),
            config.require_current_mileage,
        ));

        let state = AppState::new(config, database.db.clone(), sweep_service, dispatcher);

        Self {
            router: create_router(state),
            database,
            email,
            push,
            tracker,
        }
    }

    /// Sends one request and returns the status with the decoded JSON body
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        user_id: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user_id {
            builder = builder.header(USER_ID_HEADER, user_id);
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    /// Calls the sweep endpoint with `secret` as the bearer token
    pub async fn trigger_sweep(&self, secret: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("GET")
            .uri("/api/cron/check-vehicles");
        if let Some(secret) = secret {
            builder = builder.header("authorization", format!("Bearer {}", secret));
        }
        self.send_request(builder.body(Body::empty()).expect("request"))
            .await
    }
}
