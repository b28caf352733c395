//! Email and push provider client tests against mock HTTP servers

mod common;

use std::collections::HashMap;

use common::{MockEmailServer, MockPushServer};
use tracker::config::{EmailConfig, PushConfig};
use tracker::services::{EmailSender, FcmPushClient, PushSender, ResendEmailClient};

#[tokio::test]
async fn test_email_is_posted_with_sender_and_auth() {
    let server = MockEmailServer::start().await;
    server.mock_success().await;

    let result = server
        .client()
        .send_email("owner@example.com", "Civic needs oil change soon", "<p>hi</p>")
        .await;

    assert!(result.success);
    assert!(result.error.is_none());

    let sent = server.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["from"], "Oil Change Tracker <onboarding@resend.dev>");
    assert_eq!(sent[0]["to"][0], "owner@example.com");
    assert_eq!(sent[0]["html"], "<p>hi</p>");
}

#[tokio::test]
async fn test_email_rejection_reports_status() {
    let server = MockEmailServer::start().await;
    server.mock_failure(422).await;

    let result = server
        .client()
        .send_email("owner@example.com", "subject", "body")
        .await;

    assert!(!result.success);
    let error = result.error.unwrap();
    assert!(error.contains("422"));
    assert!(error.contains("provider error"));
}

#[tokio::test]
async fn test_email_without_api_key_is_not_sent() {
    let server = MockEmailServer::start().await;
    server.mock_success().await;

    let client = ResendEmailClient::new(&server.config(), "").unwrap();
    assert!(!client.is_configured());

    let result = client.send_email("owner@example.com", "subject", "body").await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("not configured"));
    assert!(server.sent().await.is_empty());
}

#[tokio::test]
async fn test_unreachable_email_provider_fails_without_panicking() {
    let config = EmailConfig {
        api_base: "http://127.0.0.1:1".to_string(),
        ..EmailConfig::default()
    };
    let client = ResendEmailClient::new(&config, "re_key").unwrap();

    let result = client.send_email("owner@example.com", "subject", "body").await;
    assert!(!result.success);
    assert!(result.error.unwrap().contains("request failed"));
}

#[tokio::test]
async fn test_push_message_shape() {
    let server = MockPushServer::start().await;
    server.mock_success().await;

    let data = HashMap::from([
        ("vehicleName".to_string(), "Civic".to_string()),
        ("type".to_string(), "upcoming".to_string()),
    ]);
    let result = server
        .client()
        .send_push("device-token", "Civic - Service Due Soon", "100 miles remaining", &data)
        .await;

    assert!(result.success);

    let sent = server.sent().await;
    let message = &sent[0]["message"];
    assert_eq!(message["token"], "device-token");
    assert_eq!(message["notification"]["body"], "100 miles remaining");
    assert_eq!(message["data"]["type"], "upcoming");
    assert_eq!(
        message["webpush"]["fcm_options"]["link"],
        "http://localhost:3000/dashboard"
    );
}

#[tokio::test]
async fn test_push_rejection_is_a_failure() {
    let server = MockPushServer::start().await;
    server.mock_failure(404).await;

    let result = server
        .client()
        .send_push("stale-token", "title", "body", &HashMap::new())
        .await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("404"));
}

#[tokio::test]
async fn test_push_without_endpoint_is_not_configured() {
    let client = FcmPushClient::new(
        &PushConfig::default(),
        "token",
        "http://localhost:3000/dashboard".to_string(),
    )
    .unwrap();
    assert!(!client.is_configured());

    let result = client
        .send_push("device-token", "title", "body", &HashMap::new())
        .await;
    assert_eq!(result.error.as_deref(), Some("not configured"));
}
