//! Tests for the webhook alert channel against a mock HTTP server.

use std::sync::Arc;

use chrono::Utc;
use quorum_core::alerts::{
    AlertPublisher, CorruptEventAlert, CorruptionNotifier, WebhookAlertPublisher,
};
use quorum_core::error::ErrorCode;
use quorum_core::events::{ContainerEvent, ContainerState, EventStore, InMemoryEventStore};
use quorum_core::service::ContainerService;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_publish_posts_subject_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/alerts"))
        .and(body_partial_json(serde_json::json!({
            "subject": "Corrupt event alert: c1"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let publisher = WebhookAlertPublisher::new(format!("{}/alerts", server.uri())).unwrap();
    let alert = CorruptEventAlert::new("c1", ContainerState::Damaged);

    publisher.publish(&alert).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let message: serde_json::Value =
        serde_json::from_str(body["message"].as_str().unwrap()).unwrap();
    assert_eq!(message["type"], "CORRUPT_EVENT_DETECTED");
    assert_eq!(message["containerId"], "c1");
    assert_eq!(message["newState"], "damaged");
}

#[tokio::test]
async fn test_non_success_status_is_notification_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("topic unavailable"))
        .mount(&server)
        .await;

    let publisher = WebhookAlertPublisher::new(server.uri()).unwrap();
    let err = publisher
        .publish(&CorruptEventAlert::new("c1", ContainerState::Damaged))
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::NotificationError);
    assert_eq!(err.details().context.get("status"), Some(&serde_json::json!(503)));
}

#[tokio::test]
async fn test_webhook_failure_is_swallowed_by_append() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryEventStore::new());
    let publisher = Arc::new(WebhookAlertPublisher::new(server.uri()).unwrap());
    let service = ContainerService::new(store.clone(), CorruptionNotifier::new(Some(publisher), None));

    let event = ContainerEvent::new("c1", ContainerState::Damaged, Utc::now());
    let outcome = service.append_event(event.clone()).await.unwrap();

    assert!(outcome.triggered);
    assert!(!outcome.alert_published);
    assert_eq!(store.events_for("c1").await.unwrap(), vec![event]);
}

#[tokio::test]
async fn test_operational_event_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let publisher = Arc::new(WebhookAlertPublisher::new(server.uri()).unwrap());
    let service = ContainerService::new(
        Arc::new(InMemoryEventStore::new()),
        CorruptionNotifier::new(Some(publisher), None),
    );

    service
        .append_event(ContainerEvent::new("c1", ContainerState::Operational, Utc::now()))
        .await
        .unwrap();
}
