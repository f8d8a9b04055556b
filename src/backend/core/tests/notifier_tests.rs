//! Integration tests for the corruption hook that runs after each append.
//!
//! Publisher, audit sink and store are replaced with recording or failing
//! doubles so the number of side effects per append can be asserted exactly.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use quorum_core::alerts::{
    AlertPublisher, AuditSink, CorruptEventAlert, CorruptionNotifier, FsAuditStore,
    CORRUPT_EVENT_DETECTED,
};
use quorum_core::error::{ErrorCode, QuorumError, Result};
use quorum_core::events::{
    ContainerEvent, ContainerState, ContainerTally, EventStore, InMemoryEventStore,
};
use quorum_core::service::ContainerService;

// ============================================================================
// Test Doubles
// ============================================================================

#[derive(Default)]
struct RecordingPublisher {
    published: Mutex<Vec<CorruptEventAlert>>,
}

#[async_trait]
impl AlertPublisher for RecordingPublisher {
    async fn publish(&self, alert: &CorruptEventAlert) -> Result<()> {
        self.published.lock().push(alert.clone());
        Ok(())
    }

    fn destination(&self) -> &str {
        "recording"
    }
}

struct FailingPublisher;

#[async_trait]
impl AlertPublisher for FailingPublisher {
    async fn publish(&self, _alert: &CorruptEventAlert) -> Result<()> {
        Err(QuorumError::notification("topic does not exist"))
    }

    fn destination(&self) -> &str {
        "failing"
    }
}

#[derive(Default)]
struct RecordingAudit {
    writes: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl AuditSink for RecordingAudit {
    async fn write(&self, level: &str, body: String, ext: &str) -> Result<String> {
        self.writes
            .lock()
            .push((level.to_string(), body, ext.to_string()));
        Ok(FsAuditStore::key_for(level, 0, ext))
    }
}

struct FailingAudit;

#[async_trait]
impl AuditSink for FailingAudit {
    async fn write(&self, _level: &str, _body: String, _ext: &str) -> Result<String> {
        Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only bucket").into())
    }
}

fn event(id: &str, state: ContainerState) -> ContainerEvent {
    ContainerEvent::new(id, state, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        .with_source("MANUAL")
}

// ============================================================================
// Trigger Rules
// ============================================================================

#[tokio::test]
async fn test_damaged_triggers_one_publish_and_one_audit_write() {
    let publisher = Arc::new(RecordingPublisher::default());
    let audit = Arc::new(RecordingAudit::default());
    let store = Arc::new(InMemoryEventStore::new());
    let service = ContainerService::new(
        store,
        CorruptionNotifier::new(Some(publisher.clone()), Some(audit.clone())),
    );

    let outcome = service.append_event(event("c7", ContainerState::Damaged)).await.unwrap();

    assert!(outcome.triggered);
    assert!(outcome.alert_published);
    assert_eq!(outcome.audit_key.as_deref(), Some("logs/error-0.json"));

    let published = publisher.published.lock();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].kind, CORRUPT_EVENT_DETECTED);
    assert_eq!(published[0].container_id, "c7");
    assert_eq!(published[0].new_state, ContainerState::Damaged);

    let writes = audit.writes.lock();
    assert_eq!(writes.len(), 1);
    let (level, body, ext) = &writes[0];
    assert_eq!(level, "error");
    assert_eq!(ext, "json");

    let record: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(record["level"], "error");
    assert_eq!(record["event"]["containerId"], "c7");
    assert_eq!(record["event"]["state"], "damaged");
    assert_eq!(record["event"]["source"], "MANUAL");
}

#[tokio::test]
async fn test_non_alarm_states_trigger_nothing() {
    let publisher = Arc::new(RecordingPublisher::default());
    let audit = Arc::new(RecordingAudit::default());
    let service = ContainerService::new(
        Arc::new(InMemoryEventStore::new()),
        CorruptionNotifier::new(Some(publisher.clone()), Some(audit.clone())),
    );

    for state in [ContainerState::Operational, ContainerState::Unknown] {
        let outcome = service.append_event(event("c1", state)).await.unwrap();
        assert!(!outcome.triggered);
        assert!(!outcome.alert_published);
        assert!(outcome.audit_key.is_none());
    }

    assert!(publisher.published.lock().is_empty());
    assert!(audit.writes.lock().is_empty());
}

// ============================================================================
// Failure Isolation
// ============================================================================

#[tokio::test]
async fn test_failing_publisher_does_not_fail_append() {
    let store = Arc::new(InMemoryEventStore::new());
    let audit = Arc::new(RecordingAudit::default());
    let service = ContainerService::new(
        store.clone(),
        CorruptionNotifier::new(Some(Arc::new(FailingPublisher)), Some(audit.clone())),
    );

    let appended = event("c2", ContainerState::Damaged);
    let outcome = service.append_event(appended.clone()).await.unwrap();

    assert!(outcome.triggered);
    assert!(!outcome.alert_published);
    assert_eq!(audit.writes.lock().len(), 1);
    assert_eq!(store.events_for("c2").await.unwrap(), vec![appended]);
}

#[tokio::test]
async fn test_failing_audit_does_not_fail_append() {
    let store = Arc::new(InMemoryEventStore::new());
    let publisher = Arc::new(RecordingPublisher::default());
    let service = ContainerService::new(
        store.clone(),
        CorruptionNotifier::new(Some(publisher.clone()), Some(Arc::new(FailingAudit))),
    );

    let outcome = service.append_event(event("c3", ContainerState::Damaged)).await.unwrap();

    assert!(outcome.alert_published);
    assert!(outcome.audit_key.is_none());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_unconfigured_channel_skips_publication() {
    let store = Arc::new(InMemoryEventStore::new());
    let audit = Arc::new(RecordingAudit::default());
    let service = ContainerService::new(
        store.clone(),
        CorruptionNotifier::new(None, Some(audit.clone())),
    );

    let outcome = service.append_event(event("c4", ContainerState::Damaged)).await.unwrap();

    assert!(outcome.triggered);
    assert!(!outcome.alert_published);
    assert_eq!(audit.writes.lock().len(), 1);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_disabled_notifier_still_appends() {
    let store = Arc::new(InMemoryEventStore::new());
    let service = ContainerService::new(store.clone(), CorruptionNotifier::disabled());

    let outcome = service.append_event(event("c5", ContainerState::Damaged)).await.unwrap();

    assert!(outcome.triggered);
    assert!(!outcome.alert_published);
    assert!(outcome.audit_key.is_none());
    assert_eq!(store.len(), 1);
}

// ============================================================================
// Filesystem Audit Store
// ============================================================================

#[tokio::test]
async fn test_audit_record_written_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let service = ContainerService::new(
        Arc::new(InMemoryEventStore::new()),
        CorruptionNotifier::new(None, Some(Arc::new(FsAuditStore::new(dir.path())))),
    );

    let outcome = service.append_event(event("c6", ContainerState::Damaged)).await.unwrap();
    let key = outcome.audit_key.expect("audit key");

    assert!(key.starts_with("logs/error-"));
    assert!(key.ends_with(".json"));

    let body = tokio::fs::read_to_string(dir.path().join(&key)).await.unwrap();
    let record: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(record["message"], "Corrupt event detected");
    assert_eq!(record["event"]["containerId"], "c6");
    assert!(record["recordedAt"].is_string());
}

#[tokio::test]
async fn test_every_damaged_append_gets_its_own_audit_file() {
    let dir = tempfile::tempdir().unwrap();
    let service = ContainerService::new(
        Arc::new(InMemoryEventStore::new()),
        CorruptionNotifier::new(None, Some(Arc::new(FsAuditStore::new(dir.path())))),
    );

    let mut keys = Vec::new();
    for i in 0..20 {
        let outcome = service
            .append_event(event(&format!("burst-{}", i), ContainerState::Damaged))
            .await
            .unwrap();
        keys.push(outcome.audit_key.expect("audit key"));
    }

    let mut distinct = keys.clone();
    distinct.sort();
    distinct.dedup();
    assert_eq!(distinct.len(), 20);

    let mut files = 0;
    let mut entries = tokio::fs::read_dir(dir.path().join("logs")).await.unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        let body = tokio::fs::read_to_string(entry.path()).await.unwrap();
        let record: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(record["event"]["containerId"].as_str().unwrap().starts_with("burst-"));
        files += 1;
    }
    assert_eq!(files, 20);
}

// ============================================================================
// Store Failures
// ============================================================================

struct FailingStore;

#[async_trait]
impl EventStore for FailingStore {
    async fn append(&self, _event: ContainerEvent) -> Result<()> {
        Err(QuorumError::with_internal(
            ErrorCode::DatabaseQueryFailed,
            "Event store query failed",
            "connection reset by peer",
        ))
    }

    async fn events_for(&self, _container_id: &str) -> Result<Vec<ContainerEvent>> {
        Err(QuorumError::new(ErrorCode::DatabaseQueryFailed, "Event store query failed"))
    }

    async fn tally_across_all(&self) -> Result<Vec<ContainerTally>> {
        Err(QuorumError::new(ErrorCode::DatabaseQueryFailed, "Event store query failed"))
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

#[tokio::test]
async fn test_failed_append_propagates_and_skips_side_effects() {
    let publisher = Arc::new(RecordingPublisher::default());
    let audit = Arc::new(RecordingAudit::default());
    let service = ContainerService::new(
        Arc::new(FailingStore),
        CorruptionNotifier::new(Some(publisher.clone()), Some(audit.clone())),
    );

    let err = service
        .append_event(event("c8", ContainerState::Damaged))
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::DatabaseQueryFailed);
    assert_eq!(err.error_code(), "STORE_ERROR");
    assert!(publisher.published.lock().is_empty());
    assert!(audit.writes.lock().is_empty());
}

#[tokio::test]
async fn test_failed_reads_propagate() {
    let service = ContainerService::new(Arc::new(FailingStore), CorruptionNotifier::disabled());

    let err = service.resolve_state("c9").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::DatabaseQueryFailed);

    let err = service.list_verified().await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::DatabaseQueryFailed);
}
