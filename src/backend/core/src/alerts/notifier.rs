//! Post-append hook that raises corruption alerts.

use chrono::Utc;
use metrics::counter;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, instrument, warn};

use super::{AlertPublisher, AuditSink, CorruptEventAlert};
use crate::events::ContainerEvent;

/// What the notifier did for one appended event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyOutcome {
    /// The event was in the alarm state.
    pub triggered: bool,
    /// An alert reached the channel.
    pub alert_published: bool,
    /// Key of the audit record, if one was written.
    pub audit_key: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuditRecord<'a> {
    level: &'static str,
    message: &'static str,
    event: &'a ContainerEvent,
    recorded_at: chrono::DateTime<Utc>,
}

/// Raises alerts for corrupt observations after they are stored.
///
/// Runs synchronously after a successful append. Never fails: alert and
/// audit errors are logged and swallowed, and an absent channel only
/// produces a warning.
#[derive(Clone, Default)]
pub struct CorruptionNotifier {
    publisher: Option<Arc<dyn AlertPublisher>>,
    audit: Option<Arc<dyn AuditSink>>,
}

impl CorruptionNotifier {
    pub fn new(
        publisher: Option<Arc<dyn AlertPublisher>>,
        audit: Option<Arc<dyn AuditSink>>,
    ) -> Self {
        Self { publisher, audit }
    }

    /// A notifier with no channel and no audit storage.
    pub fn disabled() -> Self {
        Self::default()
    }

    #[instrument(skip(self, event), fields(container_id = %event.container_id, state = %event.state))]
    pub async fn on_appended(&self, event: &ContainerEvent) -> NotifyOutcome {
        if !event.state.is_alarm() {
            return NotifyOutcome::default();
        }

        let mut outcome = NotifyOutcome {
            triggered: true,
            ..Default::default()
        };

        outcome.alert_published = self.publish_alert(event).await;
        outcome.audit_key = self.write_audit(event).await;

        outcome
    }

    async fn publish_alert(&self, event: &ContainerEvent) -> bool {
        let Some(publisher) = &self.publisher else {
            warn!("Alert channel not configured; corrupt event alert skipped");
            counter!("quorum_corrupt_alerts_total", "outcome" => "skipped").increment(1);
            return false;
        };

        let alert = CorruptEventAlert::new(&event.container_id, event.state);
        match publisher.publish(&alert).await {
            Ok(()) => {
                counter!("quorum_corrupt_alerts_total", "outcome" => "published").increment(1);
                true
            }
            Err(e) => {
                warn!(
                    destination = publisher.destination(),
                    error = %e,
                    "Failed to publish corrupt event alert"
                );
                counter!("quorum_corrupt_alerts_total", "outcome" => "failed").increment(1);
                false
            }
        }
    }

    async fn write_audit(&self, event: &ContainerEvent) -> Option<String> {
        let serialized = serde_json::to_string(event).unwrap_or_default();
        error!(event = %serialized, "Corrupt event detected");

        let Some(audit) = &self.audit else {
            warn!("Audit storage not configured; corrupt event not persisted to audit log");
            return None;
        };

        let record = AuditRecord {
            level: "error",
            message: "Corrupt event detected",
            event,
            recorded_at: Utc::now(),
        };
        let body = match serde_json::to_string(&record) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Failed to serialize audit record");
                return None;
            }
        };

        match audit.write("error", body, "json").await {
            Ok(key) => Some(key),
            Err(e) => {
                warn!(error = %e, "Failed to write audit record");
                None
            }
        }
    }
}
