//! Corruption alerts.
//!
//! When a `damaged` observation is appended, the [`CorruptionNotifier`]
//! publishes a [`CorruptEventAlert`] to the configured alert channel and writes
//! the event to durable audit storage. Both side effects are best-effort:
//! failures are logged and never reach the caller of the append.

pub mod audit;
pub mod notifier;
pub mod pubsub;
pub mod webhook;

pub use audit::{AuditSink, FsAuditStore};
pub use notifier::{CorruptionNotifier, NotifyOutcome};
pub use pubsub::RedisAlertPublisher;
pub use webhook::WebhookAlertPublisher;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::events::ContainerState;

/// Message type tag carried by every corruption alert.
pub const CORRUPT_EVENT_DETECTED: &str = "CORRUPT_EVENT_DETECTED";

/// Alert payload published for a corrupt observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorruptEventAlert {
    #[serde(rename = "type")]
    pub kind: String,
    pub container_id: String,
    pub new_state: ContainerState,
    /// When the alert was raised.
    pub timestamp: DateTime<Utc>,
}

impl CorruptEventAlert {
    pub fn new(container_id: impl Into<String>, new_state: ContainerState) -> Self {
        Self {
            kind: CORRUPT_EVENT_DETECTED.to_string(),
            container_id: container_id.into(),
            new_state,
            timestamp: Utc::now(),
        }
    }

    /// Human-readable subject line for channels that support one.
    pub fn subject(&self) -> String {
        format!("Corrupt event alert: {}", self.container_id)
    }
}

/// An external notification channel with a single destination.
#[async_trait]
pub trait AlertPublisher: Send + Sync {
    async fn publish(&self, alert: &CorruptEventAlert) -> Result<()>;

    /// Destination identifier (topic, channel, URL) for logging.
    fn destination(&self) -> &str;
}
