//! # Quorum Core
//!
//! Derives the trusted state of shipping containers from a noisy,
//! multi-source stream of observations.
//!
//! ## Architecture
//!
//! - **Event Store**: Append-only observation log (Postgres or in-memory)
//! - **Quorum Resolver**: Per-container state from a first-seen tally with a threshold of 3
//! - **Verified-Set Aggregator**: Store-wide list of containers that reached quorum
//! - **Corruption Notifier**: Alert and audit side effects for `damaged` observations
//! - **API**: Axum HTTP surface over the three boundary operations
//! - **Observability**: Structured logging, optional OTLP tracing and Prometheus metrics

pub mod alerts;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod observability;
pub mod quorum;
pub mod service;

pub use error::{ErrorCode, ErrorDetails, ErrorSeverity, QuorumError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::alerts::{
        AlertPublisher, AuditSink, CorruptEventAlert, CorruptionNotifier, FsAuditStore,
        NotifyOutcome, RedisAlertPublisher, WebhookAlertPublisher,
    };
    pub use crate::error::{ErrorCode, ErrorDetails, ErrorSeverity, QuorumError, Result};
    pub use crate::events::{
        ContainerEvent, ContainerState, ContainerTally, EventStore, InMemoryEventStore,
        PgEventStore, VerifiedContainer,
    };
    pub use crate::quorum::{QuorumResolver, VerifiedSetAggregator, QUORUM_THRESHOLD};
    pub use crate::service::ContainerService;
}
