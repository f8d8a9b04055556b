//! Container observation events.
//!
//! An event is an immutable fact reported by one source about one container.
//! The container's state is never stored; it is derived from the full event
//! history at read time (see [`crate::quorum`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::QuorumError;

// =============================================================================
// Container State
// =============================================================================

/// Observed condition of a container. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Operational,
    Damaged,
    Unknown,
}

impl ContainerState {
    /// All permitted values, in declaration order.
    pub const ALL: [ContainerState; 3] = [
        ContainerState::Operational,
        ContainerState::Damaged,
        ContainerState::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerState::Operational => "operational",
            ContainerState::Damaged => "damaged",
            ContainerState::Unknown => "unknown",
        }
    }

    /// Whether an observation in this state raises a corruption alert.
    pub fn is_alarm(&self) -> bool {
        matches!(self, ContainerState::Damaged)
    }
}

impl std::fmt::Display for ContainerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerState {
    type Err = QuorumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operational" => Ok(ContainerState::Operational),
            "damaged" => Ok(ContainerState::Damaged),
            "unknown" => Ok(ContainerState::Unknown),
            other => Err(QuorumError::invalid_state(other)),
        }
    }
}

// =============================================================================
// Container Event
// =============================================================================

/// A single observation record.
///
/// Serializes with the persisted record shape
/// `{containerId, state, timestamp, source}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerEvent {
    /// Caller-supplied container identifier. Not unique per event.
    pub container_id: String,

    pub state: ContainerState,

    /// When the observation was made, as reported by the caller.
    pub timestamp: DateTime<Utc>,

    /// Reporting agent (scanner id, "MANUAL", API key, ...).
    #[serde(default)]
    pub source: Option<String>,
}

impl ContainerEvent {
    pub fn new(
        container_id: impl Into<String>,
        state: ContainerState,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            container_id: container_id.into(),
            state,
            timestamp,
            source: None,
        }
    }

    /// Set the reporting source.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

// =============================================================================
// Derived Views
// =============================================================================

/// A container whose total observation count reached quorum, with the state
/// reported for it by the bulk view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedContainer {
    pub id: String,
    pub state: ContainerState,
}

/// One group of the store-wide tally: a container, the state of the first
/// event recorded for it, and its total event count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerTally {
    pub container_id: String,
    pub first_state: ContainerState,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_parse_closed_set() {
        for state in ContainerState::ALL {
            assert_eq!(state.as_str().parse::<ContainerState>().unwrap(), state);
        }
        assert!("Operational".parse::<ContainerState>().is_err());
        assert!("destroyed".parse::<ContainerState>().is_err());
        assert!("".parse::<ContainerState>().is_err());
    }

    #[test]
    fn test_only_damaged_is_alarm() {
        assert!(ContainerState::Damaged.is_alarm());
        assert!(!ContainerState::Operational.is_alarm());
        assert!(!ContainerState::Unknown.is_alarm());
    }

    #[test]
    fn test_event_serializes_record_shape() {
        let ts = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let event = ContainerEvent::new("c1", ContainerState::Damaged, ts).with_source("SCANNER");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["containerId"], "c1");
        assert_eq!(json["state"], "damaged");
        assert_eq!(json["source"], "SCANNER");
        assert!(json["timestamp"].as_str().unwrap().starts_with("2024-05-01T12:00:00"));

        let restored: ContainerEvent = serde_json::from_value(json).unwrap();
        assert_eq!(restored, event);
    }

    #[test]
    fn test_event_without_source_deserializes() {
        let event: ContainerEvent = serde_json::from_str(
            r#"{"containerId":"c2","state":"unknown","timestamp":"2024-05-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(event.source, None);
        assert_eq!(event.state, ContainerState::Unknown);
    }
}
