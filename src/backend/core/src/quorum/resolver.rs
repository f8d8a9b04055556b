use metrics::counter;
use std::sync::Arc;
use tracing::instrument;

use super::resolve_events;
use crate::error::{QuorumError, Result};
use crate::events::{ContainerState, EventStore};

/// Resolves the trusted state of a single container.
///
/// Holds no state of its own; every call reads the full history from the
/// store.
#[derive(Clone)]
pub struct QuorumResolver {
    store: Arc<dyn EventStore>,
}

impl QuorumResolver {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Resolve `container_id`.
    ///
    /// Fails with `ContainerNotFound` when no events exist. One or two events
    /// of any mix always resolve to `Unknown`.
    #[instrument(skip(self))]
    pub async fn resolve(&self, container_id: &str) -> Result<ContainerState> {
        let events = self.store.events_for(container_id).await?;

        if events.is_empty() {
            counter!("quorum_resolutions_total", "outcome" => "not_found").increment(1);
            return Err(QuorumError::container_not_found(container_id));
        }

        let state = resolve_events(&events);
        counter!("quorum_resolutions_total", "outcome" => state.as_str()).increment(1);
        tracing::debug!(events = events.len(), state = %state, "Container resolved");

        Ok(state)
    }
}
