//! The three boundary operations exposed to transport layers.

use std::sync::Arc;
use tracing::instrument;

use crate::alerts::{CorruptionNotifier, NotifyOutcome};
use crate::error::Result;
use crate::events::{ContainerEvent, ContainerState, EventStore, VerifiedContainer};
use crate::observability::metrics::record_event_appended;
use crate::quorum::{QuorumResolver, VerifiedSetAggregator};

/// Entry point for appending observations and querying derived state.
///
/// All collaborators are injected; the service owns no global handles.
#[derive(Clone)]
pub struct ContainerService {
    store: Arc<dyn EventStore>,
    resolver: QuorumResolver,
    aggregator: VerifiedSetAggregator,
    notifier: CorruptionNotifier,
}

impl ContainerService {
    pub fn new(store: Arc<dyn EventStore>, notifier: CorruptionNotifier) -> Self {
        Self {
            resolver: QuorumResolver::new(store.clone()),
            aggregator: VerifiedSetAggregator::new(store.clone()),
            store,
            notifier,
        }
    }

    pub fn store(&self) -> &Arc<dyn EventStore> {
        &self.store
    }

    /// Persist `event`, then run the corruption hook on it.
    ///
    /// Store failures are returned; the hook cannot fail the append.
    #[instrument(skip(self, event), fields(container_id = %event.container_id, state = %event.state))]
    pub async fn append_event(&self, event: ContainerEvent) -> Result<NotifyOutcome> {
        self.store.append(event.clone()).await?;
        record_event_appended(event.state);

        Ok(self.notifier.on_appended(&event).await)
    }

    /// Trusted state of one container.
    pub async fn resolve_state(&self, container_id: &str) -> Result<ContainerState> {
        self.resolver.resolve(container_id).await
    }

    /// Containers whose observation count reached quorum.
    pub async fn list_verified(&self) -> Result<Vec<VerifiedContainer>> {
        self.aggregator.list_verified().await
    }
}
