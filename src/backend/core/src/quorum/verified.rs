use std::sync::Arc;
use tracing::instrument;

use super::QUORUM_THRESHOLD;
use crate::error::Result;
use crate::events::{EventStore, VerifiedContainer};

/// Computes the store-wide list of verified containers in one pass.
#[derive(Clone)]
pub struct VerifiedSetAggregator {
    store: Arc<dyn EventStore>,
}

impl VerifiedSetAggregator {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Containers with at least [`QUORUM_THRESHOLD`] events in total.
    ///
    /// The reported state is that of the container's first recorded event,
    /// not a per-state quorum. For mixed histories this can differ from
    /// [`super::QuorumResolver::resolve`].
    #[instrument(skip(self))]
    pub async fn list_verified(&self) -> Result<Vec<VerifiedContainer>> {
        let verified: Vec<VerifiedContainer> = self
            .store
            .tally_across_all()
            .await?
            .into_iter()
            .filter(|row| row.count >= QUORUM_THRESHOLD)
            .map(|row| VerifiedContainer {
                id: row.container_id,
                state: row.first_state,
            })
            .collect();

        tracing::debug!(count = verified.len(), "Verified set computed");
        Ok(verified)
    }
}
