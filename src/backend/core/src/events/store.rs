//! The append-only event store contract.

use async_trait::async_trait;

use super::event::{ContainerEvent, ContainerTally};
use crate::error::Result;

/// Append-only persistence for container observations.
///
/// Implementations never update or delete records. Each append is an
/// independent insert, so concurrent appends for the same container cannot
/// lose data. Errors returned here are store failures and are propagated to
/// the caller untouched.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Durably persist one event. No business validation happens here.
    async fn append(&self, event: ContainerEvent) -> Result<()>;

    /// Every event ever appended for `container_id`, in a consistent order.
    ///
    /// An unknown identifier yields an empty vector, not an error.
    async fn events_for(&self, container_id: &str) -> Result<Vec<ContainerEvent>>;

    /// One row per container with the state of its first recorded event and
    /// its total event count, computed in a single pass over the store.
    async fn tally_across_all(&self) -> Result<Vec<ContainerTally>>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    /// Backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}
