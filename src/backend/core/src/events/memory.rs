//! In-process event store.
//!
//! Used for tests, local development and the `memory` store backend.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::event::{ContainerEvent, ContainerTally};
use super::store::EventStore;
use crate::error::Result;

/// Event store backed by a vector guarded by a read-write lock.
///
/// Readers always observe whole records: a write lock is held only for the
/// duration of a single push.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: RwLock<Vec<ContainerEvent>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of events across all containers.
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, event: ContainerEvent) -> Result<()> {
        self.events.write().push(event);
        Ok(())
    }

    async fn events_for(&self, container_id: &str) -> Result<Vec<ContainerEvent>> {
        Ok(self
            .events
            .read()
            .iter()
            .filter(|e| e.container_id == container_id)
            .cloned()
            .collect())
    }

    async fn tally_across_all(&self) -> Result<Vec<ContainerTally>> {
        let events = self.events.read();

        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut rows: Vec<ContainerTally> = Vec::new();

        for event in events.iter() {
            match index.get(event.container_id.as_str()) {
                Some(&i) => rows[i].count += 1,
                None => {
                    index.insert(event.container_id.as_str(), rows.len());
                    rows.push(ContainerTally {
                        container_id: event.container_id.clone(),
                        first_state: event.state,
                        count: 1,
                    });
                }
            }
        }

        Ok(rows)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
