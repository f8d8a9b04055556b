//! Event store backed by PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use super::event::{ContainerEvent, ContainerState, ContainerTally};
use super::store::EventStore;
use crate::error::{ErrorCode, QuorumError, Result};

/// Persistent event store over the `container_events` table.
///
/// Each append is a single-row `INSERT`; nothing is ever updated. The
/// `seq` column fixes a consistent order for reads and tallies.
#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    #[instrument(skip(self, event), fields(container_id = %event.container_id, state = %event.state))]
    async fn append(&self, event: ContainerEvent) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO container_events (container_id, state, ts, source)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&event.container_id)
        .bind(event.state.as_str())
        .bind(event.timestamp)
        .bind(&event.source)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Event appended");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn events_for(&self, container_id: &str) -> Result<Vec<ContainerEvent>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT container_id, state, ts, source
            FROM container_events
            WHERE container_id = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(container_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(EventRow::into_event).collect()
    }

    #[instrument(skip(self))]
    async fn tally_across_all(&self) -> Result<Vec<ContainerTally>> {
        // DISTINCT ON keeps the lowest-seq row per container; the window count
        // is evaluated before the distinct step, so it covers every row.
        let rows = sqlx::query_as::<_, TallyRow>(
            r#"
            SELECT container_id, first_state, count
            FROM (
                SELECT DISTINCT ON (container_id)
                       container_id,
                       state AS first_state,
                       COUNT(*) OVER (PARTITION BY container_id) AS count,
                       seq
                FROM container_events
                ORDER BY container_id, seq ASC
            ) grouped
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TallyRow::into_tally).collect()
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    container_id: String,
    state: String,
    ts: DateTime<Utc>,
    source: Option<String>,
}

impl EventRow {
    fn into_event(self) -> Result<ContainerEvent> {
        Ok(ContainerEvent {
            state: decode_state(&self.state)?,
            container_id: self.container_id,
            timestamp: self.ts,
            source: self.source,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TallyRow {
    container_id: String,
    first_state: String,
    count: i64,
}

impl TallyRow {
    fn into_tally(self) -> Result<ContainerTally> {
        Ok(ContainerTally {
            first_state: decode_state(&self.first_state)?,
            container_id: self.container_id,
            count: usize::try_from(self.count).unwrap_or(0),
        })
    }
}

/// A stored state outside the closed set is corruption of the store, not a
/// caller mistake, so it is reported as a decode failure.
fn decode_state(raw: &str) -> Result<ContainerState> {
    raw.parse::<ContainerState>().map_err(|_| {
        QuorumError::with_internal(
            ErrorCode::DeserializationError,
            "Stored event could not be decoded",
            format!("unexpected state value in store: {}", raw),
        )
    })
}
