//! Alert channel over Redis pub/sub.

use async_trait::async_trait;
use tracing::instrument;

use super::{AlertPublisher, CorruptEventAlert};
use crate::error::{ErrorCode, QuorumError, Result};

/// Publishes alerts with `PUBLISH <topic> <json>`.
pub struct RedisAlertPublisher {
    client: redis::Client,
    topic: String,
}

impl RedisAlertPublisher {
    pub fn new(client: redis::Client, topic: impl Into<String>) -> Self {
        Self {
            client,
            topic: topic.into(),
        }
    }

    /// Build a publisher from a connection URL. Does not connect yet.
    pub fn from_url(url: &str, topic: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(url)?;
        Ok(Self::new(client, topic))
    }
}

#[async_trait]
impl AlertPublisher for RedisAlertPublisher {
    #[instrument(skip(self, alert), fields(topic = %self.topic, container_id = %alert.container_id))]
    async fn publish(&self, alert: &CorruptEventAlert) -> Result<()> {
        let payload = serde_json::to_string(alert)?;

        let mut conn = self.client.get_multiplexed_async_connection().await
            .map_err(|e| QuorumError::with_internal(
                ErrorCode::NotificationError,
                "Failed to connect to Redis alert channel",
                e.to_string(),
            ))?;

        let receivers = redis::cmd("PUBLISH")
            .arg(&self.topic)
            .arg(&payload)
            .query_async::<_, i64>(&mut conn)
            .await?;

        tracing::info!(receivers, "Corrupt event alert published");
        Ok(())
    }

    fn destination(&self) -> &str {
        &self.topic
    }
}
