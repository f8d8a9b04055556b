//! Alert channel over an HTTP webhook.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::instrument;

use super::{AlertPublisher, CorruptEventAlert};
use crate::error::{QuorumError, Result};

/// Body posted to the webhook. `message` is the JSON-encoded alert, so
/// receivers see exactly what the pub/sub channel would carry.
#[derive(Debug, Serialize)]
struct WebhookBody<'a> {
    subject: String,
    message: &'a str,
}

/// Posts alerts to a single configured URL.
pub struct WebhookAlertPublisher {
    client: reqwest::Client,
    url: String,
}

impl WebhookAlertPublisher {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl AlertPublisher for WebhookAlertPublisher {
    #[instrument(skip(self, alert), fields(url = %self.url, container_id = %alert.container_id))]
    async fn publish(&self, alert: &CorruptEventAlert) -> Result<()> {
        let message = serde_json::to_string(alert)?;
        let body = WebhookBody {
            subject: alert.subject(),
            message: &message,
        };

        let resp = self.client.post(&self.url).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(QuorumError::notification(format!(
                "webhook returned {}: {}",
                status, text
            ))
            .with_context("status", status.as_u16()));
        }

        tracing::info!(status = status.as_u16(), "Corrupt event alert delivered");
        Ok(())
    }

    fn destination(&self) -> &str {
        &self.url
    }
}
