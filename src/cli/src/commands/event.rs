//! Event commands.
//!
//! Records a single container observation.

use anyhow::Result;
use chrono::Utc;
use clap::{Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::output::{self, OutputFormat};

/// Permitted container states.
#[derive(Debug, Clone, Copy, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StateArg {
    Operational,
    Damaged,
    Unknown,
}

#[derive(Subcommand)]
pub enum EventCommands {
    /// Record an observation for a container
    Append {
        /// Container identifier
        container_id: String,

        /// Observed state
        #[arg(short, long, value_enum)]
        state: StateArg,

        /// Observation time (ISO-8601); defaults to now
        #[arg(short, long)]
        timestamp: Option<String>,

        /// Reporting source (scanner id, MANUAL, ...)
        #[arg(long)]
        source: Option<String>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateEventRequest {
    container_id: String,
    state: StateArg,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventRecorded {
    message: String,
    #[serde(default)]
    alert_published: bool,
}

pub async fn execute(cmd: EventCommands, client: &ApiClient, format: OutputFormat) -> Result<()> {
    match cmd {
        EventCommands::Append {
            container_id,
            state,
            timestamp,
            source,
        } => {
            let body = CreateEventRequest {
                container_id: container_id.clone(),
                state,
                timestamp: timestamp.unwrap_or_else(|| Utc::now().to_rfc3339()),
                source,
            };

            let resp: EventRecorded = client.post(&["containers", "events"], &body).await?;

            match format {
                OutputFormat::Table => {
                    output::print_success(&resp.message);
                    output::print_detail("Container", &container_id);
                    output::print_detail("Timestamp", &body.timestamp);
                    if matches!(state, StateArg::Damaged) {
                        output::print_info(damaged_notice(resp.alert_published));
                    }
                }
                _ => output::print_item(&resp, format)?,
            }
        }
    }

    Ok(())
}

fn damaged_notice(alert_published: bool) -> &'static str {
    if alert_published {
        "Damaged observation: corruption alert published"
    } else {
        "Damaged observation: no alert was published (channel unconfigured or unavailable)"
    }
}
