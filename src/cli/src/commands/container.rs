//! Container query commands.
//!
//! Provides status (quorum-resolved state) and list (verified containers).

use anyhow::Result;
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{self, OutputFormat};

#[derive(Subcommand)]
pub enum ContainerCommands {
    /// Show the trusted state of a container
    Status {
        /// Container identifier
        container_id: String,
    },

    /// List containers with at least three recorded observations
    List,
}

#[derive(Debug, Deserialize, Serialize)]
struct StatusResponse {
    id: String,
    estado: String,
}

#[derive(Debug, Deserialize, Serialize, Tabled)]
struct VerifiedRow {
    #[tabled(rename = "Container")]
    id: String,
    #[tabled(rename = "State")]
    state: String,
}

pub async fn execute(
    cmd: ContainerCommands,
    client: &ApiClient,
    format: OutputFormat,
) -> Result<()> {
    match cmd {
        ContainerCommands::Status { container_id } => {
            let status: StatusResponse = client
                .get(&["containers", container_id.as_str(), "status"])
                .await?;

            match format {
                OutputFormat::Table => {
                    output::print_header(&format!("Container: {}", status.id));
                    output::print_detail("State", &output::colorize_state(&status.estado));
                }
                _ => output::print_item(&status, format)?,
            }
        }

        ContainerCommands::List => {
            let rows: Vec<VerifiedRow> = client.get(&["containers"]).await?;
            output::print_list(&rows, format)?;
        }
    }

    Ok(())
}
