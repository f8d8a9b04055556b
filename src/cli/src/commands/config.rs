//! Configuration management commands.
//!
//! Stores CLI configuration in `<config dir>/quorum/config.toml`.

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::output::{self, OutputFormat};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the stored configuration
    Show,

    /// Set the default API server URL
    SetUrl {
        /// Base URL, e.g. http://localhost:3000
        url: String,
    },
}

/// Persistent CLI configuration stored on disk.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

fn config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(dir.join("quorum").join("config.toml"))
}

/// Load the CLI configuration, returning defaults if the file does not exist.
fn load_config() -> Result<CliConfig> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(CliConfig::default());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn save_config(cfg: &CliConfig) -> Result<PathBuf> {
    let path = config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(cfg).context("Failed to serialize config")?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// The stored API URL, if any.
pub fn load_api_url() -> Option<String> {
    load_config().ok().and_then(|cfg| cfg.api_url)
}

pub async fn execute(cmd: ConfigCommands, format: OutputFormat) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let cfg = load_config()?;
            match format {
                OutputFormat::Table => {
                    output::print_header("Configuration");
                    output::print_detail("File", &config_path()?.display().to_string());
                    output::print_detail("api_url", cfg.api_url.as_deref().unwrap_or("(not set)"));
                }
                _ => output::print_item(&cfg, format)?,
            }
        }

        ConfigCommands::SetUrl { url } => {
            reqwest::Url::parse(&url).with_context(|| format!("Invalid URL: {}", url))?;

            let mut cfg = load_config()?;
            cfg.api_url = Some(url.clone());
            let path = save_config(&cfg)?;

            match format {
                OutputFormat::Table => {
                    output::print_success(&format!("api_url = {}", url));
                    output::print_detail("Saved to", &path.display().to_string());
                }
                _ => output::print_item(&cfg, format)?,
            }
        }
    }

    Ok(())
}
