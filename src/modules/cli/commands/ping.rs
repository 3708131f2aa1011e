//! Ping command implementation

use anyhow::Context;
use clap::Args;
use dblayer_core::AdapterConfig;
use dblayer_providers::DbLayer;
use tracing::info;

/// Ping command arguments
#[derive(Args, Debug)]
pub struct PingCommand {}

impl PingCommand {
    /// Construct and initialize the configured adapter, then exit.
    /// Useful to check a configuration before wiring it into a pipeline.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<()> {
        let raw = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read adapter configuration '{}'", config_path))?;
        let config_value: serde_json::Value =
            serde_json::from_str(&raw).context("adapter configuration is not valid JSON")?;
        let config = AdapterConfig::from_value(&config_value)?;

        let adapter = DbLayer::new(config)?;
        adapter.init().await?;
        info!(adapter = %adapter.name(), provider = %adapter.provider(), "adapter ready");
        Ok(())
    }
}
