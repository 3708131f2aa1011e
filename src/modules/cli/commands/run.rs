//! Run command implementation

use anyhow::{bail, Context};
use clap::Args;
use dblayer_core::{AdapterConfig, WorkItem};
use dblayer_providers::{DbLayer, EventSink, ValidationPolicy};
use tracing::info;

/// Run command arguments
#[derive(Args, Debug)]
pub struct RunCommand {
    /// Work item file (JSON with nature/payload)
    #[arg(short, long)]
    pub item: Option<String>,

    /// Inline work item JSON (alternative to --item)
    #[arg(short, long)]
    pub json: Option<String>,

    /// Deliver completion through the legacy event channel instead of
    /// the return value
    #[arg(long)]
    pub events: bool,

    /// Skip the facade-level nature check (legacy validation)
    #[arg(long)]
    pub legacy_validate: bool,
}

impl RunCommand {
    /// Execute the run command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<()> {
        let raw = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read adapter configuration '{}'", config_path))?;
        let config_value: serde_json::Value =
            serde_json::from_str(&raw).context("adapter configuration is not valid JSON")?;
        let config = AdapterConfig::from_value(&config_value)?;

        let item_raw = match (&self.item, &self.json) {
            (Some(path), _) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read work item '{}'", path))?,
            (None, Some(inline)) => inline.clone(),
            (None, None) => bail!("one of --item or --json is required"),
        };
        let item_value: serde_json::Value =
            serde_json::from_str(&item_raw).context("work item is not valid JSON")?;
        let item = WorkItem::from_value(&item_value)?;

        let policy = if self.legacy_validate {
            ValidationPolicy::Legacy
        } else {
            ValidationPolicy::Strict
        };
        let adapter = DbLayer::new(config)?.with_policy(policy);

        adapter.init().await?;
        adapter.validate(&item).await?;

        if self.events {
            let (sink, mut rx) = EventSink::channel();
            adapter.process_emit(&item, &sink).await;
            match rx.recv().await {
                Some(dblayer_providers::Completion::Done { source, output }) => {
                    info!(%source, "done");
                    println!("{}", serde_json::to_string_pretty(&output.to_json())?);
                }
                Some(dblayer_providers::Completion::Error { source, error }) => {
                    info!(%source, "error");
                    return Err(error.into());
                }
                None => bail!("completion channel closed without an event"),
            }
        } else {
            let outcome = adapter.process(&item).await?;
            println!("{}", serde_json::to_string_pretty(&outcome.to_json())?);
        }

        Ok(())
    }
}
