//! CLI commands

mod ping;
mod run;

pub use ping::PingCommand;
pub use run::RunCommand;

use clap::{Parser, Subcommand};

/// dblayer - run database work items against a configured provider
#[derive(Parser, Debug)]
#[command(name = "dblayer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Adapter configuration file (JSON with provider/configuration)
    #[arg(short = 'f', long = "file", global = true, default_value = "dblayer.json")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute one work item and print the normalized outcome
    Run(RunCommand),

    /// Construct and initialize the adapter, then exit
    Ping(PingCommand),
}
