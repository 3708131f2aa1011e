//! dblayer CLI
//!
//! This crate provides the command-line interface for dblayer including:
//! - run: execute one database work item against a configured adapter
//! - ping: construct and initialize an adapter without processing anything

pub mod commands;

pub use commands::{Cli, Commands};
