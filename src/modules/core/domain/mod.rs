//! Domain models for dblayer

mod config;
mod work;

pub use config::AdapterConfig;
pub use work::{QueryPayload, WorkItem};
