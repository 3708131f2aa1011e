//! MongoDB backend provider
//!
//! Translates generic `collection + action + args` work items into native
//! driver calls over a single lazily-established connection.

mod actions;
mod config;
mod provider;

pub use config::{build_url, MongoConfig, ServerEntry};
pub use provider::MongoProvider;
