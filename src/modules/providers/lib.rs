//! Backend providers for dblayer
//!
//! This crate provides the provider contract (init/validate/process), the
//! static provider registry, the adapter facade exposed to the host
//! pipeline, completion reporting, and the MongoDB backend.

pub mod facade;
pub mod mongodb;
pub mod registry;
pub mod report;
pub mod traits;

pub use facade::{DbLayer, ValidationPolicy};
pub use mongodb::MongoProvider;
pub use registry::{builtin_registry, ProviderFactory, ProviderRegistry};
pub use report::{Completion, EventSink};
pub use traits::{DbProvider, QueryOutcome};
