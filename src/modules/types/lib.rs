//! Type definitions for dblayer
//!
//! This crate contains shared type definitions used across the dblayer
//! codebase, including provider kinds and work-item nature tags.

pub mod nature;
pub mod provider;

pub use nature::Nature;
pub use provider::ProviderKind;
