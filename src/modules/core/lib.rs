//! Core domain logic for dblayer
//!
//! This crate contains the domain models and error types shared by the
//! adapter facade and the backend providers.

pub mod domain;
pub mod error;

pub use domain::*;
pub use error::{DbLayerError, Result};
