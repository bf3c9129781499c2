//! Ranklens Core
//!
//! Core domain types, traits, and error handling for Ranklens.
//! This crate has minimal dependencies and defines the shared vocabulary
//! used across all other crates.

pub mod error;
pub mod ids;
pub mod locations;
pub mod normalize;
pub mod ports;
pub mod records;
pub mod snapshot;
pub mod website;

pub use error::{Error, ProviderError, ProviderResult, Result};
pub use ids::*;
