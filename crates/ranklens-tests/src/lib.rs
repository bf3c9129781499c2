//! Integration tests for Ranklens.
//!
//! This crate provides shared test infrastructure:
//! - In-memory fakes for every port the engine consumes
//! - Fixture builders for websites and provider payloads
//! - An HTTP harness that serves the real router on an ephemeral port
//! - Container management for Postgres-backed tests (feature `integration`)

pub mod containers;
pub mod fakes;
pub mod fixtures;
pub mod helpers;

pub use containers::*;
pub use fakes::*;
pub use fixtures::*;
pub use helpers::*;

/// Initialize test logging
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}
