//! Orchestration layer between the HTTP surface, the snapshot store and the
//! upstream SEO provider.
//!
//! Every read goes through the same cache-aside sequence: serve a fresh
//! snapshot when one exists, otherwise refresh from the provider and persist
//! the result, otherwise fall back to whatever stale snapshot is on disk.
//! Provider trouble never surfaces to callers as an error.

pub mod guard;
pub mod maintenance;
pub mod orchestrator;

pub use guard::authorize_website;
pub use maintenance::{CleanupReport, run_keyword_cleanup};
pub use orchestrator::SeoEngine;
