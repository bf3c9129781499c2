//! Application state shared across handlers.

use ranklens_engine::SeoEngine;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SeoEngine>,
}

impl AppState {
    pub fn new(engine: Arc<SeoEngine>) -> Self {
        Self { engine }
    }
}
