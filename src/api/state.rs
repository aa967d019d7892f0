//! Application state shared by the handlers

use std::sync::Arc;

use crate::infrastructure::semantic_cache::CacheEngine;

#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: Arc<CacheEngine>,
}

impl AppState {
    pub fn new(engine: Arc<CacheEngine>) -> Self {
        Self { engine }
    }
}
