use std::sync::Arc;

use crate::observability::metrics::Metrics;
use crate::store::MemoryStore;

pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store: Arc::new(store),
            metrics: Metrics::new(),
        }
    }
}
