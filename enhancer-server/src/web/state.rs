//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedRouter;
use crate::enhance::TripTransformer;
use crate::stops::StopsStore;

/// The production pipeline: loaded stops and the cached GraphHopper router.
pub type Transformer = TripTransformer<StopsStore, CachedRouter>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Trip enhancement pipeline
    pub transformer: Arc<Transformer>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(transformer: Transformer) -> Self {
        Self {
            transformer: Arc::new(transformer),
        }
    }
}
