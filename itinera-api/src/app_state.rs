use std::sync::Arc;

use crate::domain::{ports::outbound::TripBackend, services::TripStore};

/// Shared handler state: the trip store is an explicit, constructible
/// container injected here, never a module-level global.
#[derive(Clone)]
pub struct AppState {
    pub trip_store: Arc<TripStore>,
}

impl AppState {
    pub fn new(backend: Arc<dyn TripBackend>) -> Self {
        Self {
            trip_store: Arc::new(TripStore::new(backend)),
        }
    }
}
