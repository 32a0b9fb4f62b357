use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{
    models::Trip,
    ports::outbound::{BackendError, TripBackend},
};

/// Stand-in persistence collaborator: serves a seeded collection (or a
/// configured failure) after a simulated network delay.
///
/// Clones share state, so a test can reconfigure the backend while a
/// fetch is in flight.
#[derive(Clone, Default)]
pub struct SimulatedBackend {
    trips: Arc<RwLock<Vec<Trip>>>,
    delay: Arc<RwLock<Duration>>,
    failure: Arc<RwLock<Option<String>>>,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trips(self, trips: Vec<Trip>) -> Self {
        *self.trips.write().unwrap() = trips;
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.write().unwrap() = delay;
        self
    }

    /// Make every fetch fail with the given message.
    pub fn failing_with(self, message: impl Into<String>) -> Self {
        *self.failure.write().unwrap() = Some(message.into());
        self
    }

    pub fn set_trips(&self, trips: Vec<Trip>) {
        *self.trips.write().unwrap() = trips;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.write().unwrap() = delay;
    }
}

#[async_trait]
impl TripBackend for SimulatedBackend {
    async fn fetch_trips(&self) -> Result<Vec<Trip>, BackendError> {
        let delay = *self.delay.read().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.failure.read().unwrap().clone() {
            return Err(BackendError::new(message));
        }
        Ok(self.trips.read().unwrap().clone())
    }
}
