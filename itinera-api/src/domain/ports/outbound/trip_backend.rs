use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::Trip;

/// A persistence backend failure, carrying a human-readable message that
/// the store surfaces verbatim in its error slot.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Outbound port for the persistence collaborator.
///
/// The store never assumes durability; whatever this returns simply
/// replaces the in-memory collection.
#[async_trait]
pub trait TripBackend: Send + Sync + 'static {
    /// Load the full trip collection.
    async fn fetch_trips(&self) -> Result<Vec<Trip>, BackendError>;
}
