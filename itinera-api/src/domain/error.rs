use time::Date;

use super::models::{ChecklistItemId, TripId};
use thiserror::Error;

/// Errors surfaced by the trip store.
///
/// Not-found conditions are signalled explicitly rather than silently
/// no-opping; callers that want lenient semantics can match on them.
#[derive(Debug, Error)]
pub enum TripStoreError {
    #[error("start date {start} is not before end date {end}")]
    InvalidDateRange { start: Date, end: Date },
    #[error("trip not found: {0}")]
    TripNotFound(TripId),
    #[error("checklist item {item} not found on trip {trip}")]
    ChecklistItemNotFound { trip: TripId, item: ChecklistItemId },
    #[error("{0}")]
    Backend(String),
}

impl TripStoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
