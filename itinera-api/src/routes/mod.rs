pub(crate) mod checklist;
pub(crate) mod error;
pub(crate) mod trips;

pub(crate) use error::ApiError;
