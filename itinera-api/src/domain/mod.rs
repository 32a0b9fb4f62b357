pub mod models;
pub mod ports;
pub mod services;

mod error;

pub use error::TripStoreError;
