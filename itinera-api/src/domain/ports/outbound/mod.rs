mod trip_backend;

pub use trip_backend::*;
