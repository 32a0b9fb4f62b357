mod budget;
mod checklist;
mod destination;
mod expense;
mod ids;
mod insights;
mod traveler;
mod trip;

pub use budget::*;
pub use checklist::*;
pub use destination::*;
pub use expense::*;
pub use ids::*;
pub use insights::*;
pub use traveler::*;
pub use trip::*;
