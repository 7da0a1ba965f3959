//! Static problem data.
//!
//! An [`Instance`] owns the customer list, the Manhattan distance matrix
//! used for truck travel and the Euclidean distances used for drone
//! flight, plus the pickup↔dropoff pairing maps. [`Parameters`] carries
//! the fleet and timing constants. Both are immutable after construction
//! and shared read-only by every other component.

mod customer;
mod instance;
mod params;

pub use customer::{Customer, CustomerKind};
pub use instance::Instance;
pub use params::Parameters;
