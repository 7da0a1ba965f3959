//! Truck-and-drone delivery scheduling via Adaptive Large Neighborhood Search.
//!
//! A small fleet of trucks serves customers out of a single depot while
//! drones fly resupply batches from the depot to meet trucks at customer
//! stops. The solver minimizes the makespan: the time at which the last
//! truck or drone finishes its work.
//!
//! Customers come in three kinds: plain deliveries fed from depot stock
//! (drone-resupplied), and pickup/dropoff pairs that a truck must carry
//! together in order.
//!
//! # Architecture
//!
//! - [`model`]: immutable problem data (`Instance`, `Parameters`).
//! - [`solution`]: mutable route/trip state with a feasibility checker.
//! - [`eval`]: truck timelines, drone trip scheduling, makespan.
//! - [`construct`]: round-robin + nearest-neighbor initial solution.
//! - [`alns`]: the destroy/repair loop with adaptive operator weights
//!   and simulated-annealing acceptance.
//! - [`io`]: instance-file loader and JSON solution report.
//!
//! # References
//!
//! Ropke & Pisinger (2006), "An Adaptive Large Neighborhood Search
//! Heuristic for the Pickup and Delivery Problem with Time Windows"

pub mod alns;
pub mod construct;
pub mod eval;
pub mod io;
pub mod model;
pub mod solution;
