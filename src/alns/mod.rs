//! Adaptive Large Neighborhood Search orchestration.
//!
//! Each iteration picks a destroy and a repair operator by weighted
//! random draw, perturbs the current solution, and accepts or rejects
//! the candidate under a simulated-annealing criterion. Operator weights
//! adapt to past performance, destroy intensity reacts to stagnation,
//! and a prolonged drought restarts the search from the best solution.
//!
//! # References
//!
//! Ropke & Pisinger (2006), "An Adaptive Large Neighborhood Search
//! Heuristic for the Pickup and Delivery Problem with Time Windows"

mod config;
mod destroy;
mod repair;
mod runner;
mod types;

pub use config::AlnsConfig;
pub use destroy::{DestroyOp, RandomRemoval, RelatedRemoval, WorstRemoval};
pub use repair::{GreedyInsertion, RegretInsertion, RepairOp};
pub use runner::{AlnsResult, AlnsRunner};
pub use types::{DestroyOperator, RepairOperator, Unit};
