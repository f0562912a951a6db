//! The Stepper
//!
//! Responsible for:
//! - Holding the run state (distances, phase, iteration, edge cursor)
//! - Advancing the algorithm exactly one unit of work per call
//! - Emitting a read-only snapshot after every call

mod engine;
mod snapshot;

pub use engine::BellmanFordStepper;
pub use snapshot::{ActiveEdge, Distance, Phase, StepSnapshot};
