//! Driver simulating passengers and trains arriving at a station
#![warn(missing_docs)]

pub mod simulation;
pub mod slug;

pub use simulation::{run, Report, SimulationError, TrainReport};
