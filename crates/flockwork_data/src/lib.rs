//! Core data structures shared by the flocking simulation crates.

pub mod data;

pub use data::agent::{AgentPosition, AgentState};
pub use data::axis::Axis;
pub use data::neighbors::NeighborSet;
pub use data::time::SimulationTime;
