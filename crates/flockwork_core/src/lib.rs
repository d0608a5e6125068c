//! # Flockwork Core
//!
//! Flocking ("boid") simulation core for large agent populations.
//!
//! This crate contains the per-step simulation logic:
//! - An approximate neighbor index built from three per-axis sorted views
//! - Cohesion, separation, alignment and seek-target force accumulation
//! - Velocity integration with climb limiting and speed clamping
//! - A host-owned [`Flock`] context that runs whole steps in parallel
//! - Configuration, error types, metrics and structured logging
//!
//! ## Architecture
//!
//! Every step reads one immutable snapshot of positions and velocities and
//! writes into separate output buffers, so per-agent work is an independent
//! map that Rayon spreads over fixed-size batches.
//!
//! ## Example
//!
//! ```
//! use flockwork_core::{Flock, FlockConfig};
//!
//! let mut config = FlockConfig::default();
//! config.flock.agent_count = 100;
//! config.flock.seed = Some(42);
//!
//! let mut flock = Flock::new(config).unwrap();
//! let report = flock.step(1.0 / 60.0).unwrap();
//! assert_eq!(report.agents, 100);
//! ```

/// Configuration management for simulation parameters
pub mod config;
/// Error types
pub mod error;
/// Host-owned flock context and the step driver
pub mod flock;
/// Force accumulation and integration for a single agent
pub mod flocking;
/// Step metrics collection and logging setup
pub mod metrics;
/// Read-only per-step view of the agent arrays
pub mod snapshot;
/// Per-axis sorted neighbor index
pub mod spatial_index;

pub use config::{FlockConfig, SimulationParameters, TimeConfig, VelocityRange};
pub use error::{FlockError, Result};
pub use flock::{Flock, StepReport};
pub use flockwork_data::{AgentPosition, AgentState, Axis, NeighborSet, SimulationTime};
pub use metrics::{init_logging, Metrics};
pub use snapshot::FlockSnapshot;
pub use spatial_index::{SortedAxisView, SpatialIndex};
