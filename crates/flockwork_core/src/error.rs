//! Error types for flockwork_core.
//!
//! Only conditions the host must act on are errors. A query or integration
//! for an agent missing from the last rebuild is not one of them; it resolves
//! to an empty neighbor set or an unchanged agent.

use thiserror::Error;

/// Main error type for flocking operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlockError {
    /// Simulation parameters violate an invariant
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The index was asked to hold more agents than it was allocated for
    #[error("Capacity mismatch: {requested} agents exceed index capacity {capacity}")]
    CapacityMismatch { requested: usize, capacity: usize },
}

/// Result type alias for flocking operations.
pub type Result<T> = std::result::Result<T, FlockError>;

impl FlockError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a new capacity mismatch error.
    #[must_use]
    pub fn capacity(requested: usize, capacity: usize) -> Self {
        Self::CapacityMismatch {
            requested,
            capacity,
        }
    }
}
