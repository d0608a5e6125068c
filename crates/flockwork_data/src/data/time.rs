use serde::{Deserialize, Serialize};

/// Source of the per-step time delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SimulationTime {
    /// Use the frame delta supplied by the host.
    #[default]
    FrameDelta,
    /// Ignore the host delta and advance by a fixed step.
    Fixed,
}
