use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Kinematic state of a single agent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentState {
    pub position: Vec3,
    pub velocity: Vec3,
}

impl AgentState {
    #[must_use]
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self { position, velocity }
    }

    #[inline]
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// An agent's identity paired with its position, as stored in a sorted axis view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentPosition {
    pub index: usize,
    pub position: Vec3,
}
