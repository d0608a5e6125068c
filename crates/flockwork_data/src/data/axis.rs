use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One of the three coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    #[default]
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Extracts this axis' coordinate from a vector.
    #[inline]
    #[must_use]
    pub fn component(self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }

    /// Returns `v` with this axis' coordinate replaced.
    #[inline]
    #[must_use]
    pub fn with_component(self, mut v: Vec3, value: f32) -> Vec3 {
        match self {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
            Axis::Z => v.z = value,
        }
        v
    }

    /// Length of `v` projected onto the plane perpendicular to this axis.
    #[inline]
    #[must_use]
    pub fn planar_length(self, v: Vec3) -> f32 {
        self.with_component(v, 0.0).length()
    }

    #[inline]
    #[must_use]
    pub fn slot(self) -> usize {
        self as usize
    }
}
