use flockwork_data::AgentState;
use glam::Vec3;

/// Read-only view of every agent at the start of a step.
///
/// All per-agent work in a step reads from one of these and never from the
/// buffers being written, so agents can be integrated in any order.
#[derive(Clone, Copy, Debug)]
pub struct FlockSnapshot<'a> {
    positions: &'a [Vec3],
    velocities: &'a [Vec3],
}

impl<'a> FlockSnapshot<'a> {
    /// Pairs the two arrays. Agents past the shorter array are treated as absent.
    #[must_use]
    pub fn new(positions: &'a [Vec3], velocities: &'a [Vec3]) -> Self {
        debug_assert_eq!(positions.len(), velocities.len());
        let len = positions.len().min(velocities.len());
        Self {
            positions: &positions[..len],
            velocities: &velocities[..len],
        }
    }

    #[inline]
    #[must_use]
    pub fn agent(&self, index: usize) -> Option<AgentState> {
        Some(AgentState::new(
            *self.positions.get(index)?,
            *self.velocities.get(index)?,
        ))
    }

    #[inline]
    #[must_use]
    pub fn position(&self, index: usize) -> Option<Vec3> {
        self.positions.get(index).copied()
    }

    #[inline]
    #[must_use]
    pub fn velocity(&self, index: usize) -> Option<Vec3> {
        self.velocities.get(index).copied()
    }

    #[must_use]
    pub fn positions(&self) -> &'a [Vec3] {
        self.positions
    }

    #[must_use]
    pub fn velocities(&self) -> &'a [Vec3] {
        self.velocities
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
