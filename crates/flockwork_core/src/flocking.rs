//! Per-agent force accumulation and integration.
//!
//! Four contributions are summed into an acceleration:
//! - **Cohesion**: toward the mean position of nearby neighbors
//! - **Separation**: away from the single closest neighbor ahead
//! - **Alignment**: along the mean velocity of neighbors in a forward cone
//! - **Seek**: toward the shared target, growing with the square of its distance
//!
//! The result is integrated over `dt`, its climb is limited relative to
//! horizontal speed, and its magnitude is pulled into the configured range.

use crate::config::{SimulationParameters, VelocityRange};
use crate::snapshot::FlockSnapshot;
use flockwork_data::{AgentState, Axis, NeighborSet};
use glam::Vec3;

/// Vertical speed allowed per unit of horizontal speed.
pub const CLIMB_RATIO: f32 = 0.8;
/// Scale applied to the quadratic seek force.
pub const SEEK_SCALE: f32 = 0.01;
/// Minimum heading dot product for a neighbor to count toward cohesion.
pub const COHESION_MIN_DOT: f32 = -1.0;
/// Minimum heading dot product for a neighbor to be considered for separation.
pub const SEPARATION_MIN_DOT: f32 = 0.0;
/// Minimum heading dot product for a neighbor to count toward alignment.
pub const ALIGNMENT_MIN_DOT: f32 = 0.5;

/// Geometry of one neighbor relative to the integrating agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborSample {
    pub index: usize,
    pub position: Vec3,
    pub velocity: Vec3,
    /// `neighbor.position - agent.position`
    pub direction: Vec3,
    pub distance: f32,
    /// `agent.velocity · direction`
    pub heading_dot: f32,
}

/// Computes the per-neighbor geometry shared by all four forces.
///
/// See [`sample_neighbors_into`].
#[must_use]
pub fn sample_neighbors(
    index: usize,
    agent: AgentState,
    neighbors: &NeighborSet,
    snapshot: FlockSnapshot<'_>,
) -> Vec<NeighborSample> {
    let mut samples = Vec::with_capacity(neighbors.len());
    sample_neighbors_into(index, agent, neighbors, snapshot, &mut samples);
    samples
}

/// Computes the per-neighbor geometry into `samples`, replacing its contents.
///
/// Indices that are the agent itself or outside the snapshot are skipped.
pub fn sample_neighbors_into(
    index: usize,
    agent: AgentState,
    neighbors: &NeighborSet,
    snapshot: FlockSnapshot<'_>,
    samples: &mut Vec<NeighborSample>,
) {
    samples.clear();
    samples.extend(
        neighbors
            .iter()
            .filter(|&j| j != index)
            .filter_map(|j| {
                let other = snapshot.agent(j)?;
                let direction = other.position - agent.position;
                Some(NeighborSample {
                    index: j,
                    position: other.position,
                    velocity: other.velocity,
                    direction,
                    distance: direction.length(),
                    heading_dot: agent.velocity.dot(direction),
                })
            }),
    );
}

/// Pull toward the mean position of neighbors within the cohesion radius.
///
/// Exactly zero when no neighbor qualifies.
#[must_use]
pub fn cohesion(agent: AgentState, samples: &[NeighborSample], params: &SimulationParameters) -> Vec3 {
    let mut center = Vec3::ZERO;
    let mut count = 0u32;
    for s in samples {
        if s.distance < params.max_cohesion_distance && s.heading_dot > COHESION_MIN_DOT {
            center += s.position;
            count += 1;
        }
    }
    if count == 0 {
        return Vec3::ZERO;
    }
    center /= count as f32;
    params.cohesion_factor * (center - agent.position)
}

/// Push away from the closest neighbor ahead of the agent.
///
/// `separation_factor` is both the candidate radius and the force weight, and
/// the falloff is measured against `max_cohesion_distance`.
#[must_use]
pub fn separation(
    agent: AgentState,
    samples: &[NeighborSample],
    params: &SimulationParameters,
) -> Vec3 {
    let mut nearest: Option<&NeighborSample> = None;
    let mut min_distance = f32::MAX;
    for s in samples {
        if s.distance < params.separation_factor
            && s.distance < min_distance
            && s.heading_dot > SEPARATION_MIN_DOT
        {
            min_distance = s.distance;
            nearest = Some(s);
        }
    }

    match nearest {
        Some(s) => {
            let away = (agent.position - s.position).normalize_or_zero();
            params.separation_factor * (params.max_cohesion_distance - s.distance) * away
        }
        None => Vec3::ZERO,
    }
}

/// Steer along the mean velocity of neighbors inside the forward cone.
///
/// Exactly zero when no neighbor qualifies.
#[must_use]
pub fn alignment(samples: &[NeighborSample], params: &SimulationParameters) -> Vec3 {
    let mut heading = Vec3::ZERO;
    let mut count = 0u32;
    for s in samples {
        if s.distance < params.max_alignment_distance && s.heading_dot > ALIGNMENT_MIN_DOT {
            heading += s.velocity;
            count += 1;
        }
    }
    if count == 0 {
        return Vec3::ZERO;
    }
    params.alignment_factor * (heading / count as f32)
}

/// Attraction to the target, proportional to the square of its distance.
#[must_use]
pub fn seek_target(position: Vec3, params: &SimulationParameters) -> Vec3 {
    let offset = params.target - position;
    params.seek_factor * offset * offset.length() * SEEK_SCALE
}

/// Limits the `up` component to `CLIMB_RATIO` times the speed across the
/// other two axes.
#[must_use]
pub fn limit_climb(velocity: Vec3, up: Axis) -> Vec3 {
    let limit = CLIMB_RATIO * up.planar_length(velocity);
    let climb = up.component(velocity).max(-limit).min(limit);
    up.with_component(velocity, climb)
}

/// Rescales `velocity` into `range`.
///
/// Speeds below the range are raised to `min` and speeds above it cut to
/// `max`. Speeds already inside the range are moved halfway toward `max`.
/// A zero velocity takes the direction of `fallback`, or +X if that is zero
/// too.
#[must_use]
pub fn clamp_velocity(velocity: Vec3, range: VelocityRange, fallback: Vec3) -> Vec3 {
    let magnitude = velocity.length();
    let direction = velocity
        .try_normalize()
        .or_else(|| fallback.try_normalize())
        .unwrap_or(Vec3::X);

    let speed = if magnitude < range.min {
        range.min
    } else if magnitude > range.max {
        range.max
    } else {
        (magnitude + range.max) / 2.0
    };
    direction * speed
}

/// Sum of the four force contributions for one agent.
#[must_use]
pub fn total_force(
    agent: AgentState,
    samples: &[NeighborSample],
    params: &SimulationParameters,
) -> Vec3 {
    cohesion(agent, samples, params)
        + separation(agent, samples, params)
        + alignment(samples, params)
        + seek_target(agent.position, params)
}

/// Advances agent `index` by `dt` given its neighbor set.
///
/// Pure: the result depends only on the arguments. Returns `None` when
/// `index` is not in the snapshot.
#[must_use]
pub fn integrate(
    index: usize,
    neighbors: &NeighborSet,
    snapshot: FlockSnapshot<'_>,
    params: &SimulationParameters,
    dt: f32,
) -> Option<AgentState> {
    integrate_into(index, neighbors, snapshot, params, dt, &mut Vec::new())
}

/// [`integrate`] with a caller-owned scratch buffer for the neighbor samples.
///
/// The result does not depend on what `scratch` held before the call.
#[must_use]
pub fn integrate_into(
    index: usize,
    neighbors: &NeighborSet,
    snapshot: FlockSnapshot<'_>,
    params: &SimulationParameters,
    dt: f32,
    scratch: &mut Vec<NeighborSample>,
) -> Option<AgentState> {
    let agent = snapshot.agent(index)?;
    sample_neighbors_into(index, agent, neighbors, snapshot, scratch);
    let force = total_force(agent, scratch, params);

    let candidate = limit_climb(agent.velocity + force * dt, params.up_axis);
    let fallback = limit_climb(agent.velocity, params.up_axis);
    let velocity = clamp_velocity(candidate, params.velocity_range, fallback);

    Some(AgentState {
        position: agent.position + velocity * dt,
        velocity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_params() -> SimulationParameters {
        SimulationParameters {
            cohesion_factor: 0.0,
            separation_factor: 0.0,
            alignment_factor: 0.0,
            seek_factor: 0.0,
            ..Default::default()
        }
    }

    fn sample(position: Vec3, velocity: Vec3, agent: AgentState) -> NeighborSample {
        let direction = position - agent.position;
        NeighborSample {
            index: 1,
            position,
            velocity,
            direction,
            distance: direction.length(),
            heading_dot: agent.velocity.dot(direction),
        }
    }

    #[test]
    fn test_cohesion_pulls_toward_center() {
        let agent = AgentState::new(Vec3::ZERO, Vec3::X);
        let params = SimulationParameters::default();
        let samples = [
            sample(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO, agent),
            sample(Vec3::new(0.0, 1.0, 0.0), Vec3::ZERO, agent),
        ];
        let force = cohesion(agent, &samples, &params);
        assert_eq!(force, params.cohesion_factor * Vec3::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn test_cohesion_zero_without_candidates() {
        let agent = AgentState::new(Vec3::ZERO, Vec3::X);
        let params = SimulationParameters::default();
        let far = [sample(Vec3::new(50.0, 0.0, 0.0), Vec3::ZERO, agent)];
        assert_eq!(cohesion(agent, &far, &params), Vec3::ZERO);
        assert_eq!(cohesion(agent, &[], &params), Vec3::ZERO);
    }

    #[test]
    fn test_separation_uses_nearest_ahead() {
        let agent = AgentState::new(Vec3::ZERO, Vec3::X);
        let params = SimulationParameters {
            separation_factor: 3.0,
            max_cohesion_distance: 4.0,
            ..Default::default()
        };
        let samples = [
            sample(Vec3::new(2.0, 0.0, 0.0), Vec3::ZERO, agent),
            sample(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO, agent),
            // Closer but behind: ignored.
            sample(Vec3::new(-0.5, 0.0, 0.0), Vec3::ZERO, agent),
        ];
        let force = separation(agent, &samples, &params);
        assert_eq!(force, 3.0 * (4.0 - 1.0) * Vec3::NEG_X);
    }

    #[test]
    fn test_separation_zero_when_nothing_ahead() {
        let agent = AgentState::new(Vec3::ZERO, Vec3::X);
        let params = SimulationParameters::default();
        let behind = [sample(Vec3::new(-1.0, 0.0, 0.0), Vec3::ZERO, agent)];
        assert_eq!(separation(agent, &behind, &params), Vec3::ZERO);
    }

    #[test]
    fn test_alignment_averages_forward_cone() {
        let agent = AgentState::new(Vec3::ZERO, Vec3::X);
        let params = SimulationParameters::default();
        let samples = [
            sample(Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 2.0), agent),
            sample(Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 4.0), agent),
            // Beside the agent: dot product 0, outside the cone.
            sample(Vec3::new(0.0, 0.0, 1.0), Vec3::new(9.0, 9.0, 9.0), agent),
        ];
        let force = alignment(&samples, &params);
        assert_eq!(force, params.alignment_factor * Vec3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn test_alignment_zero_without_candidates() {
        let params = SimulationParameters::default();
        assert_eq!(alignment(&[], &params), Vec3::ZERO);
    }

    #[test]
    fn test_seek_grows_quadratically() {
        let params = SimulationParameters {
            seek_factor: 1.0,
            target: Vec3::new(10.0, 0.0, 0.0),
            ..Default::default()
        };
        let near = seek_target(Vec3::new(9.0, 0.0, 0.0), &params);
        let far = seek_target(Vec3::new(8.0, 0.0, 0.0), &params);
        assert!((near.x - 0.01).abs() < 1e-6);
        assert!((far.x - 0.04).abs() < 1e-6);
    }

    #[test]
    fn test_limit_climb() {
        let steep = limit_climb(Vec3::new(3.0, 10.0, 4.0), Axis::Y);
        assert_eq!(steep, Vec3::new(3.0, 4.0, 4.0));

        let dive = limit_climb(Vec3::new(3.0, -10.0, 4.0), Axis::Y);
        assert_eq!(dive, Vec3::new(3.0, -4.0, 4.0));

        let gentle = Vec3::new(3.0, 1.0, 4.0);
        assert_eq!(limit_climb(gentle, Axis::Y), gentle);
    }

    #[test]
    fn test_clamp_velocity_branches() {
        let range = VelocityRange { min: 1.0, max: 5.0 };
        let slow = clamp_velocity(Vec3::new(0.5, 0.0, 0.0), range, Vec3::ZERO);
        assert_eq!(slow, Vec3::new(1.0, 0.0, 0.0));

        let fast = clamp_velocity(Vec3::new(0.0, 0.0, 9.0), range, Vec3::ZERO);
        assert_eq!(fast, Vec3::new(0.0, 0.0, 5.0));

        let inside = clamp_velocity(Vec3::new(3.0, 0.0, 0.0), range, Vec3::ZERO);
        assert_eq!(inside, Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn test_clamp_zero_velocity_uses_fallback() {
        let range = VelocityRange { min: 2.0, max: 5.0 };
        assert_eq!(
            clamp_velocity(Vec3::ZERO, range, Vec3::new(0.0, 0.0, -3.0)),
            Vec3::new(0.0, 0.0, -2.0)
        );
        assert_eq!(clamp_velocity(Vec3::ZERO, range, Vec3::ZERO), Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_integrate_without_forces_moves_along_heading() {
        let positions = [Vec3::ZERO];
        let velocities = [Vec3::new(3.0, 0.0, 0.0)];
        let snapshot = FlockSnapshot::new(&positions, &velocities);
        let next = integrate(0, &NeighborSet::new(), snapshot, &quiet_params(), 0.5).unwrap();
        assert_eq!(next.velocity, Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(next.position, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_integrate_ignores_self_and_unknown_neighbors() {
        let positions = [Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)];
        let velocities = [Vec3::X, Vec3::X];
        let snapshot = FlockSnapshot::new(&positions, &velocities);
        let params = SimulationParameters::default();

        let clean: NeighborSet = [1].into_iter().collect();
        let noisy: NeighborSet = [0, 1, 99].into_iter().collect();
        assert_eq!(
            integrate(0, &clean, snapshot, &params, 0.01),
            integrate(0, &noisy, snapshot, &params, 0.01)
        );
    }

    #[test]
    fn test_integrate_unknown_index() {
        let positions = [Vec3::ZERO];
        let velocities = [Vec3::X];
        let snapshot = FlockSnapshot::new(&positions, &velocities);
        let params = SimulationParameters::default();
        assert!(integrate(3, &NeighborSet::new(), snapshot, &params, 0.01).is_none());
    }

    #[test]
    fn test_integrate_into_ignores_scratch_contents() {
        let positions = [Vec3::ZERO, Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.0, 0.7, 0.2)];
        let velocities = [Vec3::X, Vec3::new(1.0, 0.5, 0.0), Vec3::new(0.2, 1.0, 0.0)];
        let snapshot = FlockSnapshot::new(&positions, &velocities);
        let neighbors: NeighborSet = [1, 2].into_iter().collect();
        let params = SimulationParameters::default();

        let agent = AgentState::new(Vec3::splat(9.0), Vec3::Y);
        let mut scratch = vec![sample(Vec3::splat(3.0), Vec3::Z, agent); 8];
        let reused = integrate_into(0, &neighbors, snapshot, &params, 0.01, &mut scratch);

        assert_eq!(reused, integrate(0, &neighbors, snapshot, &params, 0.01));
        assert_eq!(scratch.len(), 2);
        assert_eq!(scratch[0].index, 1);
    }
}
