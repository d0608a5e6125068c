//! Host-owned flock context.
//!
//! Holds the agent arrays, the spatial index and the parameters, and runs one
//! simulation step at a time:
//!
//! 1. resolve the step's time delta
//! 2. rebuild the spatial index from the current positions
//! 3. query and integrate every agent in parallel batches, reading only the
//!    pre-step snapshot and writing only that agent's slot in the output buffers
//! 4. swap the output buffers in, which is the barrier before the next rebuild

use crate::config::{FlockConfig, PopulationConfig, SimulationParameters, TimeConfig};
use crate::error::{FlockError, Result};
use crate::flocking;
use crate::metrics::Metrics;
use crate::snapshot::FlockSnapshot;
use crate::spatial_index::SpatialIndex;
use flockwork_data::{AgentState, NeighborSet, SimulationTime};
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Counter bumped once per agent that was integrated without an index entry.
pub const STALE_COUNTER: &str = "stale_agents";
/// Counter bumped on every population resize.
pub const RESIZE_COUNTER: &str = "resizes";

/// Summary of one completed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub step: u64,
    pub agents: usize,
    pub dt: f32,
    pub mean_speed: f32,
    pub mean_neighbors: f32,
    pub stale: usize,
    pub duration: Duration,
}

/// Read-only inputs shared by every batch of a step.
struct StepContext<'a> {
    index: &'a SpatialIndex,
    snapshot: FlockSnapshot<'a>,
    params: &'a SimulationParameters,
    dt: f32,
}

#[derive(Default, Clone, Copy)]
struct BatchTally {
    neighbors: usize,
    stale: usize,
}

impl BatchTally {
    fn merge(self, other: Self) -> Self {
        Self {
            neighbors: self.neighbors + other.neighbors,
            stale: self.stale + other.stale,
        }
    }
}

/// Integrates the agents `base..base + positions.len()` into the given slots.
fn integrate_batch(
    ctx: &StepContext<'_>,
    base: usize,
    positions: &mut [Vec3],
    velocities: &mut [Vec3],
) -> BatchTally {
    let params = ctx.params;
    let mut tally = BatchTally::default();
    let mut neighbors = NeighborSet::with_capacity(params.max_neighbor_count + 1);
    let mut samples = Vec::with_capacity(params.max_neighbor_count + 1);

    for (offset, (position, velocity)) in positions.iter_mut().zip(velocities.iter_mut()).enumerate() {
        let i = base + offset;
        let Some(current) = ctx.snapshot.agent(i) else {
            continue;
        };

        if ctx.index.position_of(i).is_none() {
            // Not indexed this step: carry the agent over untouched.
            tally.stale += 1;
            *position = current.position;
            *velocity = current.velocity;
            continue;
        }

        ctx.index.query_into(
            i,
            current.velocity,
            params.max_axis_distance,
            params.max_neighbor_count,
            &mut neighbors,
        );
        tally.neighbors += neighbors.len();

        let next =
            flocking::integrate_into(i, &neighbors, ctx.snapshot, params, ctx.dt, &mut samples)
                .unwrap_or(current);
        *position = next.position;
        *velocity = next.velocity;
    }
    tally
}

/// A population of agents and everything needed to step it.
pub struct Flock {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    next_positions: Vec<Vec3>,
    next_velocities: Vec<Vec3>,
    index: SpatialIndex,
    params: SimulationParameters,
    time: TimeConfig,
    population: PopulationConfig,
    rng: ChaCha8Rng,
    step: u64,
    pub metrics: Metrics,
}

impl Flock {
    /// Creates a flock and spawns `config.flock.agent_count` agents.
    pub fn new(config: FlockConfig) -> Result<Self> {
        config.validate()?;
        let count = config.flock.agent_count;
        let mut flock = Self::empty(config);
        flock.resize(count);
        Ok(flock)
    }

    /// Creates a flock from existing agent arrays.
    ///
    /// `config.flock.agent_count` is ignored in favour of the array length.
    pub fn from_state(
        positions: Vec<Vec3>,
        velocities: Vec<Vec3>,
        config: FlockConfig,
    ) -> Result<Self> {
        config.validate()?;
        if positions.len() != velocities.len() {
            return Err(FlockError::configuration(format!(
                "{} positions but {} velocities",
                positions.len(),
                velocities.len()
            )));
        }
        let mut flock = Self::empty(config);
        flock.index.reallocate(positions.len());
        flock.positions = positions;
        flock.velocities = velocities;
        Ok(flock)
    }

    fn empty(config: FlockConfig) -> Self {
        let seed = config.flock.seed.unwrap_or_else(rand::random);
        Self {
            positions: Vec::new(),
            velocities: Vec::new(),
            next_positions: Vec::new(),
            next_velocities: Vec::new(),
            index: SpatialIndex::default(),
            params: config.params,
            time: config.time,
            population: config.flock,
            rng: ChaCha8Rng::seed_from_u64(seed),
            step: 0,
            metrics: Metrics::new(),
        }
    }

    /// Grows or shrinks the population to `count` agents.
    ///
    /// Surplus agents are dropped from the end. New agents get a uniform
    /// random position inside the spawn cube, a uniform random direction and
    /// a speed inside the velocity range. The index is reallocated and gets
    /// rebuilt by the next step.
    pub fn resize(&mut self, count: usize) {
        let current = self.positions.len();
        if count < current {
            self.positions.truncate(count);
            self.velocities.truncate(count);
        } else {
            self.positions.reserve(count - current);
            self.velocities.reserve(count - current);
            for _ in current..count {
                let agent = self.spawn_agent();
                self.positions.push(agent.position);
                self.velocities.push(agent.velocity);
            }
        }
        self.index.reallocate(count);
        self.metrics.increment_counter(RESIZE_COUNTER);
        tracing::info!(agents = count, previous = current, "Flock resized");
    }

    fn spawn_agent(&mut self) -> AgentState {
        let extent = self.population.spawn_extent;
        let range = self.params.velocity_range;
        let rng = &mut self.rng;

        let direction = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        )
        .try_normalize()
        .unwrap_or(Vec3::X);
        let speed = rng.gen_range(range.min..=range.max);
        let position = Vec3::new(
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
        );
        AgentState::new(position, direction * speed)
    }

    /// Replaces the simulation parameters after validating them.
    ///
    /// Invalid parameters are rejected and the current ones kept.
    pub fn set_params(&mut self, params: SimulationParameters) -> Result<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    /// Moves the seek target.
    pub fn set_target(&mut self, target: Vec3) -> Result<()> {
        if !target.is_finite() {
            return Err(FlockError::configuration("Seek target must be finite"));
        }
        self.params.target = target;
        Ok(())
    }

    pub fn set_time_mode(&mut self, mode: SimulationTime) {
        self.time.mode = mode;
    }

    /// Time delta the next step will integrate over, given the host's frame delta.
    #[must_use]
    pub fn resolve_time_step(&self, frame_dt: f32) -> f32 {
        self.time.resolve(frame_dt)
    }

    /// Advances every agent by one step: rebuilds the index, then
    /// [`Flock::advance`].
    ///
    /// Fails only if the index cannot hold the population, which means the
    /// arrays were resized without going through [`Flock::resize`].
    pub fn step(&mut self, frame_dt: f32) -> Result<StepReport> {
        self.rebuild_index()?;
        Ok(self.advance(frame_dt))
    }

    /// Rebuilds the spatial index from the current positions.
    pub fn rebuild_index(&mut self) -> Result<()> {
        self.index.rebuild(&self.positions)
    }

    /// Integrates every agent against the index as it currently stands.
    ///
    /// Agents absent from the last rebuild, such as those spawned by a
    /// [`Flock::resize`] since, are carried over unchanged and counted as
    /// stale in the report and the `stale_agents` counter.
    pub fn advance(&mut self, frame_dt: f32) -> StepReport {
        let started = Instant::now();
        let dt = self.resolve_time_step(frame_dt);
        let count = self.positions.len();

        self.next_positions.resize(count, Vec3::ZERO);
        self.next_velocities.resize(count, Vec3::ZERO);

        let ctx = StepContext {
            index: &self.index,
            snapshot: FlockSnapshot::new(&self.positions, &self.velocities),
            params: &self.params,
            dt,
        };
        let batch = self.population.batch_size.max(1);

        let tally = if self.population.parallel {
            self.next_positions
                .par_chunks_mut(batch)
                .zip(self.next_velocities.par_chunks_mut(batch))
                .enumerate()
                .map(|(chunk, (positions, velocities))| {
                    integrate_batch(&ctx, chunk * batch, positions, velocities)
                })
                .reduce(BatchTally::default, BatchTally::merge)
        } else {
            self.next_positions
                .chunks_mut(batch)
                .zip(self.next_velocities.chunks_mut(batch))
                .enumerate()
                .map(|(chunk, (positions, velocities))| {
                    integrate_batch(&ctx, chunk * batch, positions, velocities)
                })
                .fold(BatchTally::default(), BatchTally::merge)
        };

        std::mem::swap(&mut self.positions, &mut self.next_positions);
        std::mem::swap(&mut self.velocities, &mut self.next_velocities);
        self.step += 1;

        if tally.stale > 0 {
            tracing::warn!(stale = tally.stale, step = self.step, "Agents missing from index");
            self.metrics.add_to_counter(STALE_COUNTER, tally.stale as u64);
        }

        let (mean_speed, mean_neighbors) = if count == 0 {
            (0.0, 0.0)
        } else {
            let speed_sum: f32 = self.velocities.par_iter().map(|v| v.length()).sum();
            (
                speed_sum / count as f32,
                tally.neighbors as f32 / count as f32,
            )
        };

        let duration = started.elapsed();
        self.metrics.record_step(duration, count, tally.neighbors);

        StepReport {
            step: self.step,
            agents: count,
            dt,
            mean_speed,
            mean_neighbors,
            stale: tally.stale,
            duration,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.step
    }

    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[must_use]
    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    #[must_use]
    pub fn agent(&self, index: usize) -> Option<AgentState> {
        self.snapshot().agent(index)
    }

    #[must_use]
    pub fn snapshot(&self) -> FlockSnapshot<'_> {
        FlockSnapshot::new(&self.positions, &self.velocities)
    }

    #[must_use]
    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    #[must_use]
    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }
}
