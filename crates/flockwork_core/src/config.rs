//! Configuration management for flock parameters.
//!
//! This module provides strongly-typed configuration structures that map to
//! the `flock.toml` file. Everything the flocking step reads can be set here.
//!
//! ## Configuration Hierarchy
//!
//! 1. Default values (hardcoded in `Default` impls)
//! 2. `flock.toml` file (overrides defaults)
//! 3. Command-line overrides applied by the host binary
//!
//! ## Example `flock.toml`
//!
//! ```toml
//! [flock]
//! agent_count = 5000
//! seed = 7
//!
//! [params]
//! velocity_range = { min = 1.0, max = 5.0 }
//! cohesion_factor = 2.0
//! target = [0.0, 10.0, 0.0]
//!
//! [time]
//! mode = "fixed"
//! fixed_step = 0.01
//! ```

use crate::error::{FlockError, Result};
use flockwork_data::{Axis, SimulationTime};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Inclusive bounds on agent speed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct VelocityRange {
    pub min: f32,
    pub max: f32,
}

impl Default for VelocityRange {
    fn default() -> Self {
        Self { min: 1.0, max: 5.0 }
    }
}

impl VelocityRange {
    #[must_use]
    pub fn contains(&self, speed: f32) -> bool {
        speed >= self.min && speed <= self.max
    }
}

/// Parameters read by every agent during a step.
///
/// Shared and read-only for the duration of a step; the host may replace
/// them between steps (the seek target usually moves every frame).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationParameters {
    pub velocity_range: VelocityRange,
    pub cohesion_factor: f32,
    /// Weight of the repulsion force. Doubles as the separation radius.
    pub separation_factor: f32,
    pub alignment_factor: f32,
    pub seek_factor: f32,
    pub max_cohesion_distance: f32,
    pub max_alignment_distance: f32,
    pub max_neighbor_count: usize,
    /// Per-axis walk limit for the neighbor query.
    pub max_axis_distance: f32,
    /// Point every agent is drawn toward.
    pub target: Vec3,
    /// Axis whose velocity component is limited relative to the other two.
    pub up_axis: Axis,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            velocity_range: VelocityRange::default(),
            cohesion_factor: 2.0,
            separation_factor: 2.0,
            alignment_factor: 2.0,
            seek_factor: 2.0,
            max_cohesion_distance: 2.0,
            max_alignment_distance: 10.0,
            max_neighbor_count: 21,
            max_axis_distance: 5.0,
            target: Vec3::ZERO,
            up_axis: Axis::Y,
        }
    }
}

fn ensure(cond: bool, msg: &str) -> Result<()> {
    if cond {
        Ok(())
    } else {
        Err(FlockError::configuration(msg))
    }
}

impl SimulationParameters {
    /// Validates the parameter invariants.
    ///
    /// # Validation Rules
    /// - Velocity range bounds are finite, non-negative and `min <= max`
    /// - Factors and distances are finite and non-negative
    /// - At least one neighbor is considered
    pub fn validate(&self) -> Result<()> {
        let range = self.velocity_range;
        ensure(
            range.min.is_finite() && range.max.is_finite(),
            "Velocity range must be finite",
        )?;
        ensure(range.min >= 0.0, "Minimum velocity must be non-negative")?;
        ensure(
            range.min <= range.max,
            "Minimum velocity must not exceed maximum velocity",
        )?;

        let non_negative = [
            (self.cohesion_factor, "Cohesion factor must be non-negative"),
            (self.separation_factor, "Separation factor must be non-negative"),
            (self.alignment_factor, "Alignment factor must be non-negative"),
            (self.seek_factor, "Seek factor must be non-negative"),
            (
                self.max_cohesion_distance,
                "Max cohesion distance must be non-negative",
            ),
            (
                self.max_alignment_distance,
                "Max alignment distance must be non-negative",
            ),
            (
                self.max_axis_distance,
                "Max axis distance must be non-negative",
            ),
        ];
        for (value, msg) in non_negative {
            ensure(value.is_finite() && value >= 0.0, msg)?;
        }

        ensure(
            self.max_neighbor_count >= 1,
            "Max neighbor count must be at least 1",
        )?;
        ensure(self.target.is_finite(), "Seek target must be finite")?;
        Ok(())
    }

    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self).as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// How the per-step time delta is chosen.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TimeConfig {
    pub mode: SimulationTime,
    pub fixed_step: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            mode: SimulationTime::FrameDelta,
            fixed_step: 0.01,
        }
    }
}

impl TimeConfig {
    /// Resolves the delta used for a whole step.
    #[inline]
    #[must_use]
    pub fn resolve(&self, frame_dt: f32) -> f32 {
        match self.mode {
            SimulationTime::FrameDelta => frame_dt,
            SimulationTime::Fixed => self.fixed_step,
        }
    }
}

/// Population and scheduling settings owned by the host context.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PopulationConfig {
    pub agent_count: usize,
    pub seed: Option<u64>,
    /// Half-width of the cube new agents are spawned in.
    pub spawn_extent: f32,
    /// Agents handled per unit of parallel work.
    pub batch_size: usize,
    pub parallel: bool,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            agent_count: 500,
            seed: None,
            spawn_extent: 1.0,
            batch_size: 50,
            parallel: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct FlockConfig {
    pub flock: PopulationConfig,
    pub params: SimulationParameters,
    pub time: TimeConfig,
}

impl FlockConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or the first violation.
    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;
        ensure(
            self.flock.agent_count <= 1_000_000,
            "Agent count too large (max 1000000)",
        )?;
        ensure(
            self.flock.spawn_extent.is_finite() && self.flock.spawn_extent > 0.0,
            "Spawn extent must be positive",
        )?;
        ensure(self.flock.batch_size > 0, "Batch size must be positive")?;
        ensure(
            self.time.fixed_step.is_finite() && self.time.fixed_step > 0.0,
            "Fixed time step must be positive",
        )?;
        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn fingerprint(&self) -> String {
        self.params.fingerprint()
    }
}
