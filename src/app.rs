use anyhow::{Context, Result};
use glam::Vec3;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::model::config::FlockConfig;
use crate::model::flock::{Flock, StepReport};

/// Seconds for the seek target to complete one orbit.
const ORBIT_PERIOD: f32 = 20.0;

/// Outcome of a headless run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub steps: u64,
    pub agents: usize,
    pub simulated_seconds: f32,
    pub elapsed: Duration,
    pub mean_step: Duration,
    pub mean_speed: f32,
    pub mean_neighbors: f32,
    pub centroid: Vec3,
    pub fingerprint: String,
}

/// Average wall time per step, zero when no step ran.
fn mean_step(elapsed: Duration, steps: u64) -> Duration {
    if steps == 0 {
        Duration::ZERO
    } else {
        elapsed.div_f64(steps as f64)
    }
}

/// Headless host driving a [`Flock`].
pub struct App {
    pub running: bool,
    pub flock: Flock,
    pub config: FlockConfig,
    /// Radius of the circle the seek target follows; `None` keeps it still.
    pub orbit_radius: Option<f32>,
    simulated: f32,
    last_frame: Option<Instant>,
}

impl App {
    pub fn new(config: FlockConfig) -> Result<Self> {
        let flock = Flock::new(config.clone()).context("creating flock")?;
        Ok(Self {
            running: true,
            flock,
            config,
            orbit_radius: None,
            simulated: 0.0,
            last_frame: None,
        })
    }

    /// Reads a config file, falling back to defaults when it does not exist.
    ///
    /// A file that exists but does not parse or validate is an error.
    pub fn load_config(path: &Path) -> Result<FlockConfig> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(FlockConfig::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        FlockConfig::from_toml(&content).with_context(|| format!("loading {}", path.display()))
    }

    /// Frame delta since the previous call, zero on the first frame.
    fn frame_delta(&mut self) -> f32 {
        let now = Instant::now();
        let dt = self
            .last_frame
            .map_or(0.0, |last| now.duration_since(last).as_secs_f32());
        self.last_frame = Some(now);
        dt
    }

    fn move_target(&mut self) -> Result<()> {
        if let Some(radius) = self.orbit_radius {
            let angle = std::f32::consts::TAU * self.simulated / ORBIT_PERIOD;
            let target = Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin());
            self.flock.set_target(target)?;
        }
        Ok(())
    }

    /// Runs a single frame.
    pub fn tick(&mut self) -> Result<StepReport> {
        self.move_target()?;
        let frame_dt = self.frame_delta();
        let report = self.flock.step(frame_dt)?;
        self.simulated += report.dt;
        Ok(report)
    }

    /// Runs `steps` frames, or fewer if `running` is cleared.
    pub fn run(&mut self, steps: u64) -> Result<RunSummary> {
        let started = Instant::now();
        let mut last: Option<StepReport> = None;
        let mut done = 0u64;

        while self.running && done < steps {
            last = Some(self.tick()?);
            done += 1;
        }

        let elapsed = started.elapsed();
        let agents = self.flock.len();
        let centroid = if agents == 0 {
            Vec3::ZERO
        } else {
            self.flock.positions().iter().copied().sum::<Vec3>() / agents as f32
        };
        let (mean_speed, mean_neighbors) = last
            .map(|r| (r.mean_speed, r.mean_neighbors))
            .unwrap_or_default();

        let summary = RunSummary {
            steps: done,
            agents,
            simulated_seconds: self.simulated,
            elapsed,
            mean_step: mean_step(elapsed, done),
            mean_speed,
            mean_neighbors,
            centroid,
            fingerprint: self.config.fingerprint(),
        };
        tracing::info!(
            steps = summary.steps,
            agents = summary.agents,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Run finished"
        );
        Ok(summary)
    }
}
