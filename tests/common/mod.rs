pub mod macros;

use flockwork_lib::model::config::FlockConfig;
use flockwork_lib::model::flock::Flock;
use glam::Vec3;

#[allow(dead_code)]
pub struct FlockBuilder {
    config: FlockConfig,
    agents: Vec<(Vec3, Vec3)>,
}

#[allow(dead_code)]
impl FlockBuilder {
    pub fn new() -> Self {
        let mut config = FlockConfig::default();
        config.flock.agent_count = 0;
        config.flock.seed = Some(0);
        Self {
            config,
            agents: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.flock.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut FlockConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_agent(mut self, position: Vec3, velocity: Vec3) -> Self {
        self.agents.push((position, velocity));
        self
    }

    /// Builds from the explicit agents, or spawns `agent_count` random ones
    /// when none were added.
    pub fn build(self) -> Flock {
        if self.agents.is_empty() {
            return Flock::new(self.config).expect("Failed to create flock in test builder");
        }
        let (positions, velocities) = self.agents.into_iter().unzip();
        Flock::from_state(positions, velocities, self.config)
            .expect("Failed to create flock in test builder")
    }
}

/// Positions along the x axis at the given coordinates.
#[allow(dead_code)]
pub fn on_x_axis(xs: &[f32]) -> Vec<Vec3> {
    xs.iter().map(|&x| Vec3::new(x, 0.0, 0.0)).collect()
}
