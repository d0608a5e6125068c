use anyhow::Result;
use clap::Parser;
use flockwork_lib::app::App;
use flockwork_lib::model::init_logging;
use flockwork_lib::model::state::SimulationTime;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "flock.toml")]
    config: PathBuf,

    /// Number of steps to simulate
    #[arg(short, long, default_value_t = 1000)]
    steps: u64,

    /// Override the agent count from the config
    #[arg(short, long)]
    agents: Option<usize>,

    /// Override the random seed from the config
    #[arg(long)]
    seed: Option<u64>,

    /// Advance by the fixed time step instead of wall-clock frame time
    #[arg(long)]
    fixed: bool,

    /// Move the seek target around a circle of this radius
    #[arg(long)]
    orbit: Option<f32>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let mut config = App::load_config(&args.config)?;
    if let Some(agents) = args.agents {
        config.flock.agent_count = agents;
    }
    if args.seed.is_some() {
        config.flock.seed = args.seed;
    }
    if args.fixed {
        config.time.mode = SimulationTime::Fixed;
    }
    config.validate()?;

    tracing::info!(
        agents = config.flock.agent_count,
        steps = args.steps,
        fingerprint = %config.fingerprint(),
        "Starting headless flock"
    );

    let mut app = App::new(config)?;
    app.orbit_radius = args.orbit;
    let summary = app.run(args.steps)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} agents, {} steps in {:.2?} ({:.2?}/step), mean speed {:.3}, mean neighbors {:.1}",
            summary.agents,
            summary.steps,
            summary.elapsed,
            summary.mean_step,
            summary.mean_speed,
            summary.mean_neighbors
        );
    }
    Ok(())
}
