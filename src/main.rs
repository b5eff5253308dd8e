//! Flagstorm - headless match runner
//!
//! Runs one capture-the-flag match to completion and prints the score
//! plus the tail of the event log. Useful for eyeballing squad behaviour
//! and for reproducing a match from a seed.

use clap::Parser;

use flagstorm::core::config::SimulationConfig;
use flagstorm::core::error::Result;
use flagstorm::core::types::Team;
use flagstorm::simulation::runner::Simulation;

#[derive(Parser, Debug)]
#[command(name = "flagstorm", about = "Headless capture-the-flag simulation")]
struct Args {
    /// RNG seed; the same seed reproduces the same match
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Maximum frames to simulate (the match may end earlier)
    #[arg(long, default_value_t = 20_000)]
    frames: u64,

    /// Optional TOML config overriding the built-in defaults
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// How many trailing events to print
    #[arg(long, default_value_t = 25)]
    event_tail: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "flagstorm=info".to_string()),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SimulationConfig::from_toml(path)?,
        None => SimulationConfig::default(),
    };

    tracing::info!(seed = args.seed, frames = args.frames, "starting match");
    let mut simulation = Simulation::new(config, args.seed)?;
    simulation.run(args.frames);

    println!("=== FLAGSTORM ===");
    println!(
        "frames simulated: {}   finished: {}",
        simulation.world().tick,
        simulation.is_finished()
    );
    println!(
        "score   red {} : {} blue",
        simulation.score(Team::Red),
        simulation.score(Team::Blue)
    );

    let events = simulation.events();
    let tail_start = events.len().saturating_sub(args.event_tail);
    println!("--- last {} events ---", events.len() - tail_start);
    for event in &events[tail_start..] {
        println!("{}", serde_json::to_string(event)?);
    }

    Ok(())
}
