//! # MPC Runtime
//!
//! Entry point for the `runtime_main` binary. Loads a JSON configuration
//! (or uses the built-in defaults), applies command-line overrides and runs
//! one control loop.

use anyhow::Result;
use clap::Parser;
use runtime::RuntimeConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Random-shooting MPC on a point mass")]
struct Args {
    /// JSON runtime configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Total control steps, overriding the configuration.
    #[arg(long)]
    steps: Option<usize>,
    /// Seed for the candidate sampler.
    #[arg(long)]
    seed: Option<u64>,
    /// Evaluate ensemble members in parallel.
    #[arg(long)]
    parallel: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };
    if let Some(steps) = args.steps {
        cfg.episode_steps = steps;
    }
    if let Some(seed) = args.seed {
        cfg.mpc.seed = Some(seed);
    }
    cfg.mpc.parallel |= args.parallel;

    let summary = runtime::run(&cfg)?;
    println!(
        "steps: {}  episodes: {}  warm-up reward: {:.3}  planned reward: {:.3}  final distance: {:.3}",
        summary.steps, summary.episodes, summary.warmup_reward, summary.planned_reward, summary.final_distance
    );
    Ok(())
}
