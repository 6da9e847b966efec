#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays seeded Voice Garden rounds headlessly.

mod config;
mod report;
mod simulation;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;
use voice_garden_audio::PreloadedVoices;
use voice_garden_system_catalog::Catalog;

use crate::{config::Settings, report::OutputFormat};

/// Command-line arguments for the Voice Garden simulator.
#[derive(Debug, Parser)]
#[command(
    name = "voice-garden",
    version,
    about = "Plays seeded Voice Garden rounds without a window"
)]
struct CliArgs {
    /// Seed for every random draw of the run.
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,

    /// Number of rounds to play back to back.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    rounds: u32,

    /// Probability that the simulated player steers to the target plant.
    #[arg(long, value_name = "PROBABILITY")]
    accuracy: Option<f64>,

    /// TOML file overriding round, trial and simulation settings.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Format of the report printed to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enables debug logging unless `RUST_LOG` says otherwise.
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the Voice Garden command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    let settings = match &args.config {
        Some(path) => Settings::from_path(path)?,
        None => Settings::default(),
    }
    .with_accuracy(args.accuracy);
    settings
        .validate()
        .context("settings cannot drive a round")?;

    let catalog = Catalog::builtin().context("failed to load the voice catalog")?;
    let mut voices = PreloadedVoices::from_catalog(catalog);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    let reports = (1..=args.rounds)
        .map(|round| {
            info!(round, seed = args.seed, "starting round");
            simulation::run_round(&settings, catalog, &mut voices, &mut rng)
        })
        .collect::<Vec<_>>();

    println!("{}", report::render(args.seed, &reports, args.format)?);
    Ok(())
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
