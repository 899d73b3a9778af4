mod breeder;
mod city;
mod distance;
mod error;
mod genetic;
mod population;
mod tour;

use clap::Parser;
use genetic::{Evolver, GaConfig, GenerationReport, RunSummary};
use rand::{rngs::StdRng, SeedableRng};
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use tracing::Level;

#[derive(Parser)]
#[command(about = "Evolves a short closed tour through random cities")]
struct Args {
    /// number of tours per generation
    #[arg(long, default_value_t = GaConfig::default().population_size)]
    pop_size: usize,

    /// number of cities to place
    #[arg(long, default_value_t = GaConfig::default().cities_count)]
    cities: usize,

    /// best tours copied unchanged into the next generation
    #[arg(long, default_value_t = GaConfig::default().elite_size)]
    elite_size: usize,

    /// tours drawn per tournament
    #[arg(long, default_value_t = GaConfig::default().tournament_size)]
    tournament_size: usize,

    /// number of generations
    #[arg(long, default_value_t = GaConfig::default().generations)]
    generations: usize,

    /// side length of the square field
    #[arg(long, default_value_t = GaConfig::default().field_size)]
    field_size: f32,

    /// inset from the field edges for city placement
    #[arg(long, default_value_t = GaConfig::default().margin)]
    margin: f32,

    /// RNG seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// don't print a line per generation
    #[arg(long, default_value_t = false)]
    quiet: bool,

    /// print the coordinates of the final best tour
    #[arg(long, default_value_t = false)]
    show_tour: bool,

    /// debug logging
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> GaConfig {
        GaConfig {
            population_size: self.pop_size,
            cities_count: self.cities,
            elite_size: self.elite_size,
            tournament_size: self.tournament_size,
            generations: self.generations,
            field_size: self.field_size,
            margin: self.margin,
        }
    }
}

/// Console stand-in for a renderer: consumes snapshots on the foreground
/// thread while the worker keeps evolving.
fn render(report: &GenerationReport, quiet: bool) {
    if !quiet {
        println!("{}. {:.4}", report.generation, report.best.total_length);
    }
    tracing::debug!(
        generation = report.generation,
        mean = report.mean_length,
        worst = report.worst_length,
        points = report.best.points.len(),
        "rendered"
    );
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let cfg = args.config();
    if let Err(e) = cfg.validate() {
        tracing::error!("invalid configuration: {}", e);
        return ExitCode::from(2);
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "seeding run");

    let evolver = match Evolver::new(cfg, StdRng::seed_from_u64(seed)) {
        Ok(evolver) => evolver,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::from(2);
        }
    };

    tracing::debug!(
        phase = ?evolver.phase(),
        cities = evolver.cities().len(),
        tours = evolver.population().len(),
        "evolver ready"
    );

    let (tx, rx) = mpsc::channel::<GenerationReport>();
    let worker = thread::spawn(move || {
        evolver.run(|report| {
            // receiver gone just means nobody is watching
            let _ = tx.send(report);
        })
    });

    for report in rx {
        render(&report, args.quiet);
    }

    let summary: RunSummary = match worker.join() {
        Ok(Ok(summary)) => summary,
        Ok(Err(e)) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
        Err(_) => {
            tracing::error!("evolution thread panicked");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "Best tour length: {:.4} ({} cached distances)",
        summary.best.total_length(),
        summary.cache_entries
    );
    if let Some((generation, _)) = summary
        .history
        .iter()
        .find(|(_, len)| *len <= summary.best.total_length())
    {
        println!("First reached in generation {}", generation);
    }
    if args.show_tour {
        for city in summary.best.cities() {
            println!("  {} ({:.2}, {:.2})", city.id, city.x, city.y);
        }
    }

    ExitCode::SUCCESS
}
