//! Slime Mold - Entry Point
//!
//! Headless front end for the simulation engine: run a fixed number of steps,
//! watch the stepping driver live in the terminal, or inspect a saved snapshot.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use slime_mold::core::error::Result;
use slime_mold::persistence::SnapshotCodec;
use slime_mold::render::text_frame;
use slime_mold::simulation::StepReport;
use slime_mold::{Driver, SimulationConfig, SimulationEngine};

/// Slime mold foraging simulation on a toroidal grid
#[derive(Parser, Debug)]
#[command(name = "slime-mold")]
#[command(about = "Simulate pheromone-trail foraging of slime mold agents")]
struct Cli {
    /// TOML config file (population, step_interval_ms, seed, bounds)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a fixed number of steps as fast as possible
    Run {
        #[command(flatten)]
        session: SessionArgs,

        /// Steps to run
        #[arg(long, default_value_t = 100)]
        steps: u64,

        /// Print the grid every N steps
        #[arg(long)]
        print_every: Option<u64>,

        /// Write the final state to this file
        #[arg(long)]
        save: Option<PathBuf>,

        /// Emit the final step report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Step on the configured cadence and redraw each completed step
    Live {
        #[command(flatten)]
        session: SessionArgs,

        /// Stop after this many steps (runs until interrupted otherwise)
        #[arg(long)]
        steps: Option<u64>,

        /// Milliseconds between steps
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Summarize a saved snapshot
    Inspect {
        path: PathBuf,

        /// Also print the grid
        #[arg(long)]
        frame: bool,
    },
}

#[derive(Args, Debug)]
struct SessionArgs {
    /// Number of agents
    #[arg(long)]
    population: Option<u32>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Start from a saved snapshot instead of a fresh placement
    #[arg(long)]
    load: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("slime_mold=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };

    let outcome = match cli.command {
        Command::Run {
            session,
            steps,
            print_every,
            save,
            json,
        } => run(config, &session, steps, print_every, save.as_deref(), json),
        Command::Live {
            session,
            steps,
            interval_ms,
        } => live(config, &session, steps, interval_ms),
        Command::Inspect { path, frame } => inspect(config, &path, frame),
    };

    if let Err(e) = &outcome {
        tracing::warn!("{}", e);
    }
    outcome
}

/// Build an engine from config plus command-line overrides
fn start_session(mut config: SimulationConfig, session: &SessionArgs) -> Result<SimulationEngine> {
    if let Some(seed) = session.seed {
        config.seed = Some(seed);
    }

    let mut engine = SimulationEngine::from_config(&config)?;
    match &session.load {
        Some(path) => engine.load_from(path)?,
        None => engine.initialize(session.population.unwrap_or(config.population))?,
    }
    Ok(engine)
}

fn run(
    config: SimulationConfig,
    session: &SessionArgs,
    steps: u64,
    print_every: Option<u64>,
    save: Option<&Path>,
    json: bool,
) -> Result<()> {
    let mut engine = start_session(config, session)?;

    for _ in 0..steps {
        engine.step();
        if let Some(every) = print_every.filter(|&n| n > 0) {
            if engine.step_count() % every == 0 {
                println!("step {}", engine.step_count());
                print!("{}", text_frame(engine.state()));
            }
        }
    }

    let report = engine.report();
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if let Some(path) = save {
        engine.save_to(path)?;
    }
    Ok(())
}

fn live(
    config: SimulationConfig,
    session: &SessionArgs,
    steps: Option<u64>,
    interval_ms: Option<u64>,
) -> Result<()> {
    let mut engine = start_session(config, session)?;
    if let Some(ms) = interval_ms {
        engine.set_step_interval(ms)?;
    }
    let poll = Duration::from_millis(engine.state().step_interval_ms / 2);

    let driver = Driver::spawn(engine, steps)?;
    let mut frames = driver.subscribe();
    let mut shown = None;
    loop {
        let finished = driver.is_finished();
        let frame = Arc::clone(&*frames.borrow_and_update());
        if shown != Some(frame.step) {
            // clear screen, cursor home
            print!("\x1b[2J\x1b[H{}", text_frame(&frame.state));
            print_report(&frame.report);
            shown = Some(frame.step);
        }
        if finished {
            break;
        }
        thread::sleep(poll);
    }

    driver.stop()?;
    Ok(())
}

fn inspect(config: SimulationConfig, path: &Path, frame: bool) -> Result<()> {
    let mut engine = SimulationEngine::from_config(&config)?;
    engine.load_from(path)?;
    let state = engine.state();

    println!("Snapshot: {}", path.display());
    println!("  grid:          {}x{}", state.rows(), state.cols());
    println!("  population:    {}", state.population);
    println!("  step interval: {} ms", state.step_interval_ms);
    print_report(&engine.report());
    if frame {
        print!("{}", text_frame(state));
    }

    let bytes = SnapshotCodec::encode(state)?;
    println!("  encoded size:  {} bytes", bytes.len());
    Ok(())
}

fn print_report(report: &StepReport) {
    println!(
        "step {:>5} | agents {:>3} | signals {:>4} | pheromone {:>5} (peak {})",
        report.step,
        report.occupied,
        report.signal_cells,
        report.pheromone_total,
        report.pheromone_peak
    );
}
