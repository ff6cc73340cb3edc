use std::error::Error;
use std::fs::File;
use std::sync::Mutex;

use clap::Parser;
use log::info;
use schelling_sim::Simulation;
use schelling_term::{App, AppConfig, Args, CrosstermDriver, Viewer};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "schelling_sim=info,schelling_term=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Logs go to the log file when one is given. Otherwise headless runs log
/// to stderr and the terminal UI stays silent, since it owns the screen.
fn init_logging(args: &Args) -> Result<(), Box<dyn Error>> {
    if let Some(path) = &args.log_file {
        let file = File::create(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .try_init()
            .map_err(|e| e as Box<dyn Error>)?;
    } else if args.headless {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| e as Box<dyn Error>)?;
    }
    Ok(())
}

fn fmt_similarity(s: Option<f64>) -> String {
    s.map_or_else(|| "-".to_string(), |s| format!("{s:.3}"))
}

fn run_headless(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut sim = Simulation::new(args.simulation_config())?;
    println!(
        "seed {} | {} | similarity {}",
        sim.seed().map_or_else(|| "-".to_string(), |s| s.to_string()),
        sim.census(),
        fmt_similarity(sim.similarity())
    );

    for _ in 0..args.ticks {
        let report = sim.step()?;
        println!(
            "tick {:>5}: {} unsatisfied, {} relocated, {} stranded, similarity {}",
            report.tick,
            report.unsatisfied,
            report.relocated(),
            report.stranded,
            fmt_similarity(sim.similarity())
        );
        if report.converged {
            break;
        }
    }

    println!(
        "{:?} after {} ticks | {} | satisfied {} | similarity {}",
        sim.state(),
        sim.tick(),
        sim.census(),
        sim.satisfied_count(),
        fmt_similarity(sim.similarity())
    );
    Ok(())
}

fn run_terminal(args: &Args) -> Result<(), Box<dyn Error>> {
    let sim = Simulation::new(args.simulation_config())?;
    info!("starting terminal viewer with seed {:?}", sim.seed());
    let viewer = Viewer::new(sim, args.interval());
    let (width, height) = viewer.screen_size();
    let interval = viewer.interval();
    let mut app = App::new(AppConfig {
        model: viewer,
        driver: CrosstermDriver::new(),
        width,
        height,
        interval,
    });
    app.run()
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(&args)?;
    if args.headless {
        run_headless(&args)
    } else {
        run_terminal(&args)
    }
}
