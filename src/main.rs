use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use std::path::Path;
use std::time::Instant;

use lane_merge_sim::{
    compute::{ComputeBackend, SweepBackend, SweepReport},
    config::SimulationConfig,
    simulation::Simulation,
};

#[derive(Parser)]
#[command(name = "lane-merge")]
#[command(about = "Forced lane-merge simulation on a circular road")]
struct Args {
    /// Sweep compute backend
    #[arg(short, long, value_enum, default_value_t = Backend::Sequential)]
    backend: Backend,

    /// Simulation configuration file
    #[arg(short, long, default_value = "merge.toml")]
    config: String,

    /// Run a single simulation with this batch size instead of a sweep
    #[arg(long)]
    batch_size: Option<usize>,

    /// First batch size of the sweep
    #[arg(long)]
    from: Option<usize>,

    /// Last batch size of the sweep (exclusive)
    #[arg(long)]
    to: Option<usize>,

    /// Write the sweep results to this TOML file
    #[arg(short, long)]
    output: Option<String>,

    /// Enable verbose logging for detailed simulation progress
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Backend {
    /// One run after another on the main thread
    Sequential,
    /// Independent runs spread over a thread pool
    Parallel,
}

fn load_config(path: &str) -> Result<SimulationConfig> {
    if Path::new(path).exists() {
        SimulationConfig::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path))
    } else {
        info!("{} not found, using default configuration", path);
        Ok(SimulationConfig::default())
    }
}

fn print_report(report: &SweepReport) {
    println!("{:>10}  {:>16}  {:>12}", "batch", "switched (ticks)", "switched (s)");
    for point in &report.points {
        match (point.fully_switched_time, point.fully_switched_secs) {
            (Some(ticks), Some(secs)) => {
                println!("{:>10}  {:>16}  {:>12.2}", point.batch_size, ticks, secs)
            }
            _ => println!("{:>10}  {:>16}  {:>12}", point.batch_size, "not reached", "-"),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info })
        .init();
    info!("Starting lane merge simulator");

    let config = load_config(&args.config)?;
    info!(
        "Loaded configuration: {} vehicles on {} source lanes, road length {:.1}",
        config.road.vehicle_count, config.road.source_lanes, config.road.road_length
    );

    if let Some(batch_size) = args.batch_size {
        let mut simulation = Simulation::new(config.with_batch_size(batch_size))?;
        let report = simulation.run()?;
        match report.fully_switched_secs() {
            Some(secs) => println!(
                "batch size {}: fully switched after {} ticks ({:.2}s)",
                batch_size,
                report.fully_switched_or_zero(),
                secs
            ),
            None => println!("batch size {}: not fully switched before end time", batch_size),
        }
        return Ok(());
    }

    let compute_backend = match args.backend {
        Backend::Sequential => ComputeBackend::new_sequential(),
        Backend::Parallel => match ComputeBackend::new_parallel() {
            Ok(backend) => backend,
            Err(e) => {
                info!("✗ Parallel backend not available ({e})");
                info!("↳ Falling back to sequential backend");
                ComputeBackend::new_sequential()
            }
        },
    };
    info!("Compute backend: {}", compute_backend.get_name());

    let default_range = config.default_sweep();
    let from = args.from.unwrap_or(default_range.start).max(1);
    let to = args.to.unwrap_or(default_range.end);
    let batch_sizes: Vec<usize> = (from..to).collect();
    if batch_sizes.is_empty() {
        anyhow::bail!("Empty sweep range {}..{}", from, to);
    }

    let start_time = Instant::now();
    let report = compute_backend.run(&config, &batch_sizes)?;
    info!(
        "Sweep of {} batch sizes completed in {:.2}s",
        batch_sizes.len(),
        start_time.elapsed().as_secs_f64()
    );

    print_report(&report);

    if let Some(output) = &args.output {
        std::fs::write(output, report.to_toml()?)
            .with_context(|| format!("Failed to write {}", output))?;
        info!("Results written to {}", output);
    }

    Ok(())
}
