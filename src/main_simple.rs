use anyhow::Result;
use log::info;
use std::time::Instant;

use lane_merge_sim::{config::SimulationConfig, simulation::Simulation};

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();
    info!("Starting lane merge simulator (console mode)");

    // Load configuration, falling back to the built-in experiment
    let config = match SimulationConfig::load_from_file("merge.toml") {
        Ok(config) => config,
        Err(e) => {
            info!("Using default configuration ({})", e);
            SimulationConfig::default()
        }
    };
    info!(
        "Loaded configuration: {} vehicles, batch size {}, end time {:.1}s",
        config.road.vehicle_count, config.merge.batch_size, config.merge.end_time
    );

    let mut simulation = Simulation::new(config)?;
    let start_time = Instant::now();
    let report = simulation.run()?;

    info!("Simulation completed!");
    info!("Total time: {:.2}s", start_time.elapsed().as_secs_f64());
    info!("Total ticks: {}", report.ticks);
    info!("Control point moves: {}", report.signal_changes);
    info!("Vehicles merged: {}", report.merged_vehicles);
    match report.fully_switched_secs() {
        Some(secs) => info!(
            "Fully switched after {} ticks ({:.2}s)",
            report.fully_switched_or_zero(),
            secs
        ),
        None => info!("Source lanes still occupied at end time"),
    }

    Ok(())
}
