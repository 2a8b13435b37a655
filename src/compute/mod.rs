use serde::Serialize;

use crate::config::SimulationConfig;
use crate::error::{SimError, SimResult};
use crate::simulation::{RunReport, Simulation, Tick};

#[cfg(feature = "parallel")]
pub mod parallel;

pub mod sequential;

pub use sequential::*;

#[cfg(feature = "parallel")]
pub use parallel::*;

/// One batch size of a sweep and how long its merge took.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    pub batch_size: usize,
    pub fully_switched_time: Option<Tick>,
    pub fully_switched_secs: Option<f64>,
    #[serde(skip)]
    pub wall_time_ms: u128,
}

/// Sweep results in batch-size order, ready to be written out as TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweepReport {
    pub points: Vec<SweepPoint>,
}

impl SweepReport {
    pub fn to_toml(&self) -> SimResult<String> {
        toml::to_string(self).map_err(|e| SimError::Config(format!("Failed to serialize sweep: {}", e)))
    }
}

/// Runs a fresh simulation for `batch_size` and keeps only what the sweep needs.
pub fn run_point(base: &SimulationConfig, batch_size: usize) -> SimResult<SweepPoint> {
    let started = std::time::Instant::now();
    let report: RunReport = Simulation::new(base.with_batch_size(batch_size))?.run()?;

    Ok(SweepPoint {
        batch_size,
        fully_switched_time: report.fully_switched_time,
        fully_switched_secs: report.fully_switched_secs(),
        wall_time_ms: started.elapsed().as_millis(),
    })
}

pub trait SweepBackend {
    fn run(&self, base: &SimulationConfig, batch_sizes: &[usize]) -> SimResult<SweepReport>;
    fn get_name(&self) -> &'static str;
    fn is_parallel(&self) -> bool;
}

pub enum ComputeBackend {
    Sequential(SequentialBackend),
    #[cfg(feature = "parallel")]
    Parallel(ParallelBackend),
}

impl ComputeBackend {
    pub fn new_sequential() -> Self {
        ComputeBackend::Sequential(SequentialBackend::new())
    }

    #[cfg(feature = "parallel")]
    pub fn new_parallel() -> SimResult<Self> {
        Ok(ComputeBackend::Parallel(ParallelBackend::new()))
    }

    #[cfg(not(feature = "parallel"))]
    pub fn new_parallel() -> SimResult<Self> {
        Err(SimError::Config(
            "Parallel sweeps not compiled in. Enable the 'parallel' feature.".to_string(),
        ))
    }
}

impl SweepBackend for ComputeBackend {
    fn run(&self, base: &SimulationConfig, batch_sizes: &[usize]) -> SimResult<SweepReport> {
        match self {
            ComputeBackend::Sequential(backend) => backend.run(base, batch_sizes),
            #[cfg(feature = "parallel")]
            ComputeBackend::Parallel(backend) => backend.run(base, batch_sizes),
        }
    }

    fn get_name(&self) -> &'static str {
        match self {
            ComputeBackend::Sequential(backend) => backend.get_name(),
            #[cfg(feature = "parallel")]
            ComputeBackend::Parallel(backend) => backend.get_name(),
        }
    }

    fn is_parallel(&self) -> bool {
        match self {
            ComputeBackend::Sequential(backend) => backend.is_parallel(),
            #[cfg(feature = "parallel")]
            ComputeBackend::Parallel(backend) => backend.is_parallel(),
        }
    }
}
