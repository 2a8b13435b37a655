use log::debug;

use super::{run_point, SweepBackend, SweepReport};
use crate::config::SimulationConfig;
use crate::error::SimResult;

/// Runs every sweep point one after another on the calling thread.
#[derive(Debug, Default)]
pub struct SequentialBackend;

impl SequentialBackend {
    pub fn new() -> Self {
        Self
    }
}

impl SweepBackend for SequentialBackend {
    fn run(&self, base: &SimulationConfig, batch_sizes: &[usize]) -> SimResult<SweepReport> {
        let mut points = Vec::with_capacity(batch_sizes.len());

        for &batch_size in batch_sizes {
            let point = run_point(base, batch_size)?;
            debug!("Batch size {} finished in {}ms", batch_size, point.wall_time_ms);
            points.push(point);
        }

        Ok(SweepReport { points })
    }

    fn get_name(&self) -> &'static str {
        "Sequential"
    }

    fn is_parallel(&self) -> bool {
        false
    }
}
