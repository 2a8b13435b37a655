use rayon::prelude::*;

use super::{run_point, SweepBackend, SweepReport};
use crate::config::SimulationConfig;
use crate::error::SimResult;

/// Spreads sweep points over the rayon pool. Runs share nothing but the
/// read-only base configuration.
#[derive(Debug, Default)]
pub struct ParallelBackend;

impl ParallelBackend {
    pub fn new() -> Self {
        Self
    }
}

impl SweepBackend for ParallelBackend {
    fn run(&self, base: &SimulationConfig, batch_sizes: &[usize]) -> SimResult<SweepReport> {
        // `collect` into a Result keeps input order and stops at the first error.
        let points = batch_sizes
            .par_iter()
            .map(|&batch_size| run_point(base, batch_size))
            .collect::<SimResult<Vec<_>>>()?;

        Ok(SweepReport { points })
    }

    fn get_name(&self) -> &'static str {
        "Parallel"
    }

    fn is_parallel(&self) -> bool {
        true
    }
}
