use serde::{Deserialize, Serialize};

use super::{config_error, Validate};
use crate::error::SimResult;
use crate::simulation::{LaneId, Tick};

/// Timing and control-point parameters of a merge run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MergeConfig {
    pub time_step: f64,
    /// Simulated time at which the control point closes the signal lane.
    pub placement_time: f64,
    /// The run stops here whether or not the merge finished.
    pub end_time: f64,
    /// Crossings allowed before priority passes to the next source lane.
    pub batch_size: usize,
    pub initial_signal_lane: usize,
    pub impatience_tolerance: u32,
    /// Let source-lane vehicles move to a neighbouring source lane.
    pub lane_changes: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            time_step: 0.01,
            placement_time: 0.01,
            end_time: 300.0,
            batch_size: 1,
            initial_signal_lane: 1,
            impatience_tolerance: 500,
            lane_changes: true,
        }
    }
}

impl MergeConfig {
    pub fn placement_tick(&self) -> Tick {
        (self.placement_time / self.time_step).round() as Tick
    }

    pub fn total_ticks(&self) -> Tick {
        (self.end_time / self.time_step).round() as Tick
    }

    pub fn initial_signal(&self) -> LaneId {
        LaneId(self.initial_signal_lane)
    }
}

impl Validate for MergeConfig {
    fn validate(&self) -> SimResult<()> {
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(config_error("Time step must be positive"));
        }

        if !self.placement_time.is_finite() || self.placement_tick() < 1 {
            return Err(config_error(format!(
                "Placement time {} must be at least one time step",
                self.placement_time
            )));
        }

        if !self.end_time.is_finite() || self.end_time < self.placement_time {
            return Err(config_error(format!(
                "End time {} must not precede the placement time {}",
                self.end_time, self.placement_time
            )));
        }

        if self.batch_size == 0 {
            return Err(config_error("Batch size must be greater than zero"));
        }

        Ok(())
    }
}
