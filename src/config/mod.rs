use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{SimError, SimResult};

pub mod ring;
pub mod control;

pub use ring::*;
pub use control::*;

/// Immutable parameters of one merge run.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub road: RoadConfig,
    pub merge: MergeConfig,
}

impl SimulationConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> SimResult<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Copy of this configuration with a different batch size.
    pub fn with_batch_size(&self, batch_size: usize) -> Self {
        let mut config = self.clone();
        config.merge.batch_size = batch_size;
        config
    }

    /// Batch sizes swept by default: `1..per_lane`.
    pub fn default_sweep(&self) -> std::ops::Range<usize> {
        1..self.road.vehicles_per_lane().max(1)
    }
}

impl Validate for SimulationConfig {
    fn validate(&self) -> SimResult<()> {
        self.road.validate()?;
        self.merge.validate()?;

        if self.merge.initial_signal_lane >= self.road.source_lanes {
            return Err(config_error(format!(
                "Initial signal lane {} is out of range (0-{})",
                self.merge.initial_signal_lane,
                self.road.source_lanes - 1
            )));
        }

        Ok(())
    }
}

pub trait Validate {
    fn validate(&self) -> SimResult<()>;
}

pub(crate) fn config_error(message: impl Into<String>) -> SimError {
    SimError::Config(message.into())
}
