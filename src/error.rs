use thiserror::Error;

use crate::simulation::{LaneId, VehicleId};

/// Errors raised while configuring or stepping a merge simulation.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("no successor for vehicle {vehicle} in lane {lane}")]
    SuccessorNotFound { vehicle: VehicleId, lane: LaneId },

    #[error("vehicle {vehicle} already occupies lane {lane}")]
    DuplicateOccupant { vehicle: VehicleId, lane: LaneId },

    #[error("lane {lane} is full (capacity {capacity})")]
    LaneFull { lane: LaneId, capacity: usize },

    #[error("lane {0} does not exist")]
    UnknownLane(LaneId),

    #[error("vehicle {0} not found")]
    VehicleNotFound(VehicleId),

    #[error("control point missing from lane {0}")]
    ControlPointMissing(LaneId),

    #[error("no vehicle in lane {0} to place the control point behind")]
    EmptySignalLane(LaneId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type SimResult<T> = Result<T, SimError>;
