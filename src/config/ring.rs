use serde::{Deserialize, Serialize};

use super::{config_error, Validate};
use crate::error::SimResult;

/// Geometry of the ring and the vehicles initially placed on it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoadConfig {
    /// Total vehicles, split evenly across the source lanes.
    pub vehicle_count: usize,
    /// Lanes feeding the merge; the merge lane id is `source_lanes`.
    pub source_lanes: usize,
    /// Circumference of the ring.
    pub road_length: f64,
    pub min_headway: f64,
    pub max_velocity: f64,
    /// Vehicle `j` of every source lane starts at `j * initial_spacing`.
    pub initial_spacing: f64,
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            vehicle_count: 40,
            source_lanes: 2,
            road_length: 3000.0,
            min_headway: 5.0,
            max_velocity: 40.0,
            initial_spacing: 5.0,
        }
    }
}

impl RoadConfig {
    pub fn vehicles_per_lane(&self) -> usize {
        if self.source_lanes == 0 {
            return 0;
        }
        self.vehicle_count / self.source_lanes
    }

    /// Slots per lane: one per vehicle plus one for the control point.
    pub fn lane_capacity(&self) -> usize {
        self.vehicle_count + 1
    }
}

impl Validate for RoadConfig {
    fn validate(&self) -> SimResult<()> {
        if self.vehicle_count == 0 {
            return Err(config_error("Vehicle count must be greater than zero"));
        }

        if self.source_lanes < 2 {
            return Err(config_error(format!(
                "At least two source lanes are required, got {}",
                self.source_lanes
            )));
        }

        if self.vehicle_count % self.source_lanes != 0 {
            return Err(config_error(format!(
                "{} vehicles cannot be split evenly across {} source lanes",
                self.vehicle_count, self.source_lanes
            )));
        }

        for (name, value) in [
            ("Road length", self.road_length),
            ("Minimum headway", self.min_headway),
            ("Maximum velocity", self.max_velocity),
            ("Initial spacing", self.initial_spacing),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(config_error(format!("{} must be positive, got {}", name, value)));
            }
        }

        if self.road_length <= self.min_headway {
            return Err(config_error(format!(
                "Road length {} must exceed the minimum headway {}",
                self.road_length, self.min_headway
            )));
        }

        let crossing_point =
            (self.vehicles_per_lane() - 1) as f64 * self.initial_spacing + self.min_headway;
        if crossing_point >= self.road_length {
            return Err(config_error(format!(
                "Initial queue reaches {} which does not fit on a road of length {}",
                crossing_point, self.road_length
            )));
        }

        Ok(())
    }
}
