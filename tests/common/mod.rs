#![allow(dead_code)]

use lane_merge_sim::config::{MergeConfig, RoadConfig, SimulationConfig};

/// Eight vehicles on a short ring; merges well inside two simulated minutes.
pub fn small_config(batch_size: usize) -> SimulationConfig {
    SimulationConfig {
        road: RoadConfig {
            vehicle_count: 8,
            source_lanes: 2,
            road_length: 200.0,
            min_headway: 5.0,
            max_velocity: 10.0,
            initial_spacing: 5.0,
        },
        merge: MergeConfig {
            time_step: 0.01,
            placement_time: 0.01,
            end_time: 120.0,
            batch_size,
            initial_signal_lane: 1,
            impatience_tolerance: 500,
            lane_changes: false,
        },
    }
}

/// Ring of length 100 with `vehicle_count` vehicles spaced 5 apart.
pub fn ring_config(vehicle_count: usize) -> SimulationConfig {
    let mut config = small_config(1);
    config.road.vehicle_count = vehicle_count;
    config.road.road_length = 100.0;
    config.merge.end_time = 1.0;
    config
}

pub fn optimal_velocity(headway: f64, max_velocity: f64, min_headway: f64) -> f64 {
    max_velocity * (1.0 - (-(headway - min_headway) / max_velocity).exp())
}
