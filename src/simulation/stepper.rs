use log::info;
use serde::Serialize;

use super::{
    advance_position, circular_headway, LaneChangeEvaluator, LaneId, MergeController, RoadState, Slot,
    Tick, VelocityModel,
};
use crate::config::{SimulationConfig, Validate};
use crate::error::{SimError, SimResult};

/// Outcome of one complete run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub batch_size: usize,
    pub placement_tick: Tick,
    pub ticks: Tick,
    pub time_step: f64,
    /// Ticks from placement until the source lanes were clear; `None` if the
    /// run ended first.
    pub fully_switched_time: Option<Tick>,
    pub signal_changes: usize,
    pub peak_crossed: usize,
    pub merged_vehicles: usize,
}

impl RunReport {
    pub fn fully_switched_secs(&self) -> Option<f64> {
        self.fully_switched_time
            .map(|ticks| ticks as f64 * self.time_step)
    }

    /// Completion time with 0 standing in for "not reached".
    pub fn fully_switched_or_zero(&self) -> Tick {
        self.fully_switched_time.unwrap_or(0)
    }
}

/// A single merge run: owns the road and drives it one tick at a time.
pub struct Simulation {
    config: SimulationConfig,
    road: RoadState,
    controller: MergeController,
    model: VelocityModel,
    evaluator: LaneChangeEvaluator,
    tick: Tick,
    total_ticks: Tick,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        config.validate()?;

        let road = RoadState::from_config(&config.road)?;
        let controller = MergeController::new(&config);
        let model = VelocityModel::new(config.road.road_length, config.road.min_headway);
        let evaluator = LaneChangeEvaluator::new(config.merge.impatience_tolerance);
        let total_ticks = config.merge.total_ticks();

        Ok(Self {
            config,
            road,
            controller,
            model,
            evaluator,
            tick: 0,
            total_ticks,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn road(&self) -> &RoadState {
        &self.road
    }

    pub fn controller(&self) -> &MergeController {
        &self.controller
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn total_ticks(&self) -> Tick {
        self.total_ticks
    }

    pub fn is_finished(&self) -> bool {
        self.tick >= self.total_ticks
    }

    /// Runs every remaining tick and reports the outcome.
    pub fn run(&mut self) -> SimResult<RunReport> {
        info!(
            "Running merge: {} vehicles, batch size {}, {} ticks",
            self.config.road.vehicle_count, self.config.merge.batch_size, self.total_ticks
        );

        while !self.is_finished() {
            self.step()?;
        }

        let report = self.report()?;
        match report.fully_switched_secs() {
            Some(secs) => info!(
                "Batch size {}: fully switched after {} ticks ({:.2}s)",
                report.batch_size, report.fully_switched_or_zero(), secs
            ),
            None => info!("Batch size {}: merge not finished in time", report.batch_size),
        }
        Ok(report)
    }

    /// Advances one tick: controller bookkeeping first, then every vehicle.
    pub fn step(&mut self) -> SimResult<()> {
        self.tick += 1;
        let tick = self.tick;
        let placement_tick = self.controller.placement_tick();

        if tick == placement_tick {
            self.controller.place_control_point(&mut self.road, tick)?;
        }
        if tick > placement_tick {
            self.controller.on_tick(&mut self.road, tick)?;
        }

        self.update_vehicles(tick)
    }

    pub fn report(&self) -> SimResult<RunReport> {
        Ok(RunReport {
            batch_size: self.config.merge.batch_size,
            placement_tick: self.controller.placement_tick(),
            ticks: self.tick,
            time_step: self.config.merge.time_step,
            fully_switched_time: self.controller.fully_switched_time(),
            signal_changes: self.controller.signal_changes().len(),
            peak_crossed: self.controller.peak_crossed(),
            merged_vehicles: self.road.lane(self.road.merge_lane())?.len(),
        })
    }

    fn update_vehicles(&mut self, tick: Tick) -> SimResult<()> {
        let previous = tick - 1;
        let road_length = self.road.road_length();
        let dt = self.config.merge.time_step;
        let merge_lane = self.road.merge_lane();
        let lane_ids: Vec<LaneId> = self.road.lanes().iter().map(|lane| lane.id()).collect();

        for lane in lane_ids {
            let is_source = self.road.is_source_lane(lane);
            // Lane order cannot change until next tick's switches are applied.
            let slots = self.road.lane(lane)?.slots().to_vec();

            for (index, slot) in slots.into_iter().enumerate() {
                let Slot::Vehicle(id) = slot else {
                    continue;
                };

                let next = self.road.successor(lane, index)?;
                let vehicle = self.road.vehicle(id)?;
                let x1 = vehicle.position_at(previous);
                let max_velocity = vehicle.max_velocity;
                let x2 = self
                    .road
                    .slot_position(next, previous)?
                    .ok_or(SimError::SuccessorNotFound { vehicle: id, lane })?;

                let velocity = self.model.velocity(x1, x2, max_velocity, next == slot);

                if is_source && self.config.merge.lane_changes {
                    let headway = circular_headway(x1, x2, road_length);
                    if let Some(destination) =
                        self.evaluator.evaluate(&mut self.road, id, headway, previous)?
                    {
                        self.controller.enqueue(id, destination);
                    }
                }

                let position = advance_position(x1, velocity, dt, road_length);
                self.road.vehicle_mut(id)?.record(velocity, position);

                if is_source && self.controller.has_crossed(position, tick) {
                    self.controller.record_crossing(id, merge_lane, tick);
                }
            }
        }

        Ok(())
    }
}
