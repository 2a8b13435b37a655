use log::trace;

use super::{circular_headway, LaneId, RoadState, Slot, Tick, VehicleId};
use crate::error::{SimError, SimResult};

/// Decides when a source-lane vehicle has waited long enough for a better
/// neighbouring lane.
#[derive(Debug, Clone, Copy)]
pub struct LaneChangeEvaluator {
    tolerance: u32,
}

impl LaneChangeEvaluator {
    pub fn new(tolerance: u32) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> u32 {
        self.tolerance
    }

    /// Neighbouring source lanes in evaluation order: above first, then below.
    pub fn candidate_lanes(lane: LaneId, source_lanes: usize) -> impl Iterator<Item = LaneId> {
        let above = (lane.0 + 1 < source_lanes).then(|| LaneId(lane.0 + 1));
        let below = lane.0.checked_sub(1).filter(|l| *l < source_lanes).map(LaneId);
        above.into_iter().chain(below)
    }

    /// Headway `vehicle` would have if it were inserted into `lane`, using
    /// positions as of `tick`.
    pub fn hypothetical_headway(
        &self,
        road: &RoadState,
        vehicle: VehicleId,
        lane: LaneId,
        tick: Tick,
    ) -> SimResult<f64> {
        let target = road.lane(lane)?;
        if target.contains(vehicle) {
            return Err(SimError::DuplicateOccupant { vehicle, lane });
        }
        if target.len() >= target.capacity() {
            return Err(SimError::LaneFull {
                lane,
                capacity: target.capacity(),
            });
        }

        let own_position = road.vehicle(vehicle)?.position_at(tick);
        let mut working = target
            .slots()
            .iter()
            .map(|&slot| {
                let position = road.slot_position(slot, tick)?.unwrap_or(f64::INFINITY);
                Ok((slot, position))
            })
            .collect::<SimResult<Vec<_>>>()?;
        working.push((Slot::Vehicle(vehicle), own_position));
        working.sort_by(|a, b| a.1.total_cmp(&b.1));

        let index = working
            .iter()
            .position(|(slot, _)| *slot == Slot::Vehicle(vehicle))
            .ok_or(SimError::SuccessorNotFound { vehicle, lane })?;
        let (next, next_position) = working[(index + 1) % working.len()];

        if next == Slot::Vehicle(vehicle) {
            return Ok(road.road_length());
        }
        Ok(circular_headway(own_position, next_position, road.road_length()))
    }

    /// Compares the neighbouring lanes against `current_headway`, adjusting
    /// the vehicle's impatience, and returns the lane to switch to once the
    /// tolerance is exceeded.
    ///
    /// The first neighbour that looks better ends the evaluation for this
    /// tick, whether or not it triggers a switch.
    pub fn evaluate(
        &self,
        road: &mut RoadState,
        vehicle: VehicleId,
        current_headway: f64,
        tick: Tick,
    ) -> SimResult<Option<LaneId>> {
        if current_headway == 0.0 {
            return Ok(None);
        }

        let lane = road.vehicle(vehicle)?.current_lane;
        for candidate in Self::candidate_lanes(lane, road.source_lane_count()) {
            let other_headway = self.hypothetical_headway(road, vehicle, candidate, tick)?;
            let car = road.vehicle_mut(vehicle)?;

            if other_headway > current_headway {
                if car.grow_impatience(self.tolerance) {
                    trace!(
                        "vehicle {} out of patience in lane {}, requesting lane {}",
                        vehicle,
                        lane,
                        candidate
                    );
                    return Ok(Some(candidate));
                }
                break;
            }

            car.ease_impatience();
        }

        Ok(None)
    }
}
