use log::{debug, trace};

use super::{LaneId, RoadState, Slot, Tick, VehicleId};
use crate::config::SimulationConfig;
use crate::error::{SimError, SimResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePhase {
    /// The control point has not been placed yet.
    NotPlaced,
    Active,
    /// Every source lane has emptied; the run keeps going regardless.
    CompleteCaptured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocationReason {
    /// The signal lane's batch of crossings is used up.
    BatchFilled,
    /// The lane that would take priority has nothing left to send.
    OtherLaneClear,
}

/// One move of the control point between source lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalChange {
    pub tick: Tick,
    pub from: LaneId,
    pub to: LaneId,
    /// Crossings counted since the previous change.
    pub crossed: usize,
    pub reason: RelocationReason,
}

/// A lane move requested this tick and carried out at the start of the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSwitch {
    pub vehicle: VehicleId,
    pub destination: LaneId,
}

/// Owns the control point: where it sits, how many vehicles crossed it in
/// the current batch, and when the source lanes finished emptying.
#[derive(Debug, Clone)]
pub struct MergeController {
    phase: MergePhase,
    signal: LaneId,
    crossing_point: Option<f64>,
    crossed_count: usize,
    peak_crossed: usize,
    batch_size: usize,
    placement_tick: Tick,
    placement_offset: f64,
    fully_switched_time: Option<Tick>,
    pending: Vec<PendingSwitch>,
    signal_changes: Vec<SignalChange>,
}

impl MergeController {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            phase: MergePhase::NotPlaced,
            signal: config.merge.initial_signal(),
            crossing_point: None,
            crossed_count: 0,
            peak_crossed: 0,
            batch_size: config.merge.batch_size,
            placement_tick: config.merge.placement_tick(),
            placement_offset: config.road.min_headway,
            fully_switched_time: None,
            pending: Vec::new(),
            signal_changes: Vec::new(),
        }
    }

    pub fn phase(&self) -> MergePhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != MergePhase::NotPlaced
    }

    /// The source lane currently holding the control point.
    pub fn signal(&self) -> LaneId {
        self.signal
    }

    pub fn crossing_point(&self) -> Option<f64> {
        self.crossing_point
    }

    pub fn crossed_count(&self) -> usize {
        self.crossed_count
    }

    /// Highest crossed count reached within any single batch.
    pub fn peak_crossed(&self) -> usize {
        self.peak_crossed
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn placement_tick(&self) -> Tick {
        self.placement_tick
    }

    /// Ticks from placement until every source lane was clear, if that happened.
    pub fn fully_switched_time(&self) -> Option<Tick> {
        self.fully_switched_time
    }

    pub fn pending(&self) -> &[PendingSwitch] {
        &self.pending
    }

    /// Relocations made while the merge was still in progress.
    pub fn signal_changes(&self) -> &[SignalChange] {
        &self.signal_changes
    }

    /// Closes the signal lane: the control point goes in its first empty
    /// slot, just ahead of the lane's last vehicle.
    pub fn place_control_point(&mut self, road: &mut RoadState, tick: Tick) -> SimResult<()> {
        let lane = road.lane(self.signal)?;
        let preceding = match lane.len().checked_sub(1).map(|index| lane.slot(index)) {
            Some(Slot::Vehicle(id)) => road.vehicle(id)?.position(),
            _ => return Err(SimError::EmptySignalLane(self.signal)),
        };

        let crossing_point = preceding + self.placement_offset;
        road.place_control_point(self.signal, crossing_point)?;
        self.crossing_point = Some(crossing_point);
        self.phase = MergePhase::Active;

        debug!(
            "tick {}: control point placed in lane {} at {:.3}",
            tick, self.signal, crossing_point
        );
        Ok(())
    }

    pub fn enqueue(&mut self, vehicle: VehicleId, destination: LaneId) {
        self.pending.push(PendingSwitch {
            vehicle,
            destination,
        });
    }

    /// Whether a source-lane vehicle that moved to `position` during `tick`
    /// has passed the control point.
    pub fn has_crossed(&self, position: f64, tick: Tick) -> bool {
        tick > self.placement_tick && self.crossing_point.is_some_and(|cp| position > cp)
    }

    /// Counts a crossing and queues the vehicle for the merge lane.
    pub fn record_crossing(&mut self, vehicle: VehicleId, merge_lane: LaneId, tick: Tick) {
        self.crossed_count += 1;
        self.peak_crossed = self.peak_crossed.max(self.crossed_count);
        self.enqueue(vehicle, merge_lane);
        trace!(
            "tick {}: vehicle {} crossed ({} of {})",
            tick,
            vehicle,
            self.crossed_count,
            self.batch_size
        );
    }

    /// Start-of-tick bookkeeping once the control point is down: apply last
    /// tick's switches, note completion, then hand priority on if due.
    pub fn on_tick(&mut self, road: &mut RoadState, tick: Tick) -> SimResult<()> {
        for switch in std::mem::take(&mut self.pending) {
            if road.move_vehicle(switch.vehicle, switch.destination)? {
                trace!(
                    "tick {}: vehicle {} moved to lane {}",
                    tick,
                    switch.vehicle,
                    switch.destination
                );
            }
        }

        if self.fully_switched_time.is_none() && Self::source_lanes_clear(road)? {
            let elapsed = tick - self.placement_tick;
            self.fully_switched_time = Some(elapsed);
            self.phase = MergePhase::CompleteCaptured;
            debug!("tick {}: source lanes clear, fully switched after {} ticks", tick, elapsed);
        }

        self.alternate_priority(road, tick)
    }

    fn source_lanes_clear(road: &RoadState) -> SimResult<bool> {
        for lane in road.source_lanes() {
            if !road.lane(lane)?.is_clear() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn alternate_priority(&mut self, road: &mut RoadState, tick: Tick) -> SimResult<()> {
        let next = LaneId((self.signal.0 + 1) % road.source_lane_count());

        let reason = if self.crossed_count == self.batch_size {
            RelocationReason::BatchFilled
        } else if road.lane(next)?.is_clear() {
            RelocationReason::OtherLaneClear
        } else {
            return Ok(());
        };

        let crossed = std::mem::take(&mut self.crossed_count);
        if !road.relocate_control_point(next)? {
            return Ok(());
        }

        // Once the merge is over the point keeps moving but the log stops.
        if self.phase != MergePhase::CompleteCaptured {
            trace!(
                "tick {}: control point {} -> {} ({:?}, {} crossed)",
                tick,
                self.signal,
                next,
                reason,
                crossed
            );
            self.signal_changes.push(SignalChange {
                tick,
                from: self.signal,
                to: next,
                crossed,
                reason,
            });
        }
        self.signal = next;
        Ok(())
    }
}
