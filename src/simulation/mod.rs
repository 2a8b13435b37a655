use std::fmt;

pub mod physics;
pub mod road;
pub mod lane_change;
pub mod merge;
pub mod stepper;

pub use physics::*;
pub use road::*;
pub use lane_change::*;
pub use merge::*;
pub use stepper::*;

/// Discrete simulation step index; tick 0 is the initial layout.
pub type Tick = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VehicleId(pub usize);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LaneId(pub usize);

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A car on the ring together with its full per-tick history.
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: VehicleId,
    pub max_velocity: f64,
    pub current_lane: LaneId,
    pub impatience: u32,
    position_history: Vec<f64>,
    velocity_history: Vec<f64>,
    lane_history: Vec<LaneId>,
}

impl Vehicle {
    pub fn new(id: VehicleId, position: f64, lane: LaneId, max_velocity: f64) -> Self {
        Self {
            id,
            max_velocity,
            current_lane: lane,
            impatience: 0,
            position_history: vec![position],
            // Index 0 has no velocity; the NaN keeps histories aligned by tick.
            velocity_history: vec![f64::NAN],
            lane_history: vec![lane],
        }
    }

    pub fn position(&self) -> f64 {
        self.position_history[self.position_history.len() - 1]
    }

    pub fn position_at(&self, tick: Tick) -> f64 {
        self.position_history[tick]
    }

    /// Velocity computed during `tick`; `None` for tick 0 or the future.
    pub fn velocity_at(&self, tick: Tick) -> Option<f64> {
        if tick == 0 {
            return None;
        }
        self.velocity_history.get(tick).copied()
    }

    pub fn lane_at(&self, tick: Tick) -> Option<LaneId> {
        self.lane_history.get(tick).copied()
    }

    pub fn positions(&self) -> &[f64] {
        &self.position_history
    }

    pub fn velocities(&self) -> &[f64] {
        &self.velocity_history
    }

    pub fn lanes(&self) -> &[LaneId] {
        &self.lane_history
    }

    /// Number of completed ticks recorded for this vehicle.
    pub fn ticks_recorded(&self) -> Tick {
        self.position_history.len() - 1
    }

    pub fn record(&mut self, velocity: f64, position: f64) {
        self.velocity_history.push(velocity);
        self.position_history.push(position);
        self.lane_history.push(self.current_lane);
    }

    /// Counts one tick where a neighbouring lane looked better. Returns true,
    /// and starts over from zero, once the count passes `tolerance`.
    pub fn grow_impatience(&mut self, tolerance: u32) -> bool {
        self.impatience += 1;
        if self.impatience > tolerance {
            self.impatience = 0;
            true
        } else {
            false
        }
    }

    pub fn ease_impatience(&mut self) {
        self.impatience = self.impatience.saturating_sub(1);
    }
}

/// The forced-merge crossing marker. Occupies a lane slot but never moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    pub position: f64,
    pub lane: LaneId,
}
