use super::{ControlPoint, LaneId, Tick, Vehicle, VehicleId};
use crate::config::RoadConfig;
use crate::error::{SimError, SimResult};

/// What a lane holds at a given index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Vehicle(VehicleId),
    ControlPoint,
    Empty,
}

impl Slot {
    /// True when nothing that needs to merge sits in this slot.
    pub fn is_clear(&self) -> bool {
        matches!(self, Slot::Empty | Slot::ControlPoint)
    }
}

/// Occupants of one lane, kept in ascending position order.
///
/// Only occupied slots are stored; every index at or past `len()` reads as
/// [`Slot::Empty`].
#[derive(Debug, Clone)]
pub struct Lane {
    id: LaneId,
    occupants: Vec<Slot>,
    capacity: usize,
}

impl Lane {
    fn new(id: LaneId, capacity: usize) -> Self {
        Self {
            id,
            occupants: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn id(&self) -> LaneId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn slot(&self, index: usize) -> Slot {
        self.occupants.get(index).copied().unwrap_or(Slot::Empty)
    }

    /// The lowest-position occupant.
    pub fn head(&self) -> Slot {
        self.slot(0)
    }

    pub fn slots(&self) -> &[Slot] {
        &self.occupants
    }

    pub fn vehicle_ids(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.occupants.iter().filter_map(|slot| match slot {
            Slot::Vehicle(id) => Some(*id),
            _ => None,
        })
    }

    pub fn contains(&self, id: VehicleId) -> bool {
        self.occupants.contains(&Slot::Vehicle(id))
    }

    pub fn has_control_point(&self) -> bool {
        self.occupants.contains(&Slot::ControlPoint)
    }

    /// No vehicle is left waiting in this lane.
    pub fn is_clear(&self) -> bool {
        self.head().is_clear()
    }

    fn push(&mut self, slot: Slot) -> SimResult<()> {
        if self.occupants.len() >= self.capacity {
            return Err(SimError::LaneFull {
                lane: self.id,
                capacity: self.capacity,
            });
        }
        self.occupants.push(slot);
        Ok(())
    }

    fn remove(&mut self, slot: Slot) -> bool {
        match self.occupants.iter().position(|s| *s == slot) {
            Some(index) => {
                self.occupants.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Every lane on the ring plus the vehicle arena they index into.
///
/// Lanes `0..source_lanes` feed the merge; the last lane is the merge lane.
#[derive(Debug, Clone)]
pub struct RoadState {
    lanes: Vec<Lane>,
    vehicles: Vec<Vehicle>,
    control_point: Option<ControlPoint>,
    road_length: f64,
    source_lanes: usize,
}

impl RoadState {
    /// An empty ring with `source_lanes` source lanes and one merge lane.
    pub fn new(source_lanes: usize, capacity: usize, road_length: f64) -> Self {
        let lanes = (0..=source_lanes)
            .map(|lane| Lane::new(LaneId(lane), capacity))
            .collect();

        Self {
            lanes,
            vehicles: Vec::new(),
            control_point: None,
            road_length,
            source_lanes,
        }
    }

    /// Initial layout: each source lane gets an evenly sized queue starting at 0.
    pub fn from_config(config: &RoadConfig) -> SimResult<Self> {
        let mut road = Self::new(config.source_lanes, config.lane_capacity(), config.road_length);

        for lane in 0..config.source_lanes {
            for j in 0..config.vehicles_per_lane() {
                road.spawn(LaneId(lane), j as f64 * config.initial_spacing, config.max_velocity)?;
            }
        }

        Ok(road)
    }

    /// Adds a vehicle to `lane` and returns its id. Only valid before the first tick.
    pub fn spawn(&mut self, lane: LaneId, position: f64, max_velocity: f64) -> SimResult<VehicleId> {
        let id = VehicleId(self.vehicles.len());
        self.lane_mut(lane)?.push(Slot::Vehicle(id))?;
        self.vehicles.push(Vehicle::new(id, position, lane, max_velocity));
        self.sort_lane(lane);
        Ok(id)
    }

    pub fn road_length(&self) -> f64 {
        self.road_length
    }

    pub fn source_lane_count(&self) -> usize {
        self.source_lanes
    }

    pub fn source_lanes(&self) -> impl Iterator<Item = LaneId> {
        (0..self.source_lanes).map(LaneId)
    }

    pub fn merge_lane(&self) -> LaneId {
        LaneId(self.source_lanes)
    }

    pub fn is_source_lane(&self, lane: LaneId) -> bool {
        lane.0 < self.source_lanes
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn lane(&self, lane: LaneId) -> SimResult<&Lane> {
        self.lanes.get(lane.0).ok_or(SimError::UnknownLane(lane))
    }

    fn lane_mut(&mut self, lane: LaneId) -> SimResult<&mut Lane> {
        self.lanes.get_mut(lane.0).ok_or(SimError::UnknownLane(lane))
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn vehicle(&self, id: VehicleId) -> SimResult<&Vehicle> {
        self.vehicles.get(id.0).ok_or(SimError::VehicleNotFound(id))
    }

    pub fn vehicle_mut(&mut self, id: VehicleId) -> SimResult<&mut Vehicle> {
        self.vehicles.get_mut(id.0).ok_or(SimError::VehicleNotFound(id))
    }

    pub fn control_point(&self) -> Option<ControlPoint> {
        self.control_point
    }

    /// Position of an occupant as of `tick`. Empty slots have none.
    pub fn slot_position(&self, slot: Slot, tick: Tick) -> SimResult<Option<f64>> {
        Ok(match slot {
            Slot::Vehicle(id) => Some(self.vehicle(id)?.position_at(tick)),
            Slot::ControlPoint => self.control_point.map(|cp| cp.position),
            Slot::Empty => None,
        })
    }

    /// The occupant a vehicle at `index` in `lane` follows.
    ///
    /// Past the last occupant the lane wraps to its own head, unless the merge
    /// lane is occupied, in which case the merge lane's head leads instead.
    pub fn successor(&self, lane: LaneId, index: usize) -> SimResult<Slot> {
        let current = self.lane(lane)?;
        let next = current.slot(index + 1);
        if next != Slot::Empty {
            return Ok(next);
        }

        let merge_head = self.lane(self.merge_lane())?.head();
        if merge_head != Slot::Empty {
            Ok(merge_head)
        } else {
            Ok(current.head())
        }
    }

    /// Puts the control point at the tail of `lane` and restores order.
    pub fn place_control_point(&mut self, lane: LaneId, position: f64) -> SimResult<()> {
        if let Some(existing) = self.control_point {
            if !self.lane_mut(existing.lane)?.remove(Slot::ControlPoint) {
                return Err(SimError::ControlPointMissing(existing.lane));
            }
            self.sort_lane(existing.lane);
        }

        self.lane_mut(lane)?.push(Slot::ControlPoint)?;
        self.control_point = Some(ControlPoint { position, lane });
        self.sort_lane(lane);
        Ok(())
    }

    /// Moves the control point, keeping its position, into `lane`.
    pub fn relocate_control_point(&mut self, lane: LaneId) -> SimResult<bool> {
        match self.control_point {
            Some(existing) => {
                self.place_control_point(lane, existing.position)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Moves a vehicle into `destination`. Returns false if it is already there.
    ///
    /// Fails without touching either lane if the destination is full or the
    /// vehicle is missing from the lane it claims to be in.
    pub fn move_vehicle(&mut self, id: VehicleId, destination: LaneId) -> SimResult<bool> {
        let origin = self.vehicle(id)?.current_lane;
        if origin == destination {
            return Ok(false);
        }

        let target = self.lane(destination)?;
        if target.contains(id) {
            return Err(SimError::DuplicateOccupant {
                vehicle: id,
                lane: destination,
            });
        }
        if target.len() >= target.capacity() {
            return Err(SimError::LaneFull {
                lane: destination,
                capacity: target.capacity(),
            });
        }

        if !self.lane_mut(origin)?.remove(Slot::Vehicle(id)) {
            return Err(SimError::VehicleNotFound(id));
        }
        self.lane_mut(destination)?.push(Slot::Vehicle(id))?;

        self.sort_lane(destination);
        self.sort_lane(origin);
        self.vehicle_mut(id)?.current_lane = destination;
        Ok(true)
    }

    /// Whether every occupied slot of `lane` is in ascending position order.
    pub fn is_lane_ordered(&self, lane: LaneId) -> bool {
        let Ok(current) = self.lane(lane) else {
            return false;
        };
        current.slots().windows(2).all(|pair| {
            self.sort_key(pair[0]) <= self.sort_key(pair[1])
        })
    }

    fn sort_key(&self, slot: Slot) -> f64 {
        slot_sort_key(slot, &self.vehicles, self.control_point)
    }

    fn sort_lane(&mut self, lane: LaneId) {
        let vehicles = &self.vehicles;
        let control_point = self.control_point;
        if let Some(current) = self.lanes.get_mut(lane.0) {
            // Stable: vehicles at equal positions keep their arrival order.
            current.occupants.sort_by(|a, b| {
                slot_sort_key(*a, vehicles, control_point)
                    .total_cmp(&slot_sort_key(*b, vehicles, control_point))
            });
        }
    }
}

fn slot_sort_key(slot: Slot, vehicles: &[Vehicle], control_point: Option<ControlPoint>) -> f64 {
    match slot {
        Slot::Vehicle(id) => vehicles.get(id.0).map_or(f64::INFINITY, Vehicle::position),
        Slot::ControlPoint => control_point.map_or(f64::INFINITY, |cp| cp.position),
        Slot::Empty => f64::INFINITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_lane_road() -> RoadState {
        RoadState::new(2, 5, 100.0)
    }

    #[test]
    fn spawn_keeps_lane_sorted() {
        let mut road = two_lane_road();
        let far = road.spawn(LaneId(0), 50.0, 10.0).unwrap();
        let near = road.spawn(LaneId(0), 10.0, 10.0).unwrap();

        let lane = road.lane(LaneId(0)).unwrap();
        assert_eq!(lane.slots(), &[Slot::Vehicle(near), Slot::Vehicle(far)]);
        assert_eq!(lane.slot(2), Slot::Empty);
        assert!(road.is_lane_ordered(LaneId(0)));
    }

    #[test]
    fn successor_falls_back_to_merge_head() {
        let mut road = two_lane_road();
        let a = road.spawn(LaneId(0), 10.0, 10.0).unwrap();
        let b = road.spawn(LaneId(0), 20.0, 10.0).unwrap();

        assert_eq!(road.successor(LaneId(0), 0).unwrap(), Slot::Vehicle(b));
        assert_eq!(road.successor(LaneId(0), 1).unwrap(), Slot::Vehicle(a));

        let merged = road.spawn(LaneId(1), 30.0, 10.0).unwrap();
        road.move_vehicle(merged, road.merge_lane()).unwrap();
        assert_eq!(road.successor(LaneId(0), 1).unwrap(), Slot::Vehicle(merged));
    }

    #[test]
    fn control_point_relocation_moves_marker() {
        let mut road = two_lane_road();
        road.spawn(LaneId(0), 0.0, 10.0).unwrap();
        road.spawn(LaneId(1), 0.0, 10.0).unwrap();

        road.place_control_point(LaneId(1), 5.0).unwrap();
        assert!(road.lane(LaneId(1)).unwrap().has_control_point());

        assert!(road.relocate_control_point(LaneId(0)).unwrap());
        assert!(!road.lane(LaneId(1)).unwrap().has_control_point());
        assert_eq!(road.lane(LaneId(0)).unwrap().slot(1), Slot::ControlPoint);
        assert_eq!(road.control_point().unwrap().lane, LaneId(0));
    }

    #[test]
    fn full_lane_rejects_vehicle() {
        let mut road = RoadState::new(2, 1, 100.0);
        road.spawn(LaneId(0), 0.0, 10.0).unwrap();
        let err = road.spawn(LaneId(0), 1.0, 10.0).unwrap_err();
        assert!(matches!(err, SimError::LaneFull { capacity: 1, .. }));
    }

    #[test]
    fn clear_lane_allows_control_point_head() {
        let mut road = two_lane_road();
        let id = road.spawn(LaneId(0), 0.0, 10.0).unwrap();
        road.place_control_point(LaneId(0), 5.0).unwrap();
        assert!(!road.lane(LaneId(0)).unwrap().is_clear());

        road.move_vehicle(id, road.merge_lane()).unwrap();
        assert_eq!(road.lane(LaneId(0)).unwrap().head(), Slot::ControlPoint);
        assert!(road.lane(LaneId(0)).unwrap().is_clear());
        assert!(road.lane(LaneId(1)).unwrap().is_clear());
    }

    #[test]
    fn move_from_wrong_origin_fails_fast() {
        let mut road = two_lane_road();
        let id = road.spawn(LaneId(0), 0.0, 10.0).unwrap();
        road.vehicle_mut(id).unwrap().current_lane = LaneId(1);

        let err = road.move_vehicle(id, road.merge_lane()).unwrap_err();
        assert!(matches!(err, SimError::VehicleNotFound(v) if v == id));
        assert!(road.lane(road.merge_lane()).unwrap().is_empty());
        assert!(road.lane(LaneId(0)).unwrap().contains(id));
    }

    #[test]
    fn move_into_full_lane_leaves_origin_intact() {
        let mut road = RoadState::new(2, 1, 100.0);
        let id = road.spawn(LaneId(0), 0.0, 10.0).unwrap();
        road.spawn(LaneId(1), 5.0, 10.0).unwrap();

        let err = road.move_vehicle(id, LaneId(1)).unwrap_err();
        assert!(matches!(err, SimError::LaneFull { capacity: 1, .. }));
        assert!(road.lane(LaneId(0)).unwrap().contains(id));
        assert_eq!(road.vehicle(id).unwrap().current_lane, LaneId(0));
    }

    #[test]
    fn stray_control_point_record_is_an_error() {
        let mut road = two_lane_road();
        road.spawn(LaneId(0), 0.0, 10.0).unwrap();
        road.control_point = Some(ControlPoint {
            position: 5.0,
            lane: LaneId(0),
        });

        let err = road.place_control_point(LaneId(1), 5.0).unwrap_err();
        assert!(matches!(err, SimError::ControlPointMissing(LaneId(0))));
    }
}
