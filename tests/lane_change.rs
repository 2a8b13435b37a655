//! Impatience bookkeeping of the lane-change evaluator on hand-built roads.

use anyhow::Result;
use assert_approx_eq::assert_approx_eq;
use lane_merge_sim::simulation::{LaneChangeEvaluator, LaneId, RoadState, VehicleId};
use lane_merge_sim::SimError;

const TOLERANCE: u32 = 500;

/// Lane 0 holds a vehicle boxed in at the minimum headway; lane 1 holds one
/// vehicle at `other_position`.
fn boxed_in(other_position: f64) -> Result<(RoadState, VehicleId)> {
    let mut road = RoadState::new(2, 5, 100.0);
    let boxed = road.spawn(LaneId(0), 0.0, 10.0)?;
    road.spawn(LaneId(0), 5.0, 10.0)?;
    road.spawn(LaneId(1), other_position, 10.0)?;
    Ok((road, boxed))
}

#[test]
fn candidate_lanes_check_above_then_below() {
    let lanes = |lane, count| LaneChangeEvaluator::candidate_lanes(LaneId(lane), count).collect::<Vec<_>>();

    assert_eq!(lanes(0, 2), vec![LaneId(1)]);
    assert_eq!(lanes(1, 2), vec![LaneId(0)]);
    assert_eq!(lanes(1, 3), vec![LaneId(2), LaneId(0)]);
    assert_eq!(lanes(2, 3), vec![LaneId(1)]);
}

#[test]
fn hypothetical_headway_finds_new_leader() -> Result<()> {
    let (road, boxed) = boxed_in(50.0)?;
    let evaluator = LaneChangeEvaluator::new(TOLERANCE);
    assert_approx_eq!(evaluator.hypothetical_headway(&road, boxed, LaneId(1), 0)?, 50.0);

    let mut road = RoadState::new(2, 5, 100.0);
    let alone = road.spawn(LaneId(0), 30.0, 10.0)?;
    assert_approx_eq!(evaluator.hypothetical_headway(&road, alone, LaneId(1), 0)?, 100.0);
    Ok(())
}

#[test]
fn hypothetical_headway_wraps_to_lane_head() -> Result<()> {
    let (mut road, boxed) = boxed_in(50.0)?;
    let late = road.spawn(LaneId(0), 80.0, 10.0)?;
    let evaluator = LaneChangeEvaluator::new(TOLERANCE);

    // Inserted after the only lane-1 vehicle, so the successor wraps around.
    assert_approx_eq!(evaluator.hypothetical_headway(&road, late, LaneId(1), 0)?, 70.0);
    assert_approx_eq!(evaluator.hypothetical_headway(&road, boxed, LaneId(1), 0)?, 50.0);
    Ok(())
}

#[test]
fn own_lane_is_rejected_as_duplicate() -> Result<()> {
    let (road, boxed) = boxed_in(50.0)?;
    let evaluator = LaneChangeEvaluator::new(TOLERANCE);

    let err = evaluator
        .hypothetical_headway(&road, boxed, LaneId(0), 0)
        .unwrap_err();
    assert!(matches!(err, SimError::DuplicateOccupant { .. }));
    Ok(())
}

#[test]
fn full_candidate_lane_is_an_error() -> Result<()> {
    let mut road = RoadState::new(2, 1, 100.0);
    let boxed = road.spawn(LaneId(0), 0.0, 10.0)?;
    road.spawn(LaneId(1), 50.0, 10.0)?;
    let evaluator = LaneChangeEvaluator::new(TOLERANCE);

    let err = evaluator
        .hypothetical_headway(&road, boxed, LaneId(1), 0)
        .unwrap_err();
    assert!(matches!(err, SimError::LaneFull { capacity: 1, .. }));
    Ok(())
}

#[test]
fn switch_requested_once_tolerance_exceeded() -> Result<()> {
    let (mut road, boxed) = boxed_in(50.0)?;
    let evaluator = LaneChangeEvaluator::new(TOLERANCE);

    for expected in 1..=evaluator.tolerance() {
        assert_eq!(evaluator.evaluate(&mut road, boxed, 5.0, 0)?, None);
        assert_eq!(road.vehicle(boxed)?.impatience, expected);
    }

    assert_eq!(evaluator.evaluate(&mut road, boxed, 5.0, 0)?, Some(LaneId(1)));
    assert_eq!(road.vehicle(boxed)?.impatience, 0);
    Ok(())
}

#[test]
fn worse_lane_eases_impatience_without_going_negative() -> Result<()> {
    let (mut road, boxed) = boxed_in(2.0)?;
    let evaluator = LaneChangeEvaluator::new(TOLERANCE);
    road.vehicle_mut(boxed)?.impatience = 2;

    for expected in [1, 0, 0, 0] {
        assert_eq!(evaluator.evaluate(&mut road, boxed, 5.0, 0)?, None);
        assert_eq!(road.vehicle(boxed)?.impatience, expected);
    }
    Ok(())
}

#[test]
fn zero_headway_skips_evaluation() -> Result<()> {
    let (mut road, boxed) = boxed_in(50.0)?;
    let evaluator = LaneChangeEvaluator::new(TOLERANCE);
    road.vehicle_mut(boxed)?.impatience = 7;

    assert_eq!(evaluator.evaluate(&mut road, boxed, 0.0, 0)?, None);
    assert_eq!(road.vehicle(boxed)?.impatience, 7);
    Ok(())
}

#[test]
fn first_better_lane_stops_the_search() -> Result<()> {
    let mut road = RoadState::new(3, 5, 100.0);
    road.spawn(LaneId(0), 1.0, 10.0)?;
    let middle = road.spawn(LaneId(1), 0.0, 10.0)?;
    road.spawn(LaneId(1), 5.0, 10.0)?;
    road.spawn(LaneId(2), 60.0, 10.0)?;
    road.vehicle_mut(middle)?.impatience = 10;

    let evaluator = LaneChangeEvaluator::new(TOLERANCE);
    assert_eq!(evaluator.evaluate(&mut road, middle, 5.0, 0)?, None);

    // Lane 2 looked better, so the worse lane 0 was never weighed.
    assert_eq!(road.vehicle(middle)?.impatience, 11);
    Ok(())
}

#[test]
fn every_worse_lane_eases_once() -> Result<()> {
    let mut road = RoadState::new(3, 5, 100.0);
    road.spawn(LaneId(0), 1.0, 10.0)?;
    let middle = road.spawn(LaneId(1), 0.0, 10.0)?;
    road.spawn(LaneId(1), 5.0, 10.0)?;
    road.spawn(LaneId(2), 3.0, 10.0)?;
    road.vehicle_mut(middle)?.impatience = 10;

    let evaluator = LaneChangeEvaluator::new(TOLERANCE);
    assert_eq!(evaluator.evaluate(&mut road, middle, 5.0, 0)?, None);
    assert_eq!(road.vehicle(middle)?.impatience, 8);
    Ok(())
}
