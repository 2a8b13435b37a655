/// Circular distance from `from` forward to `to` on a ring of length `road_length`.
///
/// Always in `[0, road_length)`; a remainder that rounds up to the full
/// length is folded back to zero.
pub fn circular_headway(from: f64, to: f64, road_length: f64) -> f64 {
    wrap(to - from, road_length)
}

/// Advances `position` by one step of length `dt` at `velocity`, wrapping on the ring.
pub fn advance_position(position: f64, velocity: f64, dt: f64, road_length: f64) -> f64 {
    wrap(position + dt * velocity, road_length)
}

fn wrap(value: f64, road_length: f64) -> f64 {
    let wrapped = value.rem_euclid(road_length);
    if wrapped >= road_length {
        0.0
    } else {
        wrapped
    }
}

/// Optimal-velocity car-following model shared by every vehicle on the ring.
#[derive(Debug, Clone, Copy)]
pub struct VelocityModel {
    pub road_length: f64,
    pub min_headway: f64,
}

impl VelocityModel {
    pub fn new(road_length: f64, min_headway: f64) -> Self {
        Self {
            road_length,
            min_headway,
        }
    }

    /// The saturating optimal-velocity curve for a vehicle at `x1` following `x2`.
    ///
    /// Coincident positions carry no ordering information, so they are read
    /// as a full lap of free road.
    pub fn optimal_velocity(&self, x1: f64, x2: f64, max_velocity: f64) -> f64 {
        let headway = if x2 - x1 == 0.0 {
            self.road_length
        } else {
            circular_headway(x1, x2, self.road_length)
        };
        max_velocity * (1.0 - (-(headway - self.min_headway) / max_velocity).exp())
    }

    /// Velocity for the next tick. A distinct leader within the minimum
    /// headway forces a full stop; a vehicle following itself (alone in its
    /// lane) always drives on the full-lap curve.
    pub fn velocity(&self, x1: f64, x2: f64, max_velocity: f64, follows_itself: bool) -> f64 {
        if !follows_itself && circular_headway(x1, x2, self.road_length) <= self.min_headway {
            return 0.0;
        }
        self.optimal_velocity(x1, x2, max_velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn headway_wraps_around_the_ring() {
        assert_approx_eq!(circular_headway(95.0, 5.0, 100.0), 10.0);
        assert_approx_eq!(circular_headway(5.0, 95.0, 100.0), 90.0);
        assert_eq!(circular_headway(42.0, 42.0, 100.0), 0.0);
    }

    #[test]
    fn tiny_negative_remainder_stays_in_range() {
        let headway = circular_headway(1e-18, 0.0, 100.0);
        assert!(headway >= 0.0 && headway < 100.0);
    }

    #[test]
    fn leader_at_min_headway_forces_stop() {
        let model = VelocityModel::new(100.0, 5.0);
        assert_eq!(model.velocity(0.0, 5.0, 10.0, false), 0.0);
        assert_eq!(model.velocity(0.0, 3.0, 10.0, false), 0.0);
        assert!(model.velocity(0.0, 5.5, 10.0, false) > 0.0);
    }

    #[test]
    fn lone_vehicle_uses_full_lap() {
        let model = VelocityModel::new(100.0, 5.0);
        let expected = 10.0 * (1.0 - (-(100.0 - 5.0) / 10.0_f64).exp());
        assert_approx_eq!(model.velocity(37.0, 37.0, 10.0, true), expected);
    }

    #[test]
    fn velocity_saturates_below_max() {
        let model = VelocityModel::new(3000.0, 5.0);
        let near = model.velocity(0.0, 10.0, 40.0, false);
        let far = model.velocity(0.0, 2000.0, 40.0, false);
        assert!(near < far);
        assert_approx_eq!(far, 40.0, 1e-9);
    }

    #[test]
    fn position_update_wraps() {
        assert_approx_eq!(advance_position(99.9, 20.0, 0.01, 100.0), 0.1);
        assert_approx_eq!(advance_position(10.0, 0.0, 0.01, 100.0), 10.0);
    }
}
