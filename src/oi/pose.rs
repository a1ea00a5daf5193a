// Dead-reckoning pose estimate
//
// The robot reports incremental distance (mm) and angle (degrees) since
// the previous poll of those packets. The estimator accumulates them into
// an absolute (x, y, heading) kept internally in centimeters and radians.
//
// Integration convention: the angle delta is applied first and the
// position update uses the new heading. With small per-poll deltas the
// difference from the before-update convention is below sensor noise,
// but the choice is part of this estimator's contract.

/// Distance unit for the pose accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceUnit {
    Mm,
    Cm,
}

/// Angle unit for the pose accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleUnit {
    Radians,
    Degrees,
}

/// Accumulated (x, y, heading) estimate. Starts at the origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoseEstimator {
    x_cm: f64,
    y_cm: f64,
    theta_rad: f64,
}

impl PoseEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one (distance, angle) delta pair into the estimate.
    pub fn integrate(&mut self, distance_mm: i16, angle_deg: i16) {
        let dist_cm = distance_mm as f64 / 10.0;
        self.theta_rad += (angle_deg as f64).to_radians();
        self.x_cm += dist_cm * self.theta_rad.cos();
        self.y_cm += dist_cm * self.theta_rad.sin();
    }

    /// Current (x, y, heading) in the requested units.
    pub fn get(&self, dist: DistanceUnit, angle: AngleUnit) -> (f64, f64, f64) {
        let scale = match dist {
            DistanceUnit::Cm => 1.0,
            DistanceUnit::Mm => 10.0,
        };
        let theta = match angle {
            AngleUnit::Radians => self.theta_rad,
            AngleUnit::Degrees => self.theta_rad.to_degrees(),
        };
        (self.x_cm * scale, self.y_cm * scale, theta)
    }

    /// Overwrite the estimate, interpreting the inputs in the given units.
    pub fn set(&mut self, x: f64, y: f64, theta: f64, dist: DistanceUnit, angle: AngleUnit) {
        let scale = match dist {
            DistanceUnit::Cm => 1.0,
            DistanceUnit::Mm => 0.1,
        };
        self.x_cm = x * scale;
        self.y_cm = y * scale;
        self.theta_rad = match angle {
            AngleUnit::Radians => theta,
            AngleUnit::Degrees => theta.to_radians(),
        };
    }

    /// Back to the origin with zero heading.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_starts_at_origin() {
        let pose = PoseEstimator::new();
        let (x, y, th) = pose.get(DistanceUnit::Cm, AngleUnit::Degrees);
        assert_eq!((x, y, th), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_set_get_roundtrip_cm_deg() {
        let mut pose = PoseEstimator::new();
        pose.set(10.0, 20.0, 90.0, DistanceUnit::Cm, AngleUnit::Degrees);
        let (x, y, th) = pose.get(DistanceUnit::Cm, AngleUnit::Degrees);
        assert!((x - 10.0).abs() < EPS);
        assert!((y - 20.0).abs() < EPS);
        assert!((th - 90.0).abs() < EPS);
    }

    #[test]
    fn test_set_get_roundtrip_mm_rad() {
        let mut pose = PoseEstimator::new();
        pose.set(100.0, 200.0, 1.5, DistanceUnit::Mm, AngleUnit::Radians);
        let (x, y, th) = pose.get(DistanceUnit::Mm, AngleUnit::Radians);
        assert!((x - 100.0).abs() < EPS);
        assert!((y - 200.0).abs() < EPS);
        assert!((th - 1.5).abs() < EPS);
    }

    #[test]
    fn test_reset_after_set() {
        let mut pose = PoseEstimator::new();
        pose.set(10.0, 20.0, 90.0, DistanceUnit::Cm, AngleUnit::Degrees);
        pose.reset();
        let (x, y, th) = pose.get(DistanceUnit::Cm, AngleUnit::Degrees);
        assert_eq!((x, y, th), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_straight_line_integration() {
        let mut pose = PoseEstimator::new();
        // Ten 100mm steps straight ahead
        for _ in 0..10 {
            pose.integrate(100, 0);
        }
        let (x, y, _) = pose.get(DistanceUnit::Cm, AngleUnit::Degrees);
        assert!((x - 100.0).abs() < EPS);
        assert!(y.abs() < EPS);
    }

    #[test]
    fn test_turn_then_move_uses_new_heading() {
        let mut pose = PoseEstimator::new();
        // 90° left turn and 100mm travel in the same tick: the position
        // update must use the post-turn heading, so all motion lands on y.
        pose.integrate(100, 90);
        let (x, y, th) = pose.get(DistanceUnit::Cm, AngleUnit::Degrees);
        assert!(x.abs() < 1e-6);
        assert!((y - 10.0).abs() < 1e-6);
        assert!((th - 90.0).abs() < EPS);
    }

    #[test]
    fn test_backward_travel() {
        let mut pose = PoseEstimator::new();
        pose.integrate(-250, 0);
        let (x, _, _) = pose.get(DistanceUnit::Mm, AngleUnit::Radians);
        assert!((x + 250.0).abs() < EPS);
    }
}
