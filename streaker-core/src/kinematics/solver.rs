//! Two-circle inverse kinematics
//!
//! The lever pivot sits at the origin and sweeps a circle of radius
//! `lever_length`. A platform point at radius `r` from the platform centre
//! can only be under the applicator where that circle meets the circle of
//! radius `r` around `platform_center`. Each intersection gives one lever
//! angle and the platform rotation that carries the requested point onto
//! the intersection.

use core::f32::consts::PI;

use crate::config::LinkGeometry;

use super::point::Point;

/// Solver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SolveError {
    /// The lever circle and the target circle do not intersect
    Unreachable,
}

/// One candidate joint pose (radians)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JointSolution {
    /// Lever angle from the pivot's +X axis
    pub lever_angle: f32,
    /// Platform rotation, in (-PI, PI]
    pub platform_angle: f32,
}

impl JointSolution {
    /// Create a candidate
    pub const fn new(lever_angle: f32, platform_angle: f32) -> Self {
        Self {
            lever_angle,
            platform_angle,
        }
    }
}

/// Both solver branches for one target
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IkSolution {
    /// Candidate joint poses, one per intersection
    pub candidates: [JointSolution; 2],
    /// Intersection points in the pivot frame (diagnostics)
    pub intersections: [Point; 2],
    /// Distance of the target from the platform centre (mm)
    pub target_radius: f32,
}

/// Normalize an angle into (-PI, PI]
pub fn normalize_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return angle;
    }
    let angle = libm::fmodf(angle, 2.0 * PI);
    if angle > PI {
        angle - 2.0 * PI
    } else if angle <= -PI {
        angle + 2.0 * PI
    } else {
        angle
    }
}

/// Check whether the lever can reach a circle of `radius` around the platform centre
pub fn is_reachable(geometry: &LinkGeometry, radius: f32) -> bool {
    let d = geometry.center_distance();
    let l = geometry.lever_length;
    d > 0.0 && d <= l + radius && d >= libm::fabsf(l - radius)
}

/// Solve both branches for a platform-local target
///
/// The target is used as given; clamping to the platform radius and the
/// near-centre skip are the caller's job.
pub fn solve(geometry: &LinkGeometry, target: Point) -> Result<IkSolution, SolveError> {
    let r = target.norm();
    let target_angle = target.angle();

    let center = geometry.platform_center;
    let d = geometry.center_distance();
    let l = geometry.lever_length;

    if !is_reachable(geometry, r) {
        return Err(SolveError::Unreachable);
    }

    let a = (l * l - r * r + d * d) / (2.0 * d);
    // Tangent circles can leave a tiny negative under the root
    let h = libm::sqrtf((l * l - a * a).max(0.0));

    let mid = center.scale(a / d);
    let offset = Point::new(-center.y * h / d, center.x * h / d);
    let intersections = [mid + offset, mid - offset];

    let candidate = |p: Point| {
        let lever_angle = p.angle();
        let platform_angle = normalize_angle((p - center).angle() - target_angle);
        JointSolution::new(lever_angle, platform_angle)
    };

    Ok(IkSolution {
        candidates: [candidate(intersections[0]), candidate(intersections[1])],
        intersections,
        target_radius: r,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bench_geometry() -> LinkGeometry {
        LinkGeometry::new(99.0, Point::new(70.0, 70.0), 45.0)
    }

    fn assert_on_both_circles(geometry: &LinkGeometry, p: Point, radius: f32) {
        assert!(libm::fabsf(p.norm() - geometry.lever_length) < 1e-2);
        assert!(libm::fabsf((p - geometry.platform_center).norm() - radius) < 1e-2);
    }

    #[test]
    fn test_normalize_angle() {
        assert!(libm::fabsf(normalize_angle(3.0 * PI / 2.0) + PI / 2.0) < 1e-5);
        assert!(libm::fabsf(normalize_angle(-3.0 * PI / 2.0) - PI / 2.0) < 1e-5);
        assert_eq!(normalize_angle(PI), PI);
        assert_eq!(normalize_angle(-PI), PI);
        assert_eq!(normalize_angle(0.5), 0.5);

        let huge = normalize_angle(1.0e12);
        assert!(huge > -PI && huge <= PI);
    }

    #[test]
    fn test_solve_bench_point() {
        let geometry = bench_geometry();
        let solution = solve(&geometry, Point::new(30.0, 0.0)).unwrap();
        assert!(libm::fabsf(solution.target_radius - 30.0) < 1e-5);
        for p in solution.intersections {
            assert_on_both_circles(&geometry, p, 30.0);
        }
        assert_ne!(solution.intersections[0], solution.intersections[1]);
    }

    #[test]
    fn test_candidates_place_target_under_lever() {
        let geometry = bench_geometry();
        let target = Point::new(12.0, -20.0);
        let solution = solve(&geometry, target).unwrap();

        for (candidate, tip) in solution.candidates.iter().zip(solution.intersections) {
            // Lever tip from the lever angle
            let from_lever = Point::from_polar(geometry.lever_length, candidate.lever_angle);
            assert!((from_lever - tip).norm() < 1e-2);

            // Rotating the target by the platform angle lands on the tip
            let rotated = Point::from_polar(
                target.norm(),
                target.angle() + candidate.platform_angle,
            ) + geometry.platform_center;
            assert!((rotated - tip).norm() < 1e-2);

            assert!(candidate.platform_angle > -PI && candidate.platform_angle <= PI);
        }
    }

    #[test]
    fn test_unreachable_too_far() {
        let geometry = LinkGeometry::new(50.0, Point::new(100.0, 0.0), 45.0);
        assert_eq!(
            solve(&geometry, Point::new(10.0, 0.0)),
            Err(SolveError::Unreachable)
        );
    }

    #[test]
    fn test_unreachable_too_close() {
        // d = 100, L = 80: radii below 20 mm cannot be reached
        let geometry = LinkGeometry::new(80.0, Point::new(100.0, 0.0), 45.0);
        assert_eq!(
            solve(&geometry, Point::new(0.0, 15.0)),
            Err(SolveError::Unreachable)
        );
        assert!(solve(&geometry, Point::new(0.0, 25.0)).is_ok());
    }

    #[test]
    fn test_tangent_circles() {
        // d = 100, L = 80, r = 20: the circles touch at one point
        let geometry = LinkGeometry::new(80.0, Point::new(100.0, 0.0), 45.0);
        let solution = solve(&geometry, Point::new(20.0, 0.0)).unwrap();
        assert!((solution.intersections[0] - solution.intersections[1]).norm() < 0.5);
        assert!(libm::fabsf(solution.intersections[0].x - 80.0) < 0.1);
    }
}
