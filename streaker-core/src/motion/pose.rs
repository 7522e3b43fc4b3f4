//! Last commanded pose of the lever and platform

use crate::kinematics::{ExtendedAccumulator, JointSolution};

/// Robot pose owned by the planner
///
/// Angles are the last commanded kinematic angles, not measured values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RobotPose {
    /// Last commanded lever angle (radians)
    pub current_lever_angle: f32,
    /// Last commanded platform angle in the kinematic model (radians)
    pub current_platform_angle: f32,
    /// Extended platform position in real-world degrees
    pub platform: ExtendedAccumulator,
    /// True once the first point move has been issued
    pub has_moved_once: bool,
}

impl RobotPose {
    /// Pose at rest with the accumulator at zero
    pub const fn new() -> Self {
        Self {
            current_lever_angle: 0.0,
            current_platform_angle: 0.0,
            platform: ExtendedAccumulator::new(),
            has_moved_once: false,
        }
    }

    /// Pose at rest with the accumulator seeded at the platform home
    pub const fn homed(platform_home_degrees: f32) -> Self {
        Self {
            current_lever_angle: 0.0,
            current_platform_angle: 0.0,
            platform: ExtendedAccumulator::seeded(platform_home_degrees),
            has_moved_once: false,
        }
    }

    /// Last commanded joints, or `None` before the first move
    pub fn last_solution(&self) -> Option<JointSolution> {
        if self.has_moved_once {
            Some(JointSolution::new(
                self.current_lever_angle,
                self.current_platform_angle,
            ))
        } else {
            None
        }
    }

    /// Record a newly commanded solution
    pub fn commit(&mut self, solution: JointSolution) {
        self.current_lever_angle = solution.lever_angle;
        self.current_platform_angle = solution.platform_angle;
        self.has_moved_once = true;
    }

    /// Accumulated platform degrees
    pub fn cumulative_platform_degrees(&self) -> f32 {
        self.platform.cumulative_degrees()
    }

    /// Last degrees value fed to the accumulator
    pub fn last_platform_target_degrees(&self) -> f32 {
        self.platform.last_target_degrees()
    }
}
