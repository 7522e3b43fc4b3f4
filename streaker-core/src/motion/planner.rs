//! Polar point planner
//!
//! Turns platform-local points into lever and platform goals:
//!
//! 1. clamp the point onto the platform
//! 2. skip points at the rotation centre
//! 3. solve both branches and pick the one with the least travel
//! 4. convert the lever angle to a single-turn raw goal and the platform
//!    angle to an extended raw goal through the accumulator
//! 5. issue both goals, then wait on the motion barrier
//!
//! The planner owns the pose; every successful point continues the path
//! from the previous one.

use embedded_hal::delay::DelayNs;

use super::barrier::{wait_for_motion, BarrierOutcome};
use super::pose::RobotPose;
use crate::config::{ConfigError, JointId, MachineConfig, NamedPosition, OperatingMode};
use crate::kinematics::{
    degrees_to_raw, raw_to_degrees_unbounded, select, solve, IkSolution, JointSolution, Point,
};
use crate::pattern::StreakPattern;
use crate::traits::{ActuatorPort, JointSet};

/// Joints moved by a platform point
const PLANAR_JOINTS: [JointId; 2] = [JointId::PolarArm, JointId::Platform];

/// Motion errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionError<E> {
    /// Target cannot be reached by the lever
    Unreachable,
    /// Actuator bus error
    Actuator(E),
    /// Joints did not stop within the barrier timeout
    Timeout,
    /// Joints were never seen moving (strict confirmation only)
    Unconfirmed,
    /// Joint is not in the joint table
    UnknownJoint(JointId),
    /// Joint has no value for the named position
    NoNamedPosition(JointId, NamedPosition),
    /// Raw target is outside the joint's range
    OutOfRange(JointId, i32),
}

/// Commands issued for one point
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MoveReport {
    /// Point after clamping (platform frame, mm)
    pub target: Point,
    /// Raw goal sent to the polar arm
    pub lever_raw: i32,
    /// Extended raw goal sent to the platform
    pub platform_raw: i32,
    /// Index of the chosen solver branch
    pub branch: usize,
    /// Full solver output
    pub solution: IkSolution,
    /// How the barrier ended
    pub barrier: BarrierOutcome,
}

/// Result of a single point request
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PointOutcome {
    /// Joints were commanded
    Moved(MoveReport),
    /// Point was at the rotation centre; nothing was commanded
    Skipped,
}

impl PointOutcome {
    /// The move report, if the point was drawn
    pub fn report(&self) -> Option<&MoveReport> {
        match self {
            PointOutcome::Moved(report) => Some(report),
            PointOutcome::Skipped => None,
        }
    }
}

/// Summary of a traced path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TraceReport {
    /// Points drawn
    pub moved: u16,
    /// Points skipped at the rotation centre
    pub skipped: u16,
    /// Points the lever could not reach
    pub unreachable: u16,
    /// Drawn points whose motion was never observed
    pub unconfirmed: u16,
}

impl TraceReport {
    /// True when every point was either drawn or skipped
    pub fn is_success(&self) -> bool {
        self.unreachable == 0
    }

    /// Total points requested
    pub fn total(&self) -> u16 {
        self.moved
            .saturating_add(self.skipped)
            .saturating_add(self.unreachable)
    }

    fn merge(&mut self, other: TraceReport) {
        self.moved = self.moved.saturating_add(other.moved);
        self.skipped = self.skipped.saturating_add(other.skipped);
        self.unreachable = self.unreachable.saturating_add(other.unreachable);
        self.unconfirmed = self.unconfirmed.saturating_add(other.unconfirmed);
    }
}

/// Point planner for the lever arm and platform
pub struct PolarPlanner<P, D> {
    port: P,
    delay: D,
    config: MachineConfig,
    pose: RobotPose,
}

impl<P, D> PolarPlanner<P, D>
where
    P: ActuatorPort,
    D: DelayNs,
{
    /// Create a planner after validating the configuration
    ///
    /// The pose starts as if the machine had just been homed.
    pub fn new(port: P, delay: D, config: MachineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let pose = RobotPose::homed(Self::platform_home_degrees(&config));
        Ok(Self {
            port,
            delay,
            config,
            pose,
        })
    }

    /// Machine configuration
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Current pose
    pub fn pose(&self) -> &RobotPose {
        &self.pose
    }

    /// Last commanded joint angles, `None` before the first move
    pub fn last_commanded(&self) -> Option<JointSolution> {
        self.pose.last_solution()
    }

    /// Mutable access to the actuator port
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Give back the port and delay
    pub fn release(self) -> (P, D) {
        (self.port, self.delay)
    }

    /// Draw one point on the platform (mm, platform frame)
    ///
    /// Returns `Ok(PointOutcome::Skipped)` for points at the rotation
    /// centre and `Err(MotionError::Unreachable)` without touching the
    /// actuators when the lever cannot reach the point.
    pub fn draw_platform_point(
        &mut self,
        x: f32,
        y: f32,
    ) -> Result<PointOutcome, MotionError<P::Error>> {
        let geometry = self.config.geometry;
        let target = Point::new(x, y).clamp_to_radius(geometry.platform_radius);

        let radius = target.norm();
        if radius < geometry.singularity_radius {
            debug!("skip ({}, {}): at rotation centre", x, y);
            return Ok(PointOutcome::Skipped);
        }

        let solution = match solve(&geometry, target) {
            Ok(solution) => solution,
            Err(_) => {
                warn!(
                    "unreachable ({}, {}): r={} lever={} center_dist={}",
                    target.x,
                    target.y,
                    radius,
                    geometry.lever_length,
                    geometry.center_distance()
                );
                return Err(MotionError::Unreachable);
            }
        };

        let selection = select(self.pose.last_solution(), &solution.candidates);
        self.pose.commit(selection.chosen);

        let lever_degrees =
            selection.chosen.lever_angle.to_degrees() + geometry.lever_home_offset_degrees;
        let lever_raw = degrees_to_raw(lever_degrees) as i32;

        let platform_degrees =
            selection.chosen.platform_angle.to_degrees() + geometry.platform_home_offset_degrees;
        let platform_raw = self.pose.platform.advance(platform_degrees);

        trace!(
            "point ({}, {}) branch {} lever={} platform={} cumulative={}",
            target.x,
            target.y,
            selection.index,
            lever_raw,
            platform_raw,
            self.pose.cumulative_platform_degrees()
        );

        self.port
            .set_goal_raw_position(JointId::PolarArm, lever_raw)
            .map_err(MotionError::Actuator)?;
        self.port
            .set_goal_raw_position(JointId::Platform, platform_raw)
            .map_err(MotionError::Actuator)?;

        let barrier = self.wait(JointSet::Some(&PLANAR_JOINTS), false)?;

        Ok(PointOutcome::Moved(MoveReport {
            target,
            lever_raw,
            platform_raw,
            branch: selection.index,
            solution,
            barrier,
        }))
    }

    /// Alias for [`Self::draw_platform_point`]
    pub fn move_to_coordinate(
        &mut self,
        x: f32,
        y: f32,
    ) -> Result<PointOutcome, MotionError<P::Error>> {
        self.draw_platform_point(x, y)
    }

    /// Home the joints in the table
    ///
    /// Applies profile velocities, sends each joint to its home position,
    /// waits with the homing barrier and re-seeds the platform accumulator.
    pub fn home(&mut self) -> Result<BarrierOutcome, MotionError<P::Error>> {
        info!("homing {} joints", self.config.joints.len());

        for joint in self.config.joints.iter() {
            self.port
                .set_profile_velocity(joint.id, joint.profile_velocity)
                .map_err(MotionError::Actuator)?;
            self.port
                .set_goal_raw_position(joint.id, joint.home_raw)
                .map_err(MotionError::Actuator)?;
        }

        // Only joints on this machine's bus are polled
        let ids = self.config.joints.ids();
        let outcome = self.wait(JointSet::Some(&ids), true)?;

        self.pose = RobotPose::homed(Self::platform_home_degrees(&self.config));
        info!("homed, platform at {} deg", self.pose.cumulative_platform_degrees());
        Ok(outcome)
    }

    /// Re-seed the platform accumulator from the measured position
    ///
    /// Returns the drift (measured minus logical) in degrees.
    pub fn resync_platform(&mut self) -> Result<f32, MotionError<P::Error>> {
        let raw = self
            .port
            .present_raw_position(JointId::Platform)
            .map_err(MotionError::Actuator)?;

        let logical = self.pose.cumulative_platform_degrees();
        let drift = raw_to_degrees_unbounded(raw) - logical;
        self.pose.platform.seed_raw(raw);

        info!("platform resync: raw={} drift={} deg", raw, drift);
        Ok(drift)
    }

    /// Send a joint to one of its named positions and wait for it
    ///
    /// Moving the polar arm or the platform this way starts a new path:
    /// the next point is chosen as a first move.
    pub fn move_joint(
        &mut self,
        joint: JointId,
        position: NamedPosition,
    ) -> Result<BarrierOutcome, MotionError<P::Error>> {
        let record = self
            .config
            .joints
            .get(joint)
            .ok_or(MotionError::UnknownJoint(joint))?;
        let raw = record
            .position(position)
            .ok_or(MotionError::NoNamedPosition(joint, position))?;
        if !record.accepts(raw) {
            return Err(MotionError::OutOfRange(joint, raw));
        }
        let extended = record.mode == OperatingMode::ExtendedPosition;

        self.port
            .set_goal_raw_position(joint, raw)
            .map_err(MotionError::Actuator)?;
        let outcome = self.wait(JointSet::One(joint), true)?;

        match joint {
            JointId::PolarArm => self.pose.has_moved_once = false,
            JointId::Platform => {
                self.pose.has_moved_once = false;
                if extended {
                    self.pose.platform.seed_raw(raw);
                }
            }
            _ => {}
        }
        Ok(outcome)
    }

    /// Draw a sequence of points
    ///
    /// Unreachable points are counted and skipped; actuator errors,
    /// timeouts and strict confirmation failures stop the trace.
    pub fn trace<I>(&mut self, points: I) -> Result<TraceReport, MotionError<P::Error>>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut report = TraceReport::default();
        for p in points {
            match self.draw_platform_point(p.x, p.y) {
                Ok(PointOutcome::Moved(moved)) => {
                    report.moved = report.moved.saturating_add(1);
                    if moved.barrier == BarrierOutcome::Unconfirmed {
                        report.unconfirmed = report.unconfirmed.saturating_add(1);
                    }
                }
                Ok(PointOutcome::Skipped) => report.skipped = report.skipped.saturating_add(1),
                Err(MotionError::Unreachable) => {
                    report.unreachable = report.unreachable.saturating_add(1)
                }
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }

    /// Draw a streak pattern preset
    ///
    /// Presets that wind the platform resync the accumulator afterwards.
    pub fn run_pattern(
        &mut self,
        pattern: StreakPattern,
    ) -> Result<TraceReport, MotionError<P::Error>> {
        let mut report = TraceReport::default();
        for shape in pattern.shapes() {
            report.merge(self.trace(shape.points())?);
        }
        if pattern.needs_resync() {
            self.resync_platform()?;
        }
        if !report.is_success() {
            warn!("pattern {}: {} unreachable points", pattern, report.unreachable);
        }
        Ok(report)
    }

    /// Run the motion barrier and map its outcome
    fn wait(
        &mut self,
        joints: JointSet<'_>,
        homing: bool,
    ) -> Result<BarrierOutcome, MotionError<P::Error>> {
        let config = if homing {
            self.config.homing_barrier
        } else {
            self.config.point_barrier
        };
        let outcome = wait_for_motion(&mut self.port, &mut self.delay, joints, &config)
            .map_err(MotionError::Actuator)?;

        match outcome {
            BarrierOutcome::Completed => Ok(outcome),
            BarrierOutcome::Unconfirmed if self.config.strict_confirmation => {
                error!("motion not confirmed");
                Err(MotionError::Unconfirmed)
            }
            BarrierOutcome::Unconfirmed => {
                warn!("motion not observed, assuming complete");
                Ok(outcome)
            }
            BarrierOutcome::TimedOut => {
                error!("motion timed out");
                Err(MotionError::Timeout)
            }
        }
    }

    fn platform_home_degrees(config: &MachineConfig) -> f32 {
        config
            .joints
            .get(JointId::Platform)
            .map(|j| raw_to_degrees_unbounded(j.home_raw))
            .unwrap_or(config.geometry.platform_home_offset_degrees)
    }
}
