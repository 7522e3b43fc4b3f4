//! Point-to-motion orchestration
//!
//! The planner owns the robot pose, runs the kinematics for each point,
//! issues the lever and platform goals and waits on the motion barrier.

pub mod barrier;
pub mod planner;
pub mod pose;

pub use barrier::{wait_for_motion, BarrierAction, BarrierOutcome, BarrierState, MotionBarrier};
pub use planner::{MotionError, MoveReport, PointOutcome, PolarPlanner, TraceReport};
pub use pose::RobotPose;
