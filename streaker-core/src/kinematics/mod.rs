//! Lever/platform kinematics
//!
//! Pure computation: unit conversion, the two-circle solver, branch
//! selection and the extended platform accumulator. Nothing here talks
//! to an actuator.

pub mod accumulator;
pub mod point;
pub mod selector;
pub mod solver;
pub mod units;

pub use accumulator::ExtendedAccumulator;
pub use point::Point;
pub use selector::{select, Selection};
pub use solver::{normalize_angle, solve, IkSolution, JointSolution, SolveError};
pub use units::*;
