//! Pattern point generators
//!
//! Shapes are pure point sequences in platform coordinates. They never
//! touch the actuators; the planner's `trace` draws them.

pub mod shapes;
pub mod streak;

pub use shapes::{circle, flower, line, spiral, zigzag, Shape, ShapePoints};
pub use streak::StreakPattern;
