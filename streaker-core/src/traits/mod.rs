//! Hardware abstraction traits
//!
//! These traits define the interface between the motion core and the
//! servo bus implementation.

pub mod actuator;

pub use actuator::{ActuatorPort, JointSet};
