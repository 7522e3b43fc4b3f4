//! Simulated servo bus
//!
//! A [`SimBus`] holds the state of every joint behind a `RefCell`. The
//! [`SimPort`] handle implements `ActuatorPort` and the [`SimDelay`]
//! handle implements `DelayNs`; every delay advances the shared clock and
//! moves the joints, so a planner driven with both sees realistic motion
//! without real time passing.

pub mod bus;
pub mod clock;

pub use bus::{Fault, ServoState, SimBus, SimError, SimPort};
pub use clock::SimDelay;
