//! Board-agnostic motion core for the Petri dish streaker firmware
//!
//! This crate contains the logic that turns a platform-local point into
//! servo commands without depending on a particular servo bus:
//!
//! - Actuator capability trait (goal position, moving flag, present position)
//! - Degree/raw unit conversion for 12-bit servos
//! - Two-circle inverse kinematics for the lever arm over the platform
//! - Minimum-travel branch selection and the extended platform accumulator
//! - Motion barrier state machine
//! - Point planner and pattern point generators
//! - Configuration type definitions
//!
//! The `serde` feature adds postcard encoding of [`config::MachineConfig`]
//! and `toml` adds text configuration. Both are enabled for this crate's
//! own tests.

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod kinematics;
pub mod motion;
pub mod pattern;
pub mod traits;
