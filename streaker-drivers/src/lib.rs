//! Actuator implementations for the streaker motion core
//!
//! This crate provides concrete implementations of the traits defined
//! in streaker-core:
//!
//! - Simulated servo bus (joints travel toward their goal at the profile
//!   velocity, with fault injection)
//! - Simulated delay source that advances the bus clock

#![no_std]
#![deny(unsafe_code)]

pub mod sim;
