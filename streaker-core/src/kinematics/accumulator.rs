//! Extended platform position accumulator
//!
//! The platform servo runs in extended (multi-turn) mode. Targets arrive as
//! periodic degrees; each one is turned into the shortest signed step from
//! the previous target and summed, so the raw command never jumps across
//! the 0/360 seam however many turns have piled up.

use super::units::{degrees_to_raw_unbounded, raw_to_degrees_unbounded, wrap_degrees_delta};

/// Unbounded platform position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExtendedAccumulator {
    /// Accumulated degrees sent to the platform
    cumulative_degrees: f32,
    /// Last target fed in, used for the next delta
    last_target_degrees: f32,
}

impl ExtendedAccumulator {
    /// Create an accumulator at zero
    pub const fn new() -> Self {
        Self {
            cumulative_degrees: 0.0,
            last_target_degrees: 0.0,
        }
    }

    /// Create an accumulator seeded at `degrees`
    pub const fn seeded(degrees: f32) -> Self {
        Self {
            cumulative_degrees: degrees,
            last_target_degrees: degrees,
        }
    }

    /// Re-seed both the cumulative and the last target
    pub fn seed(&mut self, degrees: f32) {
        self.cumulative_degrees = degrees;
        self.last_target_degrees = degrees;
    }

    /// Re-seed from a measured extended raw position
    ///
    /// The last target keeps its phase so the next delta is still taken
    /// against the periodic target, not the measured count.
    pub fn seed_raw(&mut self, raw: i32) {
        let degrees = raw_to_degrees_unbounded(raw);
        self.last_target_degrees += wrap_degrees_delta(degrees - self.last_target_degrees);
        self.cumulative_degrees = degrees;
    }

    /// Feed a new target and return the extended raw command
    pub fn advance(&mut self, target_degrees: f32) -> i32 {
        let delta = wrap_degrees_delta(target_degrees - self.last_target_degrees);
        self.cumulative_degrees += delta;
        self.last_target_degrees = target_degrees;
        self.raw()
    }

    /// Extended raw position for the current cumulative degrees
    pub fn raw(&self) -> i32 {
        degrees_to_raw_unbounded(self.cumulative_degrees)
    }

    /// Accumulated degrees
    pub fn cumulative_degrees(&self) -> f32 {
        self.cumulative_degrees
    }

    /// Last target fed to the accumulator
    pub fn last_target_degrees(&self) -> f32 {
        self.last_target_degrees
    }
}
