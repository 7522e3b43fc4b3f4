//! Degree / raw unit conversion
//!
//! Servos report 4096 raw ticks per revolution. Single-turn joints use
//! the 12-bit range 0-4095; extended joints use an unbounded signed
//! count on the same scale.

/// Raw ticks per revolution
pub const RAW_PER_REV: i32 = 4096;

/// Mask for a single-turn raw position
pub const RAW_MASK: u16 = 0x0FFF;

/// Degrees per raw tick (about 0.088)
pub const DEGREES_PER_RAW: f32 = 360.0 / RAW_PER_REV as f32;

/// Convert degrees to a single-turn raw position
///
/// The angle is wrapped into [0, 360) first, so the result is always in
/// 0-4095. The scaled value is truncated, which costs up to one tick.
pub fn degrees_to_raw(degrees: f32) -> u16 {
    let mut wrapped = libm::fmodf(degrees, 360.0);
    if wrapped < 0.0 {
        wrapped += 360.0;
    }
    ((wrapped * RAW_PER_REV as f32 / 360.0) as u32 as u16) & RAW_MASK
}

/// Convert a single-turn raw position to degrees in [0, 360)
pub fn raw_to_degrees(raw: u16) -> f32 {
    (raw & RAW_MASK) as f32 * DEGREES_PER_RAW
}

/// Convert an unbounded degree count to an extended raw position (rounded)
pub fn degrees_to_raw_unbounded(degrees: f32) -> i32 {
    libm::roundf(degrees / 360.0 * RAW_PER_REV as f32) as i32
}

/// Convert an extended raw position to unbounded degrees
pub fn raw_to_degrees_unbounded(raw: i32) -> f32 {
    raw as f32 * DEGREES_PER_RAW
}

/// Wrap a degree delta into (-180, 180]
pub fn wrap_degrees_delta(delta: f32) -> f32 {
    if !delta.is_finite() {
        return delta;
    }
    let delta = libm::fmodf(delta, 360.0);
    if delta > 180.0 {
        delta - 360.0
    } else if delta <= -180.0 {
        delta + 360.0
    } else {
        delta
    }
}
