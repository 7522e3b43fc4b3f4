//! Link geometry
//!
//! Fixed mechanical layout of the lever arm and the platform, plus the
//! calibration offsets between the kinematic zero and each servo's raw zero.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::kinematics::{raw_to_degrees_unbounded, Point};

/// Radius below which a platform point is treated as the rotation centre
pub const DEFAULT_SINGULARITY_RADIUS_MM: f32 = 1.0;

/// Geometry errors found during validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GeometryError {
    /// Lever length is zero, negative or not finite
    InvalidLeverLength,
    /// Platform radius is zero, negative or not finite
    InvalidPlatformRadius,
    /// Platform centre coincides with the lever pivot
    CenterAtPivot,
    /// Singularity radius is negative or not smaller than the platform
    InvalidSingularityRadius,
    /// A calibration offset is not finite
    InvalidHomeOffset,
}

/// Immutable lever/platform geometry
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkGeometry {
    /// Lever length from pivot to applicator (mm)
    pub lever_length: f32,
    /// Platform centre relative to the lever pivot (mm)
    pub platform_center: Point,
    /// Maximum reachable radius on the platform (mm)
    pub platform_radius: f32,
    /// Lever calibration offset (degrees added to the kinematic angle)
    pub lever_home_offset_degrees: f32,
    /// Platform calibration offset (degrees added to the kinematic angle)
    pub platform_home_offset_degrees: f32,
    /// Points closer than this to the platform centre are skipped (mm)
    #[cfg_attr(feature = "serde", serde(default = "default_singularity_radius"))]
    pub singularity_radius: f32,
}

#[cfg(feature = "serde")]
fn default_singularity_radius() -> f32 {
    DEFAULT_SINGULARITY_RADIUS_MM
}

impl Default for LinkGeometry {
    fn default() -> Self {
        Self {
            lever_length: 98.995,
            platform_center: Point::new(70.0, 70.0),
            platform_radius: 45.0,
            // 0.51 deg and raw 1238 are the bench calibration
            lever_home_offset_degrees: 0.51,
            platform_home_offset_degrees: raw_to_degrees_unbounded(1238),
            singularity_radius: DEFAULT_SINGULARITY_RADIUS_MM,
        }
    }
}

impl LinkGeometry {
    /// Create geometry without calibration offsets
    pub fn new(lever_length: f32, platform_center: Point, platform_radius: f32) -> Self {
        Self {
            lever_length,
            platform_center,
            platform_radius,
            lever_home_offset_degrees: 0.0,
            platform_home_offset_degrees: 0.0,
            singularity_radius: DEFAULT_SINGULARITY_RADIUS_MM,
        }
    }

    /// Set the calibration offsets
    pub fn with_home_offsets(mut self, lever_degrees: f32, platform_degrees: f32) -> Self {
        self.lever_home_offset_degrees = lever_degrees;
        self.platform_home_offset_degrees = platform_degrees;
        self
    }

    /// Distance between the lever pivot and the platform centre (mm)
    pub fn center_distance(&self) -> f32 {
        self.platform_center.norm()
    }

    /// Check that the geometry can be solved at all
    pub fn validate(&self) -> Result<(), GeometryError> {
        if !(self.lever_length.is_finite() && self.lever_length > 0.0) {
            return Err(GeometryError::InvalidLeverLength);
        }
        if !(self.platform_radius.is_finite() && self.platform_radius > 0.0) {
            return Err(GeometryError::InvalidPlatformRadius);
        }
        if self.center_distance() <= f32::EPSILON {
            return Err(GeometryError::CenterAtPivot);
        }
        if !(self.singularity_radius >= 0.0 && self.singularity_radius < self.platform_radius) {
            return Err(GeometryError::InvalidSingularityRadius);
        }
        if !(self.lever_home_offset_degrees.is_finite()
            && self.platform_home_offset_degrees.is_finite())
        {
            return Err(GeometryError::InvalidHomeOffset);
        }
        Ok(())
    }

    /// Band of platform radii the lever can reach
    ///
    /// This is `[|L - d|, L + d]` clipped to `platform_radius`, or `None`
    /// when the band misses the platform entirely.
    pub fn reachable_radii(&self) -> Option<(f32, f32)> {
        let d = self.center_distance();
        let min = libm::fabsf(self.lever_length - d);
        let max = (self.lever_length + d).min(self.platform_radius);
        if min > max {
            None
        } else {
            Some((min, max))
        }
    }
}
