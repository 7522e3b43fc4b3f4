//! Cartesian points in millimetres

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in millimetres
///
/// Platform points are relative to the platform centre; intersection
/// points returned by the solver are relative to the lever pivot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    /// X coordinate (mm)
    pub x: f32,
    /// Y coordinate (mm)
    pub y: f32,
}

impl Point {
    /// The origin
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    /// Create a point
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Create a point from polar coordinates (radius in mm, angle in radians)
    pub fn from_polar(radius: f32, angle: f32) -> Self {
        Self {
            x: radius * libm::cosf(angle),
            y: radius * libm::sinf(angle),
        }
    }

    /// Distance from the origin
    pub fn norm(&self) -> f32 {
        libm::sqrtf(self.x * self.x + self.y * self.y)
    }

    /// Angle from the +X axis in radians
    pub fn angle(&self) -> f32 {
        libm::atan2f(self.y, self.x)
    }

    /// Multiply both coordinates by `factor`
    pub fn scale(&self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Scale the point down onto a circle of `radius` if it lies outside
    pub fn clamp_to_radius(&self, radius: f32) -> Self {
        let r = self.norm();
        if r > radius {
            self.scale(radius / r)
        } else {
            *self
        }
    }
}

impl core::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl core::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}
