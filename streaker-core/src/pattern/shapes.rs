//! Parametric shapes

use core::f32::consts::PI;

use crate::kinematics::Point;

/// A parametric shape sampled at a fixed number of points
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Shape {
    /// Straight line, both ends included
    Line {
        /// Start point
        from: Point,
        /// End point
        to: Point,
        /// Points including both ends (at least 2)
        points: u16,
    },
    /// Circle around the platform centre, first point on +X
    Circle {
        /// Radius (mm)
        radius: f32,
        /// Points per revolution
        points: u16,
    },
    /// Spiral from the centre outwards
    ///
    /// The parameter sweeps 0 to -1, so the spiral turns clockwise and
    /// ends on the -X side.
    Spiral {
        /// Final radius (mm)
        max_radius: f32,
        /// Number of turns
        revolutions: f32,
        /// Points including both ends (at least 2)
        points: u16,
    },
    /// Circle with a sinusoidal radius
    Flower {
        /// Base radius (mm)
        radius: f32,
        /// Radius swing (mm)
        amplitude: f32,
        /// Petal count
        petals: u16,
        /// Points per revolution
        points: u16,
    },
    /// Zigzag between two horizontal rails
    ///
    /// Starts at `start`, then each step moves `step` in X and jumps to
    /// the opposite rail, beginning with `+amplitude`.
    Zigzag {
        /// First point
        start: Point,
        /// X advance per step (mm)
        step: f32,
        /// Rail Y value (mm)
        amplitude: f32,
        /// Steps after the first point
        steps: u16,
    },
}

impl Shape {
    /// Number of points the shape yields
    pub fn len(&self) -> usize {
        match *self {
            Shape::Line { points, .. } | Shape::Spiral { points, .. } => points.max(2) as usize,
            Shape::Circle { points, .. } | Shape::Flower { points, .. } => points as usize,
            Shape::Zigzag { steps, .. } => steps as usize + 1,
        }
    }

    /// Check if the shape yields no points
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `i`-th point
    pub fn point(&self, i: usize) -> Point {
        match *self {
            Shape::Line { from, to, .. } => {
                let t = i as f32 / (self.len() - 1) as f32;
                from + (to - from).scale(t)
            }
            Shape::Circle { radius, points } => {
                let angle = 2.0 * PI * i as f32 / points as f32;
                Point::from_polar(radius, angle)
            }
            Shape::Spiral {
                max_radius,
                revolutions,
                ..
            } => {
                let t = -(i as f32 / (self.len() - 1) as f32);
                let angle = t * revolutions * 2.0 * PI;
                Point::from_polar(t * max_radius, angle)
            }
            Shape::Flower {
                radius,
                amplitude,
                petals,
                points,
            } => {
                let angle = 2.0 * PI * i as f32 / points as f32;
                let r = radius + amplitude * libm::sinf(petals as f32 * angle);
                Point::from_polar(r, angle)
            }
            Shape::Zigzag {
                start,
                step,
                amplitude,
                ..
            } => {
                if i == 0 {
                    start
                } else {
                    let y = if i % 2 == 1 { amplitude } else { -amplitude };
                    Point::new(start.x + step * i as f32, y)
                }
            }
        }
    }

    /// Iterate over the points
    pub fn points(self) -> ShapePoints {
        ShapePoints {
            len: self.len(),
            shape: self,
            index: 0,
        }
    }
}

/// Iterator over a shape's points
#[derive(Debug, Clone)]
pub struct ShapePoints {
    shape: Shape,
    index: usize,
    len: usize,
}

impl Iterator for ShapePoints {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.index >= self.len {
            return None;
        }
        let p = self.shape.point(self.index);
        self.index += 1;
        Some(p)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ShapePoints {}

/// Line from `from` to `to`; fewer than 2 points are raised to 2
pub fn line(from: Point, to: Point, points: u16) -> ShapePoints {
    Shape::Line { from, to, points }.points()
}

/// Circle of `radius` around the platform centre
pub fn circle(radius: f32, points: u16) -> ShapePoints {
    Shape::Circle { radius, points }.points()
}

/// Spiral out to `max_radius` over `revolutions` turns
pub fn spiral(max_radius: f32, revolutions: f32, points: u16) -> ShapePoints {
    Shape::Spiral {
        max_radius,
        revolutions,
        points,
    }
    .points()
}

/// Flower with `petals` lobes of `amplitude` around `radius`
pub fn flower(radius: f32, amplitude: f32, petals: u16, points: u16) -> ShapePoints {
    Shape::Flower {
        radius,
        amplitude,
        petals,
        points,
    }
    .points()
}

/// Zigzag starting at `start`
pub fn zigzag(start: Point, step: f32, amplitude: f32, steps: u16) -> ShapePoints {
    Shape::Zigzag {
        start,
        step,
        amplitude,
        steps,
    }
    .points()
}
