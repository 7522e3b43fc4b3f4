//! Streak pattern presets
//!
//! The numbered streak patterns accepted by the machine. Unknown ids
//! fall back to a short centre line.

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::shapes::Shape;
use crate::kinematics::Point;

/// Maximum shapes in one preset
pub const MAX_PATTERN_SHAPES: usize = 4;

/// Streak pattern preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StreakPattern {
    /// Pattern 0: line across the dish
    CenterLine,
    /// Pattern 1: two-turn spiral
    Spiral,
    /// Pattern 2: square through all four quadrants
    QuadrantSquare,
    /// Pattern 3: zigzag across the dish
    Zigzag,
    /// Any other id: short centre line
    ShortLine,
}

impl StreakPattern {
    /// Map a pattern id to a preset
    pub fn from_id(id: u8) -> Self {
        match id {
            0 => StreakPattern::CenterLine,
            1 => StreakPattern::Spiral,
            2 => StreakPattern::QuadrantSquare,
            3 => StreakPattern::Zigzag,
            _ => StreakPattern::ShortLine,
        }
    }

    /// Shapes drawn by this preset, in order
    pub fn shapes(&self) -> Vec<Shape, MAX_PATTERN_SHAPES> {
        let mut shapes = Vec::new();
        match self {
            StreakPattern::CenterLine => {
                let _ = shapes.push(Shape::Line {
                    from: Point::new(-40.0, 0.0),
                    to: Point::new(40.0, 0.0),
                    points: 60,
                });
            }
            StreakPattern::Spiral => {
                let _ = shapes.push(Shape::Spiral {
                    max_radius: 20.0,
                    revolutions: 2.0,
                    points: 50,
                });
            }
            StreakPattern::QuadrantSquare => {
                let corners = [
                    Point::new(-25.0, -25.0),
                    Point::new(25.0, -25.0),
                    Point::new(25.0, 25.0),
                    Point::new(-25.0, 25.0),
                ];
                for i in 0..corners.len() {
                    let _ = shapes.push(Shape::Line {
                        from: corners[i],
                        to: corners[(i + 1) % corners.len()],
                        points: 20,
                    });
                }
            }
            StreakPattern::Zigzag => {
                let _ = shapes.push(Shape::Zigzag {
                    start: Point::new(-30.0, -30.0),
                    step: 10.0,
                    amplitude: 30.0,
                    steps: 6,
                });
            }
            StreakPattern::ShortLine => {
                let _ = shapes.push(Shape::Line {
                    from: Point::new(-30.0, 0.0),
                    to: Point::new(30.0, 0.0),
                    points: 30,
                });
            }
        }
        shapes
    }

    /// Every point of the preset, shape after shape
    pub fn points(&self) -> impl Iterator<Item = Point> {
        self.shapes().into_iter().flat_map(Shape::points)
    }

    /// Check if the platform accumulator should be resynced afterwards
    ///
    /// The spiral winds the platform through whole turns.
    pub fn needs_resync(&self) -> bool {
        matches!(self, StreakPattern::Spiral)
    }
}
