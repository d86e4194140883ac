//! 2-D Points.

use crate::base::*;

/// A 2-D point containing `Float` coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point2f {
    /// X-coordinate.
    pub x: Float,

    /// Y-coordinate.
    pub y: Float,
}

impl Point2f {
    /// Zero point.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a new 2-D point.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    pub fn new(x: Float, y: Float) -> Self {
        Self { x, y }
    }
}
