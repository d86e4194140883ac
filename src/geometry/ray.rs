//! Rays.

use super::{Point3f, Vector3f};
use crate::base::*;

/// A semi-infinite line with an origin and a direction.
#[derive(Copy, Clone, Debug)]
pub struct Ray {
    /// Origin.
    pub o: Point3f,

    /// Direction.
    pub d: Vector3f,

    /// Maximum extent of the ray.
    pub t_max: Float,

    /// Time when the ray was cast.
    pub time: Float,
}

impl Ray {
    /// Creates a new ray.
    ///
    /// * `o`     - Origin.
    /// * `d`     - Direction.
    /// * `t_max` - Maximum extent of the ray.
    /// * `time`  - Time when the ray was cast.
    pub fn new(o: Point3f, d: Vector3f, t_max: Float, time: Float) -> Self {
        Self { o, d, t_max, time }
    }

    /// Returns the point along the ray at parameter `t`.
    ///
    /// * `t` - Parameter.
    pub fn at(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }
}

impl Default for Ray {
    /// Returns a degenerate ray at the origin with unbounded extent.
    fn default() -> Self {
        Self::new(Point3f::ZERO, Vector3f::ZERO, INFINITY, 0.0)
    }
}
