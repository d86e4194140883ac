//! 3-D Axis Aligned Bounding Boxes.

use super::{Point3f, Vector3f};
use crate::base::*;

/// A 3-D axis aligned bounding box containing `Float` points.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds3f {
    /// Minimum bounds.
    pub p_min: Point3f,

    /// Maximum bounds.
    pub p_max: Point3f,
}

impl Bounds3f {
    /// Creates a new 3-D bounding box from 2 points. The minimum and maximum
    /// bounds are used for each coordinate axis.
    ///
    /// * `p1` - First point.
    /// * `p2` - Second point.
    pub fn new(p1: Point3f, p2: Point3f) -> Self {
        Self {
            p_min: Point3f::new(min(p1.x, p2.x), min(p1.y, p2.y), min(p1.z, p2.z)),
            p_max: Point3f::new(max(p1.x, p2.x), max(p1.y, p2.y), max(p1.z, p2.z)),
        }
    }

    /// Returns an empty box that can be grown with `union()`.
    pub fn empty() -> Self {
        Self {
            p_min: Point3f::new(Float::MAX, Float::MAX, Float::MAX),
            p_max: Point3f::new(Float::MIN, Float::MIN, Float::MIN),
        }
    }

    /// Returns the smallest box containing this box and the given point.
    ///
    /// * `p` - The point.
    pub fn union_point(&self, p: &Point3f) -> Self {
        Self {
            p_min: Point3f::new(
                min(self.p_min.x, p.x),
                min(self.p_min.y, p.y),
                min(self.p_min.z, p.z),
            ),
            p_max: Point3f::new(
                max(self.p_max.x, p.x),
                max(self.p_max.y, p.y),
                max(self.p_max.z, p.z),
            ),
        }
    }

    /// Returns the vector along the box diagonal from the minimum to the
    /// maximum point.
    pub fn diagonal(&self) -> Vector3f {
        self.p_max - self.p_min
    }

    /// Returns the axis index of the longest box dimension.
    pub fn maximum_extent(&self) -> usize {
        self.diagonal().max_dimension()
    }

    /// Linearly interpolates between the box corners by the given amount in
    /// each dimension.
    ///
    /// * `t` - Interpolation parameter per axis.
    pub fn lerp(&self, t: &Point3f) -> Point3f {
        Point3f::new(
            lerp(t.x, self.p_min.x, self.p_max.x),
            lerp(t.y, self.p_min.y, self.p_max.y),
            lerp(t.z, self.p_min.z, self.p_max.z),
        )
    }

    /// Returns the position of a point relative to the box corners, where
    /// the minimum corner maps to (0, 0, 0) and the maximum to (1, 1, 1).
    ///
    /// * `p` - The point.
    pub fn offset(&self, p: &Point3f) -> Vector3f {
        let mut o = *p - self.p_min;
        if self.p_max.x > self.p_min.x {
            o.x /= self.p_max.x - self.p_min.x;
        }
        if self.p_max.y > self.p_min.y {
            o.y /= self.p_max.y - self.p_min.y;
        }
        if self.p_max.z > self.p_min.z {
            o.z /= self.p_max.z - self.p_min.z;
        }
        o
    }
}

impl std::fmt::Display for Bounds3f {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[({}, {}, {}) - ({}, {}, {})]",
            self.p_min.x, self.p_min.y, self.p_min.z, self.p_max.x, self.p_max.y, self.p_max.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_maps_corners_to_unit_cube() {
        let b = Bounds3f::new(Point3f::new(-1.0, 0.0, 2.0), Point3f::new(1.0, 4.0, 6.0));
        let o = b.offset(&b.p_min);
        assert_eq!((o.x, o.y, o.z), (0.0, 0.0, 0.0));
        let o = b.offset(&b.p_max);
        assert_eq!((o.x, o.y, o.z), (1.0, 1.0, 1.0));
    }

    #[test]
    fn lerp_is_inverse_of_offset() {
        let b = Bounds3f::new(Point3f::new(0.0, 0.0, 0.0), Point3f::new(2.0, 2.0, 2.0));
        let p = b.lerp(&Point3f::new(0.25, 0.5, 0.75));
        assert_eq!(p, Point3f::new(0.5, 1.0, 1.5));
    }
}
