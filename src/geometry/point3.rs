//! 3-D Points.

use super::Vector3f;
use crate::base::*;
use std::ops::{Add, Index, Sub};

/// A 3-D point containing `Float` coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point3f {
    /// X-coordinate.
    pub x: Float,

    /// Y-coordinate.
    pub y: Float,

    /// Z-coordinate.
    pub z: Float,
}

impl Point3f {
    /// Origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Creates a new 3-D point.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    /// * `z` - Z-coordinate.
    pub fn new(x: Float, y: Float, z: Float) -> Self {
        Self { x, y, z }
    }

    /// Returns the squared distance to another point.
    ///
    /// * `other` - The other point.
    pub fn distance_squared(&self, other: &Self) -> Float {
        (*self - *other).length_squared()
    }
}

impl Add<Vector3f> for Point3f {
    type Output = Self;

    /// Offsets the point by the given vector.
    fn add(self, v: Vector3f) -> Self {
        Self::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }
}

impl Sub for Point3f {
    type Output = Vector3f;

    /// Returns the vector from `other` to this point.
    fn sub(self, other: Self) -> Vector3f {
        Vector3f::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Index<usize> for Point3f {
    type Output = Float;

    /// Index the point by axis: 0 = x, 1 = y, 2 = z.
    fn index(&self, axis: usize) -> &Float {
        match axis {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Invalid axis for Point3f: {}", axis),
        }
    }
}

/// A 3-D point containing `Int` coordinates, used for voxel addressing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point3i {
    /// X-coordinate.
    pub x: Int,

    /// Y-coordinate.
    pub y: Int,

    /// Z-coordinate.
    pub z: Int,
}

impl Point3i {
    /// Origin.
    pub const ZERO: Self = Self { x: 0, y: 0, z: 0 };

    /// Creates a new 3-D integer point.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    /// * `z` - Z-coordinate.
    pub fn new(x: Int, y: Int, z: Int) -> Self {
        Self { x, y, z }
    }
}

impl Index<usize> for Point3i {
    type Output = Int;

    /// Index the point by axis: 0 = x, 1 = y, 2 = z.
    fn index(&self, axis: usize) -> &Int {
        match axis {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Invalid axis for Point3i: {}", axis),
        }
    }
}

impl std::ops::IndexMut<usize> for Point3i {
    /// Mutably index the point by axis: 0 = x, 1 = y, 2 = z.
    fn index_mut(&mut self, axis: usize) -> &mut Int {
        match axis {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("Invalid axis for Point3i: {}", axis),
        }
    }
}

impl std::fmt::Display for Point3i {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
