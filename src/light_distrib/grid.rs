//! Voxel Grid.

use crate::base::*;
use crate::geometry::*;

/// Voxel coordinates are packed into a u64 for hash table lookups; 20 bits
/// are allocated to each coordinate. `INVALID_PACKED_POS` is an impossible
/// packed coordinate value, which we use to represent unclaimed hash
/// entries.
pub const INVALID_PACKED_POS: u64 = 0xffff_ffff_ffff_ffff;

/// A fixed uniform voxel grid imposed over the scene bounds. The resolution
/// is chosen so that the widest scene bound dimension has `max_voxels`
/// voxels and the other dimensions have a number of voxels that keeps them
/// roughly cube shaped.
#[derive(Clone, Debug)]
pub struct VoxelGrid {
    world_bound: Bounds3f,
    n_voxels: [usize; 3],
}

impl VoxelGrid {
    /// Creates a new voxel grid over the given bounds.
    ///
    /// * `world_bound` - The scene bounds.
    /// * `max_voxels`  - Number of voxels along the widest dimension.
    pub fn new(world_bound: Bounds3f, max_voxels: usize) -> Self {
        let diag = world_bound.diagonal();
        let bmax = diag[world_bound.maximum_extent()];
        let mut n_voxels = [0_usize; 3];
        for i in 0..3 {
            n_voxels[i] = max(1, (diag[i] / bmax * max_voxels as Float).round() as usize);

            // The packed key allocates 20 bits per coordinate value. It's
            // fairly hard to imagine that this would ever be a problem.
            assert!(n_voxels[i] < (1 << 20));
        }
        Self {
            world_bound,
            n_voxels,
        }
    }

    /// Returns the number of voxels per axis.
    pub fn resolution(&self) -> [usize; 3] {
        self.n_voxels
    }

    /// Returns the total number of voxels in the grid.
    pub fn voxel_count(&self) -> usize {
        self.n_voxels.iter().product()
    }

    /// Returns the position of a point relative to the grid bounds, with
    /// components in [0, 1] for points inside them.
    ///
    /// * `p` - The point.
    pub fn offset(&self, p: &Point3f) -> Vector3f {
        self.world_bound.offset(p)
    }

    /// Returns the integer voxel coordinates for the given point.
    ///
    /// * `p` - The point.
    pub fn voxel_for(&self, p: &Point3f) -> Point3i {
        let offset = self.world_bound.offset(p);
        let mut pi = Point3i::ZERO;
        for i in 0..3 {
            // The clamp should almost never be necessary, but is there to be
            // robust to computed intersection points being slightly outside
            // the scene bounds due to floating-point roundoff error.
            pi[i] = clamp(
                (offset[i] * self.n_voxels[i] as Float) as Int,
                0,
                self.n_voxels[i] as Int - 1,
            );
        }
        pi
    }

    /// Returns true when the integer coordinates address a voxel of the
    /// grid.
    ///
    /// * `pi` - Integer voxel coordinates.
    pub fn contains_voxel(&self, pi: &Point3i) -> bool {
        (0..3).all(|i| pi[i] >= 0 && pi[i] < self.n_voxels[i] as Int)
    }

    /// Returns the world-space bounding box of the voxel with the given
    /// integer coordinates.
    ///
    /// * `pi` - Integer voxel coordinates.
    pub fn voxel_bounds(&self, pi: &Point3i) -> Bounds3f {
        let p0 = Point3f::new(
            pi[0] as Float / self.n_voxels[0] as Float,
            pi[1] as Float / self.n_voxels[1] as Float,
            pi[2] as Float / self.n_voxels[2] as Float,
        );
        let p1 = Point3f::new(
            (pi[0] + 1) as Float / self.n_voxels[0] as Float,
            (pi[1] + 1) as Float / self.n_voxels[1] as Float,
            (pi[2] + 1) as Float / self.n_voxels[2] as Float,
        );
        Bounds3f::new(self.world_bound.lerp(&p0), self.world_bound.lerp(&p1))
    }

    /// Packs the 3D integer voxel coordinates into a single 64-bit value.
    ///
    /// * `pi` - Integer voxel coordinates.
    pub fn pack(&self, pi: &Point3i) -> u64 {
        debug_assert!(self.contains_voxel(pi));
        let packed_pos = ((pi[0] as u64) << 40) | ((pi[1] as u64) << 20) | pi[2] as u64;
        debug_assert_ne!(packed_pos, INVALID_PACKED_POS);
        packed_pos
    }

    /// Computes a hash table offset from the packed voxel coordinates. We
    /// could just take the packed value mod the table size, but since it
    /// isn't necessarily well distributed on its own, it's worthwhile to do
    /// a little work to make sure that its bit values are individually
    /// fairly random. For details of and motivation for the following, see:
    /// http://zimbry.blogspot.ch/2011/09/better-bit-mixing-improving-on.html
    ///
    /// * `packed_pos` - Packed voxel coordinates.
    /// * `table_size` - Size of the hash table.
    pub fn hash(packed_pos: u64, table_size: usize) -> usize {
        let mut hash = packed_pos;
        hash ^= hash >> 31;
        hash = hash.wrapping_mul(0x7fb5d329728ea185);
        hash ^= hash >> 27;
        hash = hash.wrapping_mul(0x81dadef4bc2dd44d);
        hash ^= hash >> 33;
        (hash % table_size as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn unit_grid(max_voxels: usize) -> VoxelGrid {
        VoxelGrid::new(
            Bounds3f::new(Point3f::ZERO, Point3f::new(1.0, 1.0, 1.0)),
            max_voxels,
        )
    }

    #[test]
    fn cubic_bounds_get_equal_resolution() {
        let grid = unit_grid(4);
        assert_eq!(grid.resolution(), [4, 4, 4]);
        assert_eq!(grid.voxel_count(), 64);
    }

    #[test]
    fn flat_bounds_get_proportional_resolution() {
        let grid = VoxelGrid::new(
            Bounds3f::new(Point3f::ZERO, Point3f::new(4.0, 2.0, 1.0)),
            8,
        );
        assert_eq!(grid.resolution(), [8, 4, 2]);
    }

    #[test]
    fn packed_keys_are_unique_per_voxel() {
        let grid = unit_grid(4);
        let mut keys = HashSet::new();
        for x in 0..4 {
            for y in 0..4 {
                for z in 0..4 {
                    let key = grid.pack(&Point3i::new(x, y, z));
                    assert_ne!(key, INVALID_PACKED_POS);
                    assert!(keys.insert(key));
                }
            }
        }
        assert_eq!(keys.len(), 64);
    }

    #[test]
    fn points_outside_the_bounds_clamp_to_edge_voxels() {
        let grid = unit_grid(4);
        assert_eq!(
            grid.voxel_for(&Point3f::new(-0.001, 0.5, 1.001)),
            Point3i::new(0, 2, 3)
        );
    }

    #[test]
    fn voxel_bounds_tile_the_grid_bounds() {
        let grid = unit_grid(2);
        let b = grid.voxel_bounds(&Point3i::new(1, 0, 1));
        assert_eq!(b.p_min, Point3f::new(0.5, 0.0, 0.5));
        assert_eq!(b.p_max, Point3f::new(1.0, 0.5, 1.0));
    }

    #[test]
    fn hash_stays_within_the_table() {
        let grid = unit_grid(8);
        let table_size = 4 * grid.voxel_count();
        for x in 0..8 {
            for y in 0..8 {
                for z in 0..8 {
                    let h = VoxelGrid::hash(grid.pack(&Point3i::new(x, y, z)), table_size);
                    assert!(h < table_size);
                }
            }
        }
    }
}
