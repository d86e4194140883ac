//! Point KD Tree.

use crate::base::*;
use crate::geometry::*;
use std::collections::BinaryHeap;

/// A node in the flattened tree. Interior nodes store the split plane and
/// the offset of their right child; the left child always follows the node
/// directly. Leaf nodes own a contiguous range of `indices`.
#[derive(Clone, Debug)]
enum KdNode {
    Interior {
        /// Split axis: 0 = x, 1 = y, 2 = z.
        axis: usize,

        /// Split position along the axis.
        split: Float,

        /// Offset of the right child node.
        right: usize,
    },
    Leaf {
        /// First entry in the tree's index list.
        first: usize,

        /// Number of points in the leaf.
        count: usize,
    },
}

/// A candidate point during a k-nearest-neighbour search, ordered by
/// squared distance so a max-heap keeps the current k best.
#[derive(Copy, Clone)]
struct Candidate {
    dist_squared: Float,
    index: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.dist_squared
            .total_cmp(&other.dist_squared)
            .then(self.index.cmp(&other.index))
    }
}

/// A static kd-tree over a point cloud supporting k-nearest-neighbour and
/// radius queries, built once after the photon preprocess. The maximum leaf
/// size is configurable because the cluster-based distributions treat the
/// leaves themselves as photon clusters.
pub struct PointKdTree {
    /// The indexed points.
    points: Vec<Point3f>,

    /// Flattened tree nodes; the root is node 0.
    nodes: Vec<KdNode>,

    /// Point indices, grouped into contiguous ranges per leaf.
    indices: Vec<usize>,
}

impl PointKdTree {
    /// Builds a tree over the given points by recursive median splits along
    /// the widest axis.
    ///
    /// * `points`        - The points to index.
    /// * `max_leaf_size` - Maximum number of points per leaf.
    pub fn new(points: Vec<Point3f>, max_leaf_size: usize) -> Self {
        let max_leaf_size = max(max_leaf_size, 1);
        let mut indices: Vec<usize> = (0..points.len()).collect();
        let mut nodes = Vec::new();
        if !points.is_empty() {
            build_node(&points, &mut nodes, &mut indices, 0, max_leaf_size);
        }
        Self {
            points,
            nodes,
            indices,
        }
    }

    /// Returns the number of indexed points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true when no points are indexed.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the `k` points nearest to `p` as `(point index, squared
    /// distance)` pairs sorted by ascending distance. Fewer than `k` pairs
    /// are returned when the tree holds fewer points.
    ///
    /// * `p` - Query point.
    /// * `k` - Number of neighbours to fetch.
    pub fn nearest(&self, p: &Point3f, k: usize) -> Vec<(usize, Float)> {
        let mut heap = BinaryHeap::with_capacity(k + 1);
        if k > 0 && !self.nodes.is_empty() {
            self.nearest_in_node(0, p, k, &mut heap);
        }

        let mut result: Vec<(usize, Float)> = heap
            .into_iter()
            .map(|c| (c.index, c.dist_squared))
            .collect();
        result.sort_by(|a, b| a.1.total_cmp(&b.1));
        result
    }

    /// Returns all points within `radius` of `p` as `(point index, squared
    /// distance)` pairs sorted by ascending distance.
    ///
    /// * `p`      - Query point.
    /// * `radius` - Search radius.
    pub fn within_radius(&self, p: &Point3f, radius: Float) -> Vec<(usize, Float)> {
        let mut result = Vec::new();
        if !self.nodes.is_empty() {
            self.radius_in_node(0, p, radius * radius, &mut result);
        }
        result.sort_by(|a, b| a.1.total_cmp(&b.1));
        result
    }

    /// Returns the per-leaf point index ranges. Every indexed point appears
    /// in exactly one leaf.
    pub fn leaves(&self) -> Vec<&[usize]> {
        self.nodes
            .iter()
            .filter_map(|node| match *node {
                KdNode::Leaf { first, count } => Some(&self.indices[first..first + count]),
                KdNode::Interior { .. } => None,
            })
            .collect()
    }

    fn nearest_in_node(
        &self,
        node: usize,
        p: &Point3f,
        k: usize,
        heap: &mut BinaryHeap<Candidate>,
    ) {
        match self.nodes[node] {
            KdNode::Leaf { first, count } => {
                for &index in &self.indices[first..first + count] {
                    let dist_squared = p.distance_squared(&self.points[index]);
                    if heap.len() < k {
                        heap.push(Candidate {
                            dist_squared,
                            index,
                        });
                    } else if heap
                        .peek()
                        .map_or(false, |worst| dist_squared < worst.dist_squared)
                    {
                        heap.pop();
                        heap.push(Candidate {
                            dist_squared,
                            index,
                        });
                    }
                }
            }
            KdNode::Interior { axis, split, right } => {
                // Descend into the child containing the query point first;
                // the far child only needs visiting while the split plane is
                // closer than the current k-th best distance.
                let delta = p[axis] - split;
                let (near, far) = if delta < 0.0 {
                    (node + 1, right)
                } else {
                    (right, node + 1)
                };
                self.nearest_in_node(near, p, k, heap);
                let visit_far = heap.len() < k
                    || heap
                        .peek()
                        .map_or(true, |worst| delta * delta < worst.dist_squared);
                if visit_far {
                    self.nearest_in_node(far, p, k, heap);
                }
            }
        }
    }

    fn radius_in_node(
        &self,
        node: usize,
        p: &Point3f,
        radius_squared: Float,
        result: &mut Vec<(usize, Float)>,
    ) {
        match self.nodes[node] {
            KdNode::Leaf { first, count } => {
                for &index in &self.indices[first..first + count] {
                    let dist_squared = p.distance_squared(&self.points[index]);
                    if dist_squared <= radius_squared {
                        result.push((index, dist_squared));
                    }
                }
            }
            KdNode::Interior { axis, split, right } => {
                let delta = p[axis] - split;
                let (near, far) = if delta < 0.0 {
                    (node + 1, right)
                } else {
                    (right, node + 1)
                };
                self.radius_in_node(near, p, radius_squared, result);
                if delta * delta <= radius_squared {
                    self.radius_in_node(far, p, radius_squared, result);
                }
            }
        }
    }
}

/// Recursively builds the subtree over `indices`, which covers the tree's
/// index list starting at `first`.
fn build_node(
    points: &[Point3f],
    nodes: &mut Vec<KdNode>,
    indices: &mut [usize],
    first: usize,
    max_leaf_size: usize,
) {
    if indices.len() <= max_leaf_size {
        nodes.push(KdNode::Leaf {
            first,
            count: indices.len(),
        });
        return;
    }

    // Split at the median along the widest axis of the point bounds.
    let mut bounds = Bounds3f::empty();
    for &i in indices.iter() {
        bounds = bounds.union_point(&points[i]);
    }
    let axis = bounds.maximum_extent();

    let mid = indices.len() / 2;
    indices.select_nth_unstable_by(mid, |&a, &b| points[a][axis].total_cmp(&points[b][axis]));
    let split = points[indices[mid]][axis];

    let node = nodes.len();
    nodes.push(KdNode::Interior {
        axis,
        split,
        right: 0,
    });

    let (left, right_indices) = indices.split_at_mut(mid);
    build_node(points, nodes, left, first, max_leaf_size);

    let right = nodes.len();
    if let KdNode::Interior { right: r, .. } = &mut nodes[node] {
        *r = right;
    }
    build_node(points, nodes, right_indices, first + mid, max_leaf_size);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn brute_force_nearest(points: &[Point3f], p: &Point3f, k: usize) -> Vec<Float> {
        let mut d2: Vec<Float> = points.iter().map(|q| p.distance_squared(q)).collect();
        d2.sort_by(|a, b| a.total_cmp(b));
        d2.truncate(k);
        d2
    }

    fn grid_points(n: usize) -> Vec<Point3f> {
        (0..n)
            .map(|i| {
                Point3f::new(
                    (i % 7) as Float,
                    ((i / 7) % 5) as Float * 2.0,
                    (i / 35) as Float * 3.0,
                )
            })
            .collect()
    }

    #[test]
    fn empty_tree_returns_no_matches() {
        let tree = PointKdTree::new(vec![], 4);
        assert!(tree.nearest(&Point3f::ZERO, 3).is_empty());
        assert!(tree.within_radius(&Point3f::ZERO, 1.0).is_empty());
        assert!(tree.leaves().is_empty());
    }

    #[test]
    fn leaves_partition_all_points() {
        let tree = PointKdTree::new(grid_points(100), 8);
        let mut seen: Vec<usize> = tree.leaves().iter().flat_map(|l| l.iter().copied()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..100).collect::<Vec<_>>());
        for leaf in tree.leaves() {
            assert!(!leaf.is_empty());
            assert!(leaf.len() <= 8);
        }
    }

    #[test]
    fn radius_query_matches_brute_force() {
        let points = grid_points(100);
        let tree = PointKdTree::new(points.clone(), 4);
        let p = Point3f::new(3.2, 4.1, 1.7);
        let radius = 3.5;

        let mut expected: Vec<usize> = (0..points.len())
            .filter(|&i| p.distance_squared(&points[i]) <= radius * radius)
            .collect();
        expected.sort_unstable();

        let mut got: Vec<usize> = tree.within_radius(&p, radius).iter().map(|m| m.0).collect();
        got.sort_unstable();
        assert_eq!(got, expected);
    }

    proptest! {
        #[test]
        fn knn_matches_brute_force(
            coords in prop::collection::vec((-10.0f32..10.0, -10.0f32..10.0, -10.0f32..10.0), 1..64),
            qx in -12.0f32..12.0,
            qy in -12.0f32..12.0,
            qz in -12.0f32..12.0,
            k in 1usize..8,
            max_leaf in 1usize..6,
        ) {
            let points: Vec<Point3f> = coords.iter().map(|&(x, y, z)| Point3f::new(x, y, z)).collect();
            let p = Point3f::new(qx, qy, qz);
            let tree = PointKdTree::new(points.clone(), max_leaf);

            let got: Vec<Float> = tree.nearest(&p, k).iter().map(|m| m.1).collect();
            let expected = brute_force_nearest(&points, &p, k);
            prop_assert_eq!(got.len(), expected.len());
            for (g, e) in got.iter().zip(expected.iter()) {
                prop_assert!((g - e).abs() < 1e-4);
            }
        }
    }
}
