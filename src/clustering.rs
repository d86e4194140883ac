//! K-Means Clustering.

use crate::base::*;
use crate::geometry::*;
use rayon::prelude::*;

/// Clusters the given points into `k` groups with Lloyd's algorithm and
/// returns the cluster means together with each point's cluster label.
/// Seeding strides evenly through the input so repeated preprocesses of the
/// same photon set produce the same clusters.
///
/// `k` is reduced to the number of points when fewer are given; empty input
/// yields no clusters.
///
/// * `points`         - The points to cluster.
/// * `k`              - Requested number of clusters.
/// * `max_iterations` - Upper bound on Lloyd iterations.
pub fn k_means_lloyd(
    points: &[Point3f],
    k: usize,
    max_iterations: usize,
) -> (Vec<Point3f>, Vec<usize>) {
    let k = min(k, points.len());
    if k == 0 {
        return (vec![], vec![]);
    }

    // Seed the means by striding through the input.
    let mut means: Vec<Point3f> = (0..k).map(|i| points[i * points.len() / k]).collect();
    let mut labels = vec![0usize; points.len()];

    for iteration in 0..max_iterations {
        // Assignment step.
        let new_labels: Vec<usize> = points
            .par_iter()
            .map(|p| nearest_mean(p, &means))
            .collect();

        let converged = new_labels == labels;
        labels = new_labels;
        if converged && iteration > 0 {
            break;
        }

        // Update step. A cluster that lost all of its points keeps its
        // previous mean.
        let mut sums = vec![Vector3f::ZERO; k];
        let mut counts = vec![0usize; k];
        for (p, &label) in points.iter().zip(labels.iter()) {
            sums[label] = sums[label] + (*p - Point3f::ZERO);
            counts[label] += 1;
        }
        for (label, mean) in means.iter_mut().enumerate() {
            if counts[label] > 0 {
                *mean = Point3f::ZERO + sums[label] / counts[label] as Float;
            }
        }
    }

    (means, labels)
}

/// Returns the index of the mean closest to the point.
fn nearest_mean(p: &Point3f, means: &[Point3f]) -> usize {
    let mut best = 0;
    let mut best_dist = INFINITY;
    for (i, mean) in means.iter().enumerate() {
        let dist = p.distance_squared(mean);
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separates_two_distant_blobs() {
        let mut points = Vec::new();
        for i in 0..20 {
            let jitter = (i % 5) as Float * 0.01;
            points.push(Point3f::new(jitter, jitter, 0.0));
            points.push(Point3f::new(10.0 + jitter, 10.0 + jitter, 0.0));
        }
        let (means, labels) = k_means_lloyd(&points, 2, 100);

        assert_eq!(means.len(), 2);
        // Points of the same blob share a label; the two blobs differ.
        assert_eq!(labels[0], labels[2]);
        assert_eq!(labels[1], labels[3]);
        assert_ne!(labels[0], labels[1]);
        // Each mean sits inside one of the blobs.
        for mean in &means {
            assert!(mean.x < 1.0 || mean.x > 9.0);
        }
    }

    #[test]
    fn clamps_k_to_point_count() {
        let points = vec![Point3f::ZERO, Point3f::new(1.0, 0.0, 0.0)];
        let (means, labels) = k_means_lloyd(&points, 8, 10);
        assert_eq!(means.len(), 2);
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn empty_input_yields_no_clusters() {
        let (means, labels) = k_means_lloyd(&[], 4, 10);
        assert!(means.is_empty());
        assert!(labels.is_empty());
    }
}
