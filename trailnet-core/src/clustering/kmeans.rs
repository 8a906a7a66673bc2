//! Exact (Lloyd) k-means with k-means++ seeding

use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;

use super::{ClusterStrategy, Clustering};
use crate::{ClusterLabel, Coordinate, loading::ClusteringConfig};

/// Full-batch k-means minimising within-cluster squared euclidean distance
/// in latitude/longitude space. Deterministic for a given seed.
#[derive(Debug, Clone)]
pub struct KMeans {
    pub n_init: usize,
    pub max_iter: usize,
    pub tolerance: f64,
    pub seed: u64,
}

impl From<&ClusteringConfig> for KMeans {
    fn from(config: &ClusteringConfig) -> Self {
        Self {
            n_init: config.n_init,
            max_iter: config.max_iter,
            tolerance: config.tolerance,
            seed: config.seed,
        }
    }
}

impl ClusterStrategy for KMeans {
    fn name(&self) -> &'static str {
        "k-means"
    }

    fn cluster(&self, points: &[Coordinate], k: usize) -> Clustering {
        if points.is_empty() {
            return Clustering::default();
        }
        let k = k.clamp(1, points.len());
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut best: Option<(f64, Clustering)> = None;
        for _ in 0..self.n_init.max(1) {
            let (clustering, inertia) = self.lloyd(points, k, &mut rng);
            if best.as_ref().is_none_or(|(best_inertia, _)| inertia < *best_inertia) {
                best = Some((inertia, clustering));
            }
        }

        best.map(|(_, clustering)| clustering).unwrap_or_default()
    }
}

impl KMeans {
    fn lloyd(&self, points: &[Coordinate], k: usize, rng: &mut StdRng) -> (Clustering, f64) {
        let mut centroids = kmeans_plus_plus(points, k, rng);
        let tolerance_sq = self.tolerance * self.tolerance;

        for _ in 0..self.max_iter.max(1) {
            let (labels, _) = assign(points, &centroids);

            let mut sums = vec![(0.0_f64, 0.0_f64, 0_usize); k];
            for (point, &label) in points.iter().zip(&labels) {
                let entry = &mut sums[label];
                entry.0 += point.lat;
                entry.1 += point.lon;
                entry.2 += 1;
            }

            let mut max_shift = 0.0_f64;
            for (centroid, &(lat_sum, lon_sum, count)) in centroids.iter_mut().zip(&sums) {
                // An emptied cluster keeps its previous centroid
                if count == 0 {
                    continue;
                }
                #[allow(clippy::cast_precision_loss)]
                let updated = Coordinate::new(lat_sum / count as f64, lon_sum / count as f64);
                max_shift = max_shift.max(updated.squared_euclidean(centroid));
                *centroid = updated;
            }

            if max_shift <= tolerance_sq {
                break;
            }
        }

        let (labels, inertia) = assign(points, &centroids);
        (Clustering { centroids, labels }, inertia)
    }
}

/// k-means++ seeding: each further centre is drawn with probability
/// proportional to its squared distance from the closest chosen centre.
pub(super) fn kmeans_plus_plus(points: &[Coordinate], k: usize, rng: &mut StdRng) -> Vec<Coordinate> {
    let mut centroids = Vec::with_capacity(k);
    let first = points[rng.random_range(0..points.len())];
    centroids.push(first);

    let mut closest: Vec<f64> = points.iter().map(|p| p.squared_euclidean(&first)).collect();

    while centroids.len() < k {
        let total: f64 = closest.iter().sum();
        let next = if total > 0.0 {
            let mut target = rng.random::<f64>() * total;
            let mut chosen = points.len() - 1;
            for (idx, &distance) in closest.iter().enumerate() {
                if target < distance {
                    chosen = idx;
                    break;
                }
                target -= distance;
            }
            chosen
        } else {
            // All remaining points coincide with a centre
            rng.random_range(0..points.len())
        };

        let centre = points[next];
        centroids.push(centre);
        for (distance, point) in closest.iter_mut().zip(points) {
            *distance = distance.min(point.squared_euclidean(&centre));
        }
    }

    centroids
}

/// Index of the closest centroid and its squared distance; ties go to the
/// lower index
pub(super) fn nearest_centroid(point: &Coordinate, centroids: &[Coordinate]) -> (ClusterLabel, f64) {
    let mut best = (0, f64::INFINITY);
    for (idx, centroid) in centroids.iter().enumerate() {
        let distance = point.squared_euclidean(centroid);
        if distance < best.1 {
            best = (idx, distance);
        }
    }
    best
}

/// Labels every point with its nearest centroid, returning the labels and
/// the total inertia
pub(super) fn assign(points: &[Coordinate], centroids: &[Coordinate]) -> (Vec<ClusterLabel>, f64) {
    let nearest: Vec<(ClusterLabel, f64)> = points
        .par_iter()
        .map(|point| nearest_centroid(point, centroids))
        .collect();

    let inertia: f64 = nearest.iter().map(|(_, distance)| distance).sum();
    let labels: Vec<ClusterLabel> = nearest.into_iter().map(|(label, _)| label).collect();
    (labels, inertia)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(center: (f64, f64), n: usize) -> Vec<Coordinate> {
        (0..n)
            .map(|i| {
                let offset = (i as f64 - n as f64 / 2.0) * 1e-5;
                Coordinate::new(center.0 + offset, center.1 - offset)
            })
            .collect()
    }

    #[test]
    fn test_separates_well_spaced_blobs() {
        let mut points = blob((41.0, 2.0), 20);
        points.extend(blob((41.5, 2.5), 20));
        points.extend(blob((42.0, 3.0), 20));

        let kmeans = KMeans {
            n_init: 3,
            max_iter: 100,
            tolerance: 1e-9,
            seed: 7,
        };
        let clustering = kmeans.cluster(&points, 3);

        for group in clustering.labels.chunks(20) {
            assert!(group.iter().all(|&label| label == group[0]));
        }
        assert_ne!(clustering.labels[0], clustering.labels[20]);
        assert_ne!(clustering.labels[20], clustering.labels[40]);
        assert_ne!(clustering.labels[0], clustering.labels[40]);

        let centroid = clustering.centroid_of(0);
        assert!((centroid.lat - 41.0).abs() < 1e-3);
        assert!((centroid.lon - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_same_seed_same_result() {
        let points = blob((10.0, 10.0), 200);
        let kmeans = KMeans {
            n_init: 2,
            max_iter: 50,
            tolerance: 1e-6,
            seed: 42,
        };
        assert_eq!(kmeans.cluster(&points, 8), kmeans.cluster(&points, 8));
    }

    #[test]
    fn test_identical_points_do_not_panic() {
        let points = vec![Coordinate::new(1.0, 1.0); 30];
        let kmeans = KMeans {
            n_init: 1,
            max_iter: 10,
            tolerance: 0.0,
            seed: 0,
        };
        let clustering = kmeans.cluster(&points, 4);
        assert_eq!(clustering.len(), 30);
        assert_eq!(clustering.centroid_of(5), Coordinate::new(1.0, 1.0));
    }

    #[test]
    fn test_nearest_centroid_prefers_first_on_tie() {
        let centroids = [Coordinate::new(0.0, 1.0), Coordinate::new(0.0, -1.0)];
        let (label, _) = nearest_centroid(&Coordinate::new(0.0, 0.0), &centroids);
        assert_eq!(label, 0);
    }
}
