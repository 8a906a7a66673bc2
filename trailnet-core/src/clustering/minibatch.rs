//! Mini-batch k-means for large inputs

use rand::{SeedableRng, rngs::StdRng, seq::index};

use super::{
    ClusterStrategy, Clustering,
    kmeans::{assign, kmeans_plus_plus, nearest_centroid},
};
use crate::{Coordinate, loading::ClusteringConfig};

/// Incremental k-means that updates centroids from random batches with a
/// per-centroid decaying learning rate, then labels the full input once.
#[derive(Debug, Clone)]
pub struct MiniBatchKMeans {
    pub batch_size: usize,
    pub max_iter: usize,
    pub n_init: usize,
    pub seed: u64,
}

impl From<&ClusteringConfig> for MiniBatchKMeans {
    fn from(config: &ClusteringConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            max_iter: config.minibatch_max_iter,
            n_init: config.minibatch_n_init,
            seed: config.seed,
        }
    }
}

impl ClusterStrategy for MiniBatchKMeans {
    fn name(&self) -> &'static str {
        "mini-batch k-means"
    }

    fn cluster(&self, points: &[Coordinate], k: usize) -> Clustering {
        if points.is_empty() {
            return Clustering::default();
        }
        let n = points.len();
        let k = k.clamp(1, n);
        let batch_size = self.batch_size.clamp(1, n);
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut centroids = self.initial_centroids(points, k, batch_size, &mut rng);
        let mut counts = vec![0_u64; k];

        for _ in 0..self.max_iter.max(1) {
            for idx in index::sample(&mut rng, n, batch_size) {
                let point = &points[idx];
                let (label, _) = nearest_centroid(point, &centroids);
                counts[label] += 1;

                #[allow(clippy::cast_precision_loss)]
                let rate = 1.0 / counts[label] as f64;
                let centroid = &mut centroids[label];
                centroid.lat += rate * (point.lat - centroid.lat);
                centroid.lon += rate * (point.lon - centroid.lon);
            }
        }

        let (labels, _) = assign(points, &centroids);
        Clustering { centroids, labels }
    }
}

impl MiniBatchKMeans {
    /// Best k-means++ seeding over `n_init` random subsamples, judged by
    /// inertia on the subsample
    fn initial_centroids(
        &self,
        points: &[Coordinate],
        k: usize,
        batch_size: usize,
        rng: &mut StdRng,
    ) -> Vec<Coordinate> {
        let init_size = (3 * batch_size).max(k).min(points.len());

        let mut best: Option<(f64, Vec<Coordinate>)> = None;
        for _ in 0..self.n_init.max(1) {
            let sample: Vec<Coordinate> = index::sample(rng, points.len(), init_size)
                .iter()
                .map(|idx| points[idx])
                .collect();
            let centroids = kmeans_plus_plus(&sample, k, rng);
            let (_, inertia) = assign(&sample, &centroids);
            if best.as_ref().is_none_or(|(best_inertia, _)| inertia < *best_inertia) {
                best = Some((inertia, centroids));
            }
        }

        best.map(|(_, centroids)| centroids).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_trails(n: usize) -> Vec<Coordinate> {
        (0..n)
            .map(|i| {
                let step = (i / 2) as f64 * 1e-6;
                if i % 2 == 0 {
                    Coordinate::new(41.0 + step, 2.0)
                } else {
                    Coordinate::new(45.0 + step, 6.0)
                }
            })
            .collect()
    }

    #[test]
    fn test_labels_every_point_deterministically() {
        let points = two_trails(6000);
        let minibatch = MiniBatchKMeans {
            batch_size: 500,
            max_iter: 20,
            n_init: 2,
            seed: 3,
        };

        let first = minibatch.cluster(&points, 2);
        let second = minibatch.cluster(&points, 2);

        assert_eq!(first, second);
        assert_eq!(first.len(), points.len());
        assert_eq!(first.centroids.len(), 2);
        assert_ne!(first.labels[0], first.labels[1]);
        assert!(first.labels.iter().step_by(2).all(|&l| l == first.labels[0]));
    }

    #[test]
    fn test_centroids_converge_to_groups() {
        let points = two_trails(6000);
        let minibatch = MiniBatchKMeans {
            batch_size: 1000,
            max_iter: 10,
            n_init: 1,
            seed: 0,
        };
        let clustering = minibatch.cluster(&points, 2);

        let south = clustering.centroid_of(0);
        let north = clustering.centroid_of(1);
        assert!((south.lat - 41.0).abs() < 0.01 && (south.lon - 2.0).abs() < 0.01);
        assert!((north.lat - 45.0).abs() < 0.01 && (north.lon - 6.0).abs() < 0.01);
    }
}
