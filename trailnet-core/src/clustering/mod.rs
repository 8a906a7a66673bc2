//! Spatial deduplication of raw GPS points
//!
//! Every strategy maps a coordinate set and a target cluster count to one
//! centroid per label plus a label per input point. Which strategy runs is
//! decided once, by input size, in [`select_strategy`].

mod identity;
mod kmeans;
mod minibatch;

use log::info;

pub use identity::IdentityClustering;
pub use kmeans::KMeans;
pub use minibatch::MiniBatchKMeans;

use crate::{ClusterLabel, Coordinate, Error, loading::ClusteringConfig};

/// Partitioning of a point sequence into labelled clusters
pub trait ClusterStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Clusters `points` into at most `k` groups.
    ///
    /// `k` is clamped to `[1, points.len()]`; an empty input yields an
    /// empty [`Clustering`].
    fn cluster(&self, points: &[Coordinate], k: usize) -> Clustering;
}

/// Result of a clustering run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clustering {
    /// Representative coordinate of each label
    pub centroids: Vec<Coordinate>,
    /// Label of each input point, in input order
    pub labels: Vec<ClusterLabel>,
}

impl Clustering {
    /// Number of labelled points
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label(&self, point_idx: usize) -> ClusterLabel {
        self.labels[point_idx]
    }

    /// Centroid of the cluster the `point_idx`-th point belongs to
    pub fn centroid_of(&self, point_idx: usize) -> Coordinate {
        self.centroids[self.labels[point_idx]]
    }
}

/// Picks the clustering strategy for an input of `n` points
pub fn select_strategy(n: usize, config: &ClusteringConfig) -> Box<dyn ClusterStrategy> {
    if n < config.identity_threshold {
        Box::new(IdentityClustering)
    } else if n <= config.minibatch_threshold {
        Box::new(KMeans::from(config))
    } else {
        Box::new(MiniBatchKMeans::from(config))
    }
}

/// Clusters raw point coordinates using the strategy suited to their count
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the configured cluster count is zero
/// or a coordinate is not finite.
pub fn cluster_points(points: &[Coordinate], config: &ClusteringConfig) -> Result<Clustering, Error> {
    if config.n_clusters == 0 {
        return Err(Error::InvalidInput(
            "Cluster count must be at least 1".to_string(),
        ));
    }
    if let Some(bad) = points.iter().find(|point| !point.is_finite()) {
        return Err(Error::InvalidInput(format!(
            "Cannot cluster non-finite coordinate {bad}"
        )));
    }
    if points.is_empty() {
        return Ok(Clustering::default());
    }

    let k = config.n_clusters.clamp(1, points.len());
    let strategy = select_strategy(points.len(), config);
    info!(
        "Clustering {} points into {} clusters ({})",
        points.len(),
        k,
        strategy.name()
    );

    Ok(strategy.cluster(points, k))
}
