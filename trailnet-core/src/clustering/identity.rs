use super::{ClusterStrategy, Clustering};
use crate::Coordinate;

/// Every point is its own singleton cluster.
///
/// Used for small inputs where the cluster count would approach the point
/// count anyway.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityClustering;

impl ClusterStrategy for IdentityClustering {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn cluster(&self, points: &[Coordinate], _k: usize) -> Clustering {
        Clustering {
            centroids: points.to_vec(),
            labels: (0..points.len()).collect(),
        }
    }
}
