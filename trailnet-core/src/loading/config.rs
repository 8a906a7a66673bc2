use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Kilometers};

/// Every tunable of the pipeline.
///
/// Passed by reference into each stage; nothing reads ambient state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailNetworkConfig {
    pub clustering: ClusteringConfig,
    pub segments: SegmentConfig,
    pub simplify: SimplifyConfig,
    pub routing: RoutingConfig,
}

impl TrailNetworkConfig {
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for the first non-positive or
    /// otherwise nonsensical parameter found.
    pub fn validate(&self) -> Result<(), Error> {
        self.clustering.validate()?;
        self.segments.validate()?;
        self.simplify.validate()?;
        self.routing.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Target cluster count, clamped to the number of points
    pub n_clusters: usize,
    /// Inputs smaller than this skip clustering entirely
    pub identity_threshold: usize,
    /// Inputs larger than this use mini-batch k-means
    pub minibatch_threshold: usize,
    pub seed: u64,
    pub n_init: usize,
    pub max_iter: usize,
    /// Convergence threshold on the largest centroid shift, in degrees
    pub tolerance: f64,
    pub batch_size: usize,
    pub minibatch_max_iter: usize,
    pub minibatch_n_init: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            n_clusters: 500,
            identity_threshold: 1000,
            minibatch_threshold: 5000,
            seed: 0,
            n_init: 10,
            max_iter: 300,
            tolerance: 1e-4,
            batch_size: 1000,
            minibatch_max_iter: 100,
            minibatch_n_init: 3,
        }
    }
}

impl ClusteringConfig {
    fn validate(&self) -> Result<(), Error> {
        if self.n_clusters == 0 {
            return Err(invalid("clustering.n_clusters must be at least 1"));
        }
        if self.n_init == 0 || self.minibatch_n_init == 0 {
            return Err(invalid("clustering.n_init values must be at least 1"));
        }
        if self.max_iter == 0 || self.minibatch_max_iter == 0 {
            return Err(invalid("clustering.max_iter values must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(invalid("clustering.batch_size must be at least 1"));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(invalid("clustering.tolerance must be a finite non-negative number"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// Consecutive fixes further apart in time are never joined
    pub time_threshold_secs: f64,
    /// Centroids further apart than this are never joined
    pub distance_threshold_km: Kilometers,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            time_threshold_secs: 300.0,
            distance_threshold_km: 0.1,
        }
    }
}

impl SegmentConfig {
    fn validate(&self) -> Result<(), Error> {
        positive("segments.time_threshold_secs", self.time_threshold_secs)?;
        positive("segments.distance_threshold_km", self.distance_threshold_km)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimplifyMode {
    /// One sweep over the degree-2 nodes present when the call starts
    #[default]
    SinglePass,
    /// Repeat sweeps until a sweep removes nothing
    FixedPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyConfig {
    /// Maximum deviation from a straight line (180°) for a node to be removed
    pub epsilon_degrees: f64,
    pub mode: SimplifyMode,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            epsilon_degrees: 10.0,
            mode: SimplifyMode::SinglePass,
        }
    }
}

impl SimplifyConfig {
    /// Tighter 5° tolerance
    pub fn strict() -> Self {
        Self {
            epsilon_degrees: 5.0,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: SimplifyMode) -> Self {
        self.mode = mode;
        self
    }

    fn validate(&self) -> Result<(), Error> {
        positive("simplify.epsilon_degrees", self.epsilon_degrees)?;
        if self.epsilon_degrees > 180.0 {
            return Err(invalid("simplify.epsilon_degrees must not exceed 180"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// POIs further than this from every node are not attached to the graph
    pub max_connect_distance_km: Kilometers,
    /// Short category ids mapped to the names the POI source knows
    pub category_aliases: BTreeMap<String, String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            max_connect_distance_km: 10.0,
            category_aliases: BTreeMap::new(),
        }
    }
}

impl RoutingConfig {
    /// Full category name for `category`, or `category` itself
    pub fn resolve_category<'a>(&'a self, category: &'a str) -> &'a str {
        self.category_aliases
            .get(category)
            .map_or(category, String::as_str)
    }

    fn validate(&self) -> Result<(), Error> {
        positive(
            "routing.max_connect_distance_km",
            self.max_connect_distance_km,
        )
    }
}

fn positive(name: &str, value: f64) -> Result<(), Error> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}

fn invalid(message: &str) -> Error {
    Error::InvalidInput(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(TrailNetworkConfig::default().validate().is_ok());
        assert_eq!(SimplifyConfig::strict().epsilon_degrees, 5.0);
    }

    #[test]
    fn test_rejects_non_positive_thresholds() {
        let mut config = TrailNetworkConfig::default();
        config.segments.time_threshold_secs = 0.0;
        assert!(matches!(config.validate(), Err(Error::InvalidInput(_))));

        let mut config = TrailNetworkConfig::default();
        config.segments.distance_threshold_km = -1.0;
        assert!(matches!(config.validate(), Err(Error::InvalidInput(_))));

        let mut config = TrailNetworkConfig::default();
        config.routing.max_connect_distance_km = f64::NAN;
        assert!(matches!(config.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_zero_clusters_and_bad_epsilon() {
        let mut config = TrailNetworkConfig::default();
        config.clustering.n_clusters = 0;
        assert!(config.validate().is_err());

        let mut config = TrailNetworkConfig::default();
        config.simplify.epsilon_degrees = 200.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_category_aliases() {
        let mut routing = RoutingConfig::default();
        routing
            .category_aliases
            .insert("castles".to_string(), "Castles of Catalonia".to_string());

        assert_eq!(routing.resolve_category("castles"), "Castles of Catalonia");
        assert_eq!(routing.resolve_category("bridges"), "bridges");
    }
}
