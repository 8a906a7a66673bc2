//! Geographic primitives: coordinates, bounding boxes and trail segments

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

use crate::{Error, Kilometers};

/// Latitude/longitude pair in decimal degrees.
///
/// Coordinates are compared, hashed and ordered by value, so two
/// coordinates with identical latitude and longitude are the same graph
/// node. Positive and negative zero are treated as equal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `geo` point with x = longitude, y = latitude
    pub fn point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }

    /// Haversine distance to `other` in kilometres
    pub fn distance_to(&self, other: &Coordinate) -> Kilometers {
        Haversine.distance(self.point(), other.point()) / 1000.0
    }

    /// Squared euclidean distance in degree space, used by clustering
    pub(crate) fn squared_euclidean(&self, other: &Coordinate) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        dlat * dlat + dlon * dlon
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    // Adding 0.0 folds -0.0 into +0.0 so that Eq, Hash and Ord agree.
    fn normalized(&self) -> (f64, f64) {
        (self.lat + 0.0, self.lon + 0.0)
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let (lat, lon) = self.normalized();
        lat.to_bits().hash(state);
        lon.to_bits().hash(state);
    }
}

impl Ord for Coordinate {
    fn cmp(&self, other: &Self) -> Ordering {
        let (lat, lon) = self.normalized();
        let (other_lat, other_lon) = other.normalized();
        lat.total_cmp(&other_lat)
            .then_with(|| lon.total_cmp(&other_lon))
    }
}

impl PartialOrd for Coordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self::new(lat, lon)
    }
}

/// Rectangular latitude/longitude region scoping retrieval and caching
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub bottom_left: Coordinate,
    pub top_right: Coordinate,
}

impl BoundingBox {
    /// Creates a bounding box, rejecting inverted or non-finite corners
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a corner is not finite or the
    /// bottom-left corner lies above or to the right of the top-right one.
    pub fn new(bottom_left: Coordinate, top_right: Coordinate) -> Result<Self, Error> {
        if !bottom_left.is_finite() || !top_right.is_finite() {
            return Err(Error::InvalidInput(format!(
                "Bounding box corners must be finite, got {bottom_left} and {top_right}"
            )));
        }
        if bottom_left.lat > top_right.lat || bottom_left.lon > top_right.lon {
            return Err(Error::InvalidInput(format!(
                "Bounding box is inverted: bottom-left {bottom_left}, top-right {top_right}"
            )));
        }
        Ok(Self {
            bottom_left,
            top_right,
        })
    }

    /// Inclusive range test on both latitude and longitude
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        coordinate.lat >= self.bottom_left.lat
            && coordinate.lat <= self.top_right.lat
            && coordinate.lon >= self.bottom_left.lon
            && coordinate.lon <= self.top_right.lon
    }

    /// Key used to address cached artifacts for exactly this box
    pub fn cache_key(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.bottom_left.lat, self.bottom_left.lon, self.top_right.lat, self.top_right.lon
        )
    }
}

/// Undirected connection between two cluster centroids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub start: Coordinate,
    pub end: Coordinate,
}

impl Segment {
    pub const fn new(start: Coordinate, end: Coordinate) -> Self {
        Self { start, end }
    }

    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashSet;

    #[test]
    fn test_distance_is_symmetric() {
        let samples = [
            Coordinate::new(41.3874, 2.1686),
            Coordinate::new(42.5063, 1.5218),
            Coordinate::new(-33.8688, 151.2093),
            Coordinate::new(0.0, 0.0),
            Coordinate::new(89.9, -179.9),
        ];
        for a in &samples {
            for b in &samples {
                let ab = a.distance_to(b);
                let ba = b.distance_to(a);
                assert!((ab - ba).abs() < 1e-9, "{a} -> {b}: {ab} vs {ba}");
                assert!(ab >= 0.0);
            }
            assert_eq!(a.distance_to(a), 0.0);
        }
    }

    #[test]
    fn test_distance_in_kilometres() {
        // One degree of latitude is roughly 111.2 km
        let d = Coordinate::new(0.0, 0.0).distance_to(&Coordinate::new(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.1, "got {d}");
    }

    #[test]
    fn test_value_identity() {
        let a = Coordinate::new(0.0, 1.5);
        let b = Coordinate::new(-0.0, 1.5);
        assert_eq!(a, b);

        let set: HashSet<Coordinate> = [a, b, Coordinate::new(0.0, 1.5)].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_ne!(a, Coordinate::new(0.0, 1.500_000_1));
    }

    #[test]
    fn test_bounding_box_is_inclusive() {
        let bbox =
            BoundingBox::new(Coordinate::new(41.0, 1.0), Coordinate::new(42.0, 2.0)).unwrap();
        assert!(bbox.contains(&Coordinate::new(41.0, 1.0)));
        assert!(bbox.contains(&Coordinate::new(42.0, 2.0)));
        assert!(bbox.contains(&Coordinate::new(41.5, 1.5)));
        assert!(!bbox.contains(&Coordinate::new(42.000_1, 1.5)));
        assert!(!bbox.contains(&Coordinate::new(41.5, 0.999)));
    }

    #[test]
    fn test_bounding_box_rejects_inverted_corners() {
        let result = BoundingBox::new(Coordinate::new(42.0, 1.0), Coordinate::new(41.0, 2.0));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_cache_key_uses_exact_corners() {
        let bbox =
            BoundingBox::new(Coordinate::new(41.5, 1.25), Coordinate::new(42.0, 2.0)).unwrap();
        assert_eq!(bbox.cache_key(), "41.5_1.25_42_2");
    }
}
