//! Trail network graph engine.
//!
//! Turns a noisy, time-ordered stream of GPS points into a simplified
//! weighted graph of a trail network and computes shortest-path distances
//! from a start location to a set of points of interest.

pub mod algo;
pub mod clustering;
mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;

pub use error::Error;

pub use loading::{TrailNetworkConfig, build_trail_network, create_trail_graph};
pub use model::{BoundingBox, Coordinate, Poi, Segment, SharedTrailGraph, TimedPoint, TrailGraph};
pub use routing::{find_routes, plan_trail_routes, route_to_pois};

/// Great-circle distance in kilometres
pub type Kilometers = f64;

/// Label of a cluster produced by a clustering strategy
pub type ClusterLabel = usize;
