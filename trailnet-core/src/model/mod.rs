//! Data model of the trail network engine
//!
//! Contains the geographic primitives, raw GPS input, points of interest
//! and the trail graph itself.

pub mod geometry;
pub mod graph;
pub mod poi;
pub mod shared;
pub mod trace;

pub use geometry::{BoundingBox, Coordinate, Segment};
pub use graph::TrailGraph;
pub use poi::Poi;
pub use shared::SharedTrailGraph;
pub use trace::TimedPoint;
