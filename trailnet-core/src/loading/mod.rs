//! This module is responsible for loading raw tracks and points of interest
//! and turning the tracks into a trail graph.

mod builder;
mod config;
pub mod edge_cache;
mod segments;
mod sources;

pub use builder::{
    NetworkSummary, build_trail_network, create_trail_graph, load_or_extract_segments,
    segments_from_points,
};
pub use config::{
    ClusteringConfig, RoutingConfig, SegmentConfig, SimplifyConfig, SimplifyMode,
    TrailNetworkConfig,
};
pub use edge_cache::EdgeCache;
pub use segments::extract_segments;
pub use sources::{CsvPoiSource, CsvTraceSource, PoiSource, TraceSource};
