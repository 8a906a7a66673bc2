// Re-export key components
pub use crate::algo::simplify::{SimplifyStats, simplify_graph};
pub use crate::clustering::{ClusterStrategy, Clustering, cluster_points};
pub use crate::loading::{
    ClusteringConfig, CsvPoiSource, CsvTraceSource, EdgeCache, NetworkSummary, PoiSource,
    RoutingConfig, SegmentConfig, SimplifyConfig, SimplifyMode, TraceSource, TrailNetworkConfig,
    build_trail_network, create_trail_graph,
};
pub use crate::model::{BoundingBox, Coordinate, Poi, Segment, SharedTrailGraph, TimedPoint, TrailGraph};
pub use crate::routing::{
    PoiConnection, RouteOutcome, RoutePlan, RouteRequest, RouteResult, TrailRouteReport,
    UnreachableReason, plan_trail_routes, route_to_pois,
};

// Core types
pub use crate::Error;
pub use crate::Kilometers; // great-circle kilometres
