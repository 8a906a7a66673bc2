//! Snapping and shortest-path routing over the trail graph

pub mod dijkstra;
pub mod planner;
pub mod snapping;

pub use dijkstra::{ShortestPaths, dijkstra_paths, shortest_path};
pub use planner::{
    RouteOutcome, RoutePlan, RouteRequest, RouteResult, TrailRouteReport, UnreachableReason,
    find_routes, plan_trail_routes, route_to_pois,
};
pub use snapping::{PoiConnection, attach_poi, attach_pois, snap_start};
