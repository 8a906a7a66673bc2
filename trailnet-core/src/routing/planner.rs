//! Multi-target route planning from a start point to points of interest

use std::cmp::Ordering;

use hashbrown::HashSet;
use log::{info, warn};
use serde::Serialize;

use super::{
    dijkstra::dijkstra_paths,
    snapping::{PoiConnection, attach_pois, snap_start},
};
use crate::{
    BoundingBox, Coordinate, Error, Kilometers, Poi, TrailGraph,
    loading::{
        NetworkSummary, PoiSource, RoutingConfig, TraceSource, TrailNetworkConfig,
        build_trail_network, edge_cache::EdgeCache,
    },
};

/// Why a POI has no route. Not an error: a normal routing result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnreachableReason {
    /// No graph node was close enough to attach the POI
    TooFarToConnect,
    /// The POI was attached but lies in another component than the start
    NoPath,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RouteOutcome {
    Reachable {
        distance: Kilometers,
        path: Vec<Coordinate>,
    },
    Unreachable {
        reason: UnreachableReason,
    },
}

impl RouteOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable { .. })
    }

    pub fn distance(&self) -> Option<Kilometers> {
        match self {
            Self::Reachable { distance, .. } => Some(*distance),
            Self::Unreachable { .. } => None,
        }
    }

    pub fn path(&self) -> Option<&[Coordinate]> {
        match self {
            Self::Reachable { path, .. } => Some(path),
            Self::Unreachable { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<UnreachableReason> {
        match self {
            Self::Reachable { .. } => None,
            Self::Unreachable { reason } => Some(*reason),
        }
    }
}

/// Route outcome for one POI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub poi: Poi,
    pub connection: PoiConnection,
    pub outcome: RouteOutcome,
}

/// Routes from one snapped start to a set of POIs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub start: Coordinate,
    pub start_node: Coordinate,
    pub start_snap_distance: Kilometers,
    /// Reachable POIs by ascending distance, then unreachable ones in input order
    pub results: Vec<RouteResult>,
}

impl RoutePlan {
    pub fn reachable_count(&self) -> usize {
        self.results
            .iter()
            .filter(|result| result.outcome.is_reachable())
            .count()
    }

    pub fn result_for(&self, name: &str) -> Option<&RouteResult> {
        self.results.iter().find(|result| result.poi.name == name)
    }
}

/// Computes a route from `start_node` to every POI.
///
/// `connections` must hold the attachment outcome of each POI, in the same
/// order; connected POIs are expected to be nodes of `graph`. A single
/// Dijkstra search covers all connected POIs. Results keep the POI order.
pub fn find_routes(
    graph: &TrailGraph,
    start_node: Coordinate,
    pois: &[Poi],
    connections: &[PoiConnection],
) -> Vec<RouteResult> {
    let targets: HashSet<Coordinate> = pois
        .iter()
        .zip(connections)
        .filter(|(_, connection)| connection.is_connected())
        .map(|(poi, _)| poi.location)
        .collect();

    let paths = dijkstra_paths(graph, start_node, Some(&targets), None);

    pois.iter()
        .zip(connections)
        .map(|(poi, connection)| {
            let outcome = if connection.is_connected() {
                match (
                    paths.distance_to(poi.location),
                    paths.path_to(poi.location),
                ) {
                    (Some(distance), Some(path)) => RouteOutcome::Reachable { distance, path },
                    _ => RouteOutcome::Unreachable {
                        reason: UnreachableReason::NoPath,
                    },
                }
            } else {
                RouteOutcome::Unreachable {
                    reason: UnreachableReason::TooFarToConnect,
                }
            };

            RouteResult {
                poi: poi.clone(),
                connection: *connection,
                outcome,
            }
        })
        .collect()
}

/// Snaps `start`, attaches `pois` to `graph` and routes to each of them.
///
/// The graph is augmented in place with the attached POIs.
///
/// # Errors
///
/// Returns [`Error::EmptyNetwork`] if the graph has no node to snap the
/// start to, or [`Error::InvalidInput`] for a non-positive connect distance.
pub fn route_to_pois(
    graph: &mut TrailGraph,
    start: Coordinate,
    pois: &[Poi],
    config: &RoutingConfig,
) -> Result<RoutePlan, Error> {
    let max_connect = config.max_connect_distance_km;
    if !(max_connect.is_finite() && max_connect > 0.0) {
        return Err(Error::InvalidInput(format!(
            "Maximum connect distance must be positive, got {max_connect}"
        )));
    }

    // The start is snapped before POIs join the graph so it never lands on one
    let (start_node, start_snap_distance) = snap_start(graph, &start)?;
    let connections = attach_pois(graph, pois, max_connect);

    let mut results = find_routes(graph, start_node, pois, &connections);
    results.sort_by(|a, b| match (a.outcome.distance(), b.outcome.distance()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let plan = RoutePlan {
        start,
        start_node,
        start_snap_distance,
        results,
    };
    info!(
        "Routed to {} of {} POIs",
        plan.reachable_count(),
        pois.len()
    );
    Ok(plan)
}

/// What to route: a start point, the area to build the network for and the
/// category of POIs to route to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRequest {
    pub start: Coordinate,
    pub bbox: BoundingBox,
    pub category: String,
}

/// Result of the end-to-end pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailRouteReport {
    pub network: NetworkSummary,
    pub plan: RoutePlan,
}

/// Runs the whole pipeline for `request`: builds (or loads from `cache`) the
/// trail network of the bounding box, fetches the POIs of the requested
/// category and routes to each of them.
///
/// # Errors
///
/// Propagates configuration errors, provider failures
/// ([`Error::ExternalSource`]), cache I/O errors and
/// [`Error::EmptyNetwork`] when the area yields no trail graph at all.
pub fn plan_trail_routes<T, P>(
    traces: &T,
    poi_source: &P,
    cache: Option<&EdgeCache>,
    request: &RouteRequest,
    config: &TrailNetworkConfig,
) -> Result<TrailRouteReport, Error>
where
    T: TraceSource + ?Sized,
    P: PoiSource + ?Sized,
{
    config.validate()?;
    if !request.start.is_finite() {
        return Err(Error::InvalidInput(format!(
            "Start point {} is not a valid coordinate",
            request.start
        )));
    }
    if !request.bbox.contains(&request.start) {
        warn!(
            "Start point {} lies outside the requested area {}",
            request.start,
            request.bbox.cache_key()
        );
    }

    let (mut graph, network) = build_trail_network(traces, cache, &request.bbox, config)?;

    let category = config.routing.resolve_category(&request.category);
    let pois = poi_source.fetch_pois(category, &request.bbox)?;
    if pois.is_empty() {
        info!("No '{category}' POIs inside the requested area");
    }

    let plan = route_to_pois(&mut graph, request.start, &pois, &config.routing)?;
    Ok(TrailRouteReport { network, plan })
}
