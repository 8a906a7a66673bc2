use log::info;
use serde::Serialize;

use super::{TrailNetworkConfig, edge_cache::EdgeCache, extract_segments, sources::TraceSource};
use crate::{
    BoundingBox, Coordinate, Error, Segment, TimedPoint, TrailGraph, algo::simplify::simplify_graph,
    clustering::cluster_points,
};

/// Size of the trail network before and after simplification
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NetworkSummary {
    pub points: usize,
    pub segments: usize,
    pub from_cache: bool,
    pub raw_nodes: usize,
    pub raw_edges: usize,
    pub nodes: usize,
    pub edges: usize,
    pub removed_nodes: usize,
}

/// Clusters raw fixes and derives the segments between clusters
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for an invalid configuration or
/// non-finite coordinates.
pub fn segments_from_points(
    points: &[TimedPoint],
    config: &TrailNetworkConfig,
) -> Result<Vec<Segment>, Error> {
    config.validate()?;
    if points.len() < 2 {
        info!("Not enough points to create segments ({})", points.len());
        return Ok(Vec::new());
    }

    let coordinates: Vec<Coordinate> = points.iter().map(|p| p.coordinate).collect();
    let clustering = cluster_points(&coordinates, &config.clustering)?;
    extract_segments(points, &clustering, &config.segments)
}

/// Builds and simplifies the trail graph of a point sequence.
///
/// Fewer than two points give an empty graph, which is not an error here;
/// routing on it fails with [`Error::EmptyNetwork`].
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for an invalid configuration or
/// non-finite coordinates.
pub fn create_trail_graph(
    points: &[TimedPoint],
    config: &TrailNetworkConfig,
) -> Result<TrailGraph, Error> {
    let segments = segments_from_points(points, config)?;
    let mut graph = TrailGraph::from_segments(&segments);
    simplify_graph(&mut graph, &config.simplify)?;
    Ok(graph)
}

/// Segments for `bbox`, taken from `cache` when present, otherwise derived
/// from the trace source and written back to the cache.
///
/// Also returns the number of fetched points (zero on a cache hit) and
/// whether the cache was used.
///
/// # Errors
///
/// Propagates provider, cache and configuration errors.
pub fn load_or_extract_segments<T>(
    traces: &T,
    cache: Option<&EdgeCache>,
    bbox: &BoundingBox,
    config: &TrailNetworkConfig,
) -> Result<(Vec<Segment>, usize, bool), Error>
where
    T: TraceSource + ?Sized,
{
    if let Some(segments) = cache.map(|cache| cache.load(bbox)).transpose()?.flatten() {
        return Ok((segments, 0, true));
    }

    info!("Processing segments for box {}", bbox.cache_key());
    let points = traces.fetch_points(bbox)?;
    let segments = segments_from_points(&points, config)?;

    // An empty entry would hide traces that arrive later for this box
    if let Some(cache) = cache.filter(|_| !segments.is_empty()) {
        cache.store(bbox, &segments)?;
    }
    Ok((segments, points.len(), false))
}

/// Builds the simplified trail graph for `bbox`
///
/// # Errors
///
/// Propagates provider, cache and configuration errors.
pub fn build_trail_network<T>(
    traces: &T,
    cache: Option<&EdgeCache>,
    bbox: &BoundingBox,
    config: &TrailNetworkConfig,
) -> Result<(TrailGraph, NetworkSummary), Error>
where
    T: TraceSource + ?Sized,
{
    config.validate()?;
    let (segments, points, from_cache) = load_or_extract_segments(traces, cache, bbox, config)?;

    let mut graph = TrailGraph::from_segments(&segments);
    let (raw_nodes, raw_edges) = (graph.node_count(), graph.edge_count());
    let stats = simplify_graph(&mut graph, &config.simplify)?;

    let summary = NetworkSummary {
        points,
        segments: segments.len(),
        from_cache,
        raw_nodes,
        raw_edges,
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        removed_nodes: stats.removed_nodes,
    };
    Ok((graph, summary))
}
