//! Trail network graph
//!
//! Nodes are coordinate values and edges are undirected, so the graph is a
//! plain adjacency structure: coordinate to neighbour-with-weight. Inserting
//! `(A, B)` and `(B, A)` yields one edge, self-loops are never stored and
//! every weight is the haversine distance between the two endpoints.

use log::{info, trace};
use petgraph::graphmap::UnGraphMap;

use super::{Coordinate, Segment};
use crate::Kilometers;

/// Undirected weighted trail graph
#[derive(Debug, Clone, Default)]
pub struct TrailGraph {
    pub(crate) graph: UnGraphMap<Coordinate, Kilometers>,
}

impl TrailGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from a segment set.
    ///
    /// Segment provenance is ignored: each edge weight is recomputed from
    /// its endpoints, and repeated or reversed segments collapse into a
    /// single edge.
    pub fn from_segments<'a, I>(segments: I) -> Self
    where
        I: IntoIterator<Item = &'a Segment>,
    {
        let mut graph = Self::new();
        let mut skipped = 0usize;
        for segment in segments {
            if !graph.add_edge(segment.start, segment.end) && segment.is_degenerate() {
                skipped += 1;
            }
        }
        if skipped > 0 {
            trace!("Skipped {skipped} zero-length segments");
        }
        info!(
            "Created graph with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }

    /// Inserts the undirected edge `a`-`b` weighted by great-circle distance.
    ///
    /// Returns `true` if the edge was not present before. Self-loops are
    /// rejected and return `false`.
    pub fn add_edge(&mut self, a: Coordinate, b: Coordinate) -> bool {
        if a == b {
            return false;
        }
        self.graph.add_edge(a, b, a.distance_to(&b)).is_none()
    }

    pub fn add_node(&mut self, node: Coordinate) {
        self.graph.add_node(node);
    }

    /// Removes `node` together with all its incident edges
    pub fn remove_node(&mut self, node: Coordinate) -> bool {
        self.graph.remove_node(node)
    }

    pub fn contains_node(&self, node: Coordinate) -> bool {
        self.graph.contains_node(node)
    }

    pub fn contains_edge(&self, a: Coordinate, b: Coordinate) -> bool {
        self.graph.contains_edge(a, b)
    }

    pub fn edge_weight(&self, a: Coordinate, b: Coordinate) -> Option<Kilometers> {
        self.graph.edge_weight(a, b).copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Nodes in graph iteration order, which defines "first encountered"
    /// for nearest-node ties. Removals reorder it.
    pub fn nodes(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.graph.nodes()
    }

    /// Neighbours of `node` with the weight of the connecting edge
    pub fn neighbors(&self, node: Coordinate) -> impl Iterator<Item = (Coordinate, Kilometers)> + '_ {
        self.graph
            .edges(node)
            .map(|(_, neighbor, weight)| (neighbor, *weight))
    }

    pub fn degree(&self, node: Coordinate) -> usize {
        self.graph.neighbors(node).count()
    }

    /// All edges as segments, in edge insertion order
    pub fn segments(&self) -> Vec<Segment> {
        self.graph
            .all_edges()
            .map(|(a, b, _)| Segment::new(a, b))
            .collect()
    }

    /// The first `limit` edges as segments, for drawing a partial network
    pub fn preview(&self, limit: usize) -> Vec<Segment> {
        self.graph
            .all_edges()
            .take(limit)
            .map(|(a, b, _)| Segment::new(a, b))
            .collect()
    }

    /// Sum of all edge weights
    pub fn total_length(&self) -> Kilometers {
        self.graph.all_edges().map(|(_, _, weight)| *weight).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon)
    }

    #[test]
    fn test_reversed_segments_collapse() {
        let a = c(0.0, 0.0);
        let b = c(0.0, 0.001);
        let segments = [Segment::new(a, b), Segment::new(b, a)];

        let graph = TrailGraph::from_segments(&segments);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.contains_edge(a, b));
        assert!(graph.contains_edge(b, a));
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let a = c(41.0, 2.0);
        let b = c(41.001, 2.0);
        let d = c(41.001, 2.001);

        let forward = TrailGraph::from_segments(&[Segment::new(a, b), Segment::new(b, d)]);
        let backward = TrailGraph::from_segments(&[Segment::new(d, b), Segment::new(b, a)]);

        assert_eq!(forward.edge_count(), backward.edge_count());
        assert_eq!(forward.edge_weight(a, b), backward.edge_weight(b, a));
        assert_eq!(forward.edge_weight(b, d), backward.edge_weight(d, b));
    }

    #[test]
    fn test_weight_is_recomputed_great_circle_distance() {
        let a = c(41.0, 2.0);
        let b = c(41.01, 2.02);
        let mut graph = TrailGraph::new();

        assert!(graph.add_edge(a, b));
        assert!(!graph.add_edge(b, a));

        let weight = graph.edge_weight(a, b).unwrap();
        assert_eq!(weight, a.distance_to(&b));
        assert_eq!(graph.edge_weight(b, a), Some(weight));
    }

    #[test]
    fn test_self_loops_are_rejected() {
        let a = c(1.0, 1.0);
        let graph = TrailGraph::from_segments(&[Segment::new(a, a)]);
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_preview_is_a_prefix_of_segments() {
        let a = c(0.0, 0.0);
        let b = c(0.0, 0.001);
        let d = c(0.0, 0.002);
        let graph = TrailGraph::from_segments(&[Segment::new(a, b), Segment::new(b, d)]);

        assert_eq!(graph.preview(1), graph.segments()[..1]);
        assert_eq!(graph.preview(10).len(), 2);
        assert!(graph.preview(0).is_empty());
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let a = c(0.0, 0.0);
        let b = c(0.0, 0.001);
        let d = c(0.0, 0.002);
        let mut graph = TrailGraph::from_segments(&[Segment::new(a, b), Segment::new(b, d)]);

        assert_eq!(graph.degree(b), 2);
        assert!(graph.remove_node(b));
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.degree(a), 0);
        assert!(!graph.contains_node(b));
    }
}
