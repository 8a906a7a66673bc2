//! Removal of near-collinear degree-2 nodes
//!
//! A node with exactly two neighbours whose angle is within ε of a straight
//! line is deleted and its neighbours are joined directly. The new edge is
//! weighted by the great-circle distance between the neighbours, not by the
//! sum of the removed edges, so paths over curved terrain may come out
//! slightly shorter than the raw tracks.

use log::{debug, info};

use crate::{
    Coordinate, Error, TrailGraph,
    loading::{SimplifyConfig, SimplifyMode},
};

/// Outcome of a simplification call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimplifyStats {
    pub removed_nodes: usize,
    /// Nodes skipped because their angle could not be computed
    pub degenerate_nodes: usize,
    pub passes: usize,
}

/// Simplifies `graph` in place according to `config.mode`.
///
/// In [`SimplifyMode::SinglePass`] only the degree-2 nodes present when the
/// call starts are visited, once each, so long chains may need further
/// calls to collapse completely. [`SimplifyMode::FixedPoint`] repeats the
/// sweep until nothing more is removed.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if ε is not in `(0, 180]`.
pub fn simplify_graph(graph: &mut TrailGraph, config: &SimplifyConfig) -> Result<SimplifyStats, Error> {
    let epsilon = config.epsilon_degrees;
    if !(epsilon.is_finite() && epsilon > 0.0 && epsilon <= 180.0) {
        return Err(Error::InvalidInput(format!(
            "Collinearity tolerance must be in (0, 180] degrees, got {epsilon}"
        )));
    }

    let mut stats = SimplifyStats::default();
    loop {
        let (removed, degenerate) = single_pass(graph, epsilon);
        stats.passes += 1;
        stats.removed_nodes += removed;
        stats.degenerate_nodes += degenerate;

        if config.mode == SimplifyMode::SinglePass || removed == 0 {
            break;
        }
    }

    info!(
        "Simplified graph: removed {} collinear nodes in {} pass(es), final graph has {} nodes and {} edges",
        stats.removed_nodes,
        stats.passes,
        graph.node_count(),
        graph.edge_count()
    );
    Ok(stats)
}

/// One sweep over a snapshot of the degree-2 nodes.
/// Returns the number of removed and of degenerate nodes.
fn single_pass(graph: &mut TrailGraph, epsilon: f64) -> (usize, usize) {
    let candidates: Vec<Coordinate> = graph
        .nodes()
        .filter(|&node| graph.degree(node) == 2)
        .collect();

    let mut removed = 0;
    let mut degenerate = 0;
    for node in candidates {
        // Earlier removals in this pass may have changed the neighbourhood
        let neighbors: Vec<Coordinate> = graph.neighbors(node).map(|(n, _)| n).collect();
        let &[g1, g3] = neighbors.as_slice() else {
            continue;
        };

        match angle_at(&g1, &node, &g3) {
            Ok(angle) if (180.0 - angle).abs() < epsilon => {
                graph.remove_node(node);
                graph.add_edge(g1, g3);
                removed += 1;
            }
            Ok(_) => {}
            Err(e) => {
                debug!("Leaving node {node} unsimplified: {e}");
                degenerate += 1;
            }
        }
    }

    (removed, degenerate)
}

/// Angle in degrees at `vertex` formed by `a`-`vertex`-`b`, from the law of
/// cosines over great-circle distances.
///
/// A zero-length arm counts as a straight line (180°).
///
/// # Errors
///
/// Returns [`Error::DegenerateGeometry`] if the distances are not finite.
pub fn angle_at(a: &Coordinate, vertex: &Coordinate, b: &Coordinate) -> Result<f64, Error> {
    let d1 = a.distance_to(vertex);
    let d2 = vertex.distance_to(b);
    let d3 = a.distance_to(b);

    if !(d1.is_finite() && d2.is_finite() && d3.is_finite()) {
        return Err(Error::DegenerateGeometry(format!(
            "non-finite distances around {vertex}"
        )));
    }
    if d1 == 0.0 || d2 == 0.0 {
        return Ok(180.0);
    }

    let cos_angle = ((d1 * d1 + d2 * d2 - d3 * d3) / (2.0 * d1 * d2)).clamp(-1.0, 1.0);
    Ok(cos_angle.acos().to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Segment;

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon)
    }

    fn chain(nodes: &[Coordinate]) -> TrailGraph {
        let segments: Vec<Segment> = nodes
            .windows(2)
            .map(|pair| Segment::new(pair[0], pair[1]))
            .collect();
        TrailGraph::from_segments(&segments)
    }

    #[test]
    fn test_straight_angle() {
        let angle = angle_at(&c(0.0, 0.0), &c(0.0, 0.0001), &c(0.0, 0.0002)).unwrap();
        assert!((180.0 - angle).abs() < 1e-3, "got {angle}");
    }

    #[test]
    fn test_right_angle() {
        let angle = angle_at(&c(0.0, 0.0), &c(0.0, 1.0), &c(1.0, 1.0)).unwrap();
        assert!((angle - 90.0).abs() < 1.0, "got {angle}");
    }

    #[test]
    fn test_zero_length_arm_counts_as_straight() {
        let angle = angle_at(&c(1.0, 1.0), &c(1.0, 1.0), &c(2.0, 2.0)).unwrap();
        assert_eq!(angle, 180.0);
    }

    #[test]
    fn test_non_finite_geometry_is_degenerate() {
        let result = angle_at(&c(f64::NAN, 0.0), &c(0.0, 0.0), &c(0.0, 1.0));
        assert!(matches!(result, Err(Error::DegenerateGeometry(_))));
    }

    #[test]
    fn test_degenerate_node_is_skipped_and_pass_continues() {
        let bad = c(f64::NAN, 0.0);
        let a = c(0.0, 0.0);
        let b = c(0.0, 0.0001);
        let d = c(0.0, 0.0002);
        let mut graph = chain(&[bad, c(0.0, -0.0001), a]);
        graph.add_edge(a, b);
        graph.add_edge(b, d);

        let stats = simplify_graph(&mut graph, &SimplifyConfig::strict()).unwrap();

        assert!(stats.degenerate_nodes >= 1);
        assert!(!graph.contains_node(b));
    }

    #[test]
    fn test_fixed_point_collapses_long_chain() {
        let nodes: Vec<Coordinate> = (0..20).map(|i| c(0.0, f64::from(i) * 0.0001)).collect();
        let mut graph = chain(&nodes);

        let config = SimplifyConfig::strict().with_mode(SimplifyMode::FixedPoint);
        let stats = simplify_graph(&mut graph, &config).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(stats.removed_nodes, 18);
        assert!(graph.contains_edge(nodes[0], nodes[19]));
    }

    #[test]
    fn test_rejects_invalid_epsilon() {
        let mut graph = TrailGraph::new();
        let config = SimplifyConfig {
            epsilon_degrees: 0.0,
            ..SimplifyConfig::default()
        };
        assert!(simplify_graph(&mut graph, &config).is_err());
    }

    #[test]
    fn test_single_pass_on_empty_graph() {
        let mut graph = TrailGraph::new();
        let stats = simplify_graph(&mut graph, &SimplifyConfig::default()).unwrap();
        assert_eq!(stats.passes, 1);
        assert_eq!(stats.removed_nodes, 0);
    }
}
