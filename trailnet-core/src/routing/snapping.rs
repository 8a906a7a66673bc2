//! Snapping arbitrary coordinates onto the trail graph

use log::{debug, trace};
use serde::Serialize;

use crate::{Coordinate, Error, Kilometers, Poi, TrailGraph};

impl TrailGraph {
    /// Nearest graph node to `target` and its distance.
    ///
    /// Linear scan over all nodes; on ties the first node encountered wins.
    /// Returns `None` for an empty graph.
    pub fn nearest_node(&self, target: &Coordinate) -> Option<(Coordinate, Kilometers)> {
        let mut best: Option<(Coordinate, Kilometers)> = None;
        for node in self.nodes() {
            let distance = target.distance_to(&node);
            if !distance.is_finite() {
                continue;
            }
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((node, distance));
            }
        }
        best
    }
}

/// How a POI was joined to the graph
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PoiConnection {
    /// The POI node was linked to `node` by an edge of length `distance`
    Connected {
        node: Coordinate,
        distance: Kilometers,
    },
    /// The nearest node is farther than the connect limit, or the graph
    /// has no nodes; the graph was left untouched
    TooFar {
        nearest_distance: Option<Kilometers>,
    },
}

impl PoiConnection {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

/// Snaps the start of a route onto its nearest node
///
/// # Errors
///
/// Returns [`Error::EmptyNetwork`] if the graph has no nodes.
pub fn snap_start(graph: &TrailGraph, start: &Coordinate) -> Result<(Coordinate, Kilometers), Error> {
    let (node, distance) = graph.nearest_node(start).ok_or(Error::EmptyNetwork)?;
    debug!("Start point {start} snapped to {node} ({distance:.3} km away)");
    Ok((node, distance))
}

/// Adds `poi` to the graph with an edge to its nearest node, if that node
/// is closer than `max_connect_distance`.
pub fn attach_poi(graph: &mut TrailGraph, poi: &Poi, max_connect_distance: Kilometers) -> PoiConnection {
    match graph.nearest_node(&poi.location) {
        Some((node, distance)) if distance < max_connect_distance => {
            // A POI sitting exactly on a node is attached at that node
            graph.add_edge(poi.location, node);
            trace!("Connected {} to graph ({distance:.2} km)", poi.name);
            PoiConnection::Connected { node, distance }
        }
        Some((_, distance)) => {
            debug!(
                "{} is {distance:.2} km from the nearest node (max: {max_connect_distance} km) - not connected",
                poi.name
            );
            PoiConnection::TooFar {
                nearest_distance: Some(distance),
            }
        }
        None => PoiConnection::TooFar {
            nearest_distance: None,
        },
    }
}

/// Attaches each POI in turn. POIs attached earlier are themselves graph
/// nodes and may serve as the nearest node of later ones.
pub fn attach_pois(
    graph: &mut TrailGraph,
    pois: &[Poi],
    max_connect_distance: Kilometers,
) -> Vec<PoiConnection> {
    pois.iter()
        .map(|poi| attach_poi(graph, poi, max_connect_distance))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon)
    }

    #[test]
    fn test_empty_graph_has_no_nearest_node() {
        let graph = TrailGraph::new();
        assert!(graph.nearest_node(&c(41.0, 2.0)).is_none());
        assert!(matches!(
            snap_start(&graph, &c(41.0, 2.0)),
            Err(Error::EmptyNetwork)
        ));
    }

    #[test]
    fn test_picks_the_closest_node() {
        let start = c(0.0, 0.0);
        // ~2.0 km and ~0.5 km east of the start
        let far = c(0.0, 2.0 / 111.195);
        let near = c(0.0, 0.5 / 111.195);
        let mut graph = TrailGraph::new();
        graph.add_edge(far, near);

        let (node, distance) = graph.nearest_node(&start).unwrap();
        assert_eq!(node, near);
        assert!((distance - 0.5).abs() < 0.01, "got {distance}");
    }

    #[test]
    fn test_ties_go_to_first_encountered_node() {
        let first = c(0.0, 0.01);
        let second = c(0.0, -0.01);
        let mut graph = TrailGraph::new();
        graph.add_node(first);
        graph.add_node(second);

        let (node, _) = graph.nearest_node(&c(0.0, 0.0)).unwrap();
        assert_eq!(node, first);
    }

    #[test]
    fn test_ties_follow_iteration_order_after_removal() {
        let gone = c(5.0, 5.0);
        let mut graph = TrailGraph::new();
        graph.add_node(gone);
        graph.add_node(c(0.0, 0.01));
        graph.add_node(c(0.0, -0.01));
        graph.remove_node(gone);

        let leading = graph.nodes().next().unwrap();
        let (node, _) = graph.nearest_node(&c(0.0, 0.0)).unwrap();
        assert_eq!(node, leading);
    }

    #[test]
    fn test_far_poi_leaves_graph_untouched() {
        let mut graph = TrailGraph::new();
        graph.add_edge(c(0.0, 0.0), c(0.0, 0.001));
        let poi = Poi::new("Far", c(1.0, 0.0));

        let connection = attach_poi(&mut graph, &poi, 10.0);

        assert!(matches!(
            connection,
            PoiConnection::TooFar {
                nearest_distance: Some(d)
            } if d > 100.0
        ));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_near_poi_is_linked_by_great_circle_edge() {
        let node = c(0.0, 0.0);
        let mut graph = TrailGraph::new();
        graph.add_edge(node, c(0.0, 0.001));
        let poi = Poi::new("Near", c(0.01, 0.0));

        let connection = attach_poi(&mut graph, &poi, 10.0);

        let expected = poi.location.distance_to(&node);
        assert_eq!(
            connection,
            PoiConnection::Connected {
                node,
                distance: expected
            }
        );
        assert_eq!(graph.edge_weight(poi.location, node), Some(expected));
    }

    #[test]
    fn test_poi_on_a_node_attaches_without_self_loop() {
        let node = c(0.0, 0.0);
        let mut graph = TrailGraph::new();
        graph.add_edge(node, c(0.0, 0.001));

        let connection = attach_poi(&mut graph, &Poi::new("On trail", node), 10.0);

        assert!(connection.is_connected());
        assert_eq!(graph.edge_count(), 1);
    }
}
