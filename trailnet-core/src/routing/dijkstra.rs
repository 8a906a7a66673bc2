use std::{cmp::Ordering, collections::BinaryHeap};

use hashbrown::{HashMap, HashSet, hash_map::Entry};

use crate::{Coordinate, Kilometers, TrailGraph};

#[derive(Copy, Clone)]
struct State {
    cost: Kilometers,
    node: Coordinate,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

// Implement Ord for State to use in BinaryHeap
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by cost (reversed from standard Rust BinaryHeap)
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Settled part of a single-source shortest path search
#[derive(Debug, Clone)]
pub struct ShortestPaths {
    start: Coordinate,
    settled: HashMap<Coordinate, Kilometers>,
    predecessors: HashMap<Coordinate, Coordinate>,
}

impl ShortestPaths {
    /// Final shortest distance to `node`, if the search settled it
    pub fn distance_to(&self, node: Coordinate) -> Option<Kilometers> {
        self.settled.get(&node).copied()
    }

    /// Nodes from the start to `node` inclusive
    pub fn path_to(&self, node: Coordinate) -> Option<Vec<Coordinate>> {
        if !self.settled.contains_key(&node) {
            return None;
        }

        let mut path = vec![node];
        let mut current = node;
        while current != self.start {
            current = *self.predecessors.get(&current)?;
            path.push(current);
        }
        path.reverse(); // Now path is from start to target
        Some(path)
    }

    pub fn settled_count(&self) -> usize {
        self.settled.len()
    }
}

/// Dijkstra's algorithm over the trail graph.
///
/// When `targets` is given the search stops as soon as all of them are
/// settled; otherwise the whole component of `start` is explored, up to
/// `max_cost` when one is set.
pub fn dijkstra_paths(
    graph: &TrailGraph,
    start: Coordinate,
    targets: Option<&HashSet<Coordinate>>,
    max_cost: Option<Kilometers>,
) -> ShortestPaths {
    let estimated_nodes = graph.node_count().min(1000);
    let mut distances: HashMap<Coordinate, Kilometers> = HashMap::with_capacity(estimated_nodes);
    let mut settled: HashMap<Coordinate, Kilometers> = HashMap::with_capacity(estimated_nodes);
    let mut predecessors: HashMap<Coordinate, Coordinate> = HashMap::with_capacity(estimated_nodes);
    let mut heap = BinaryHeap::with_capacity(estimated_nodes / 4);
    let mut remaining = targets.map(HashSet::len);

    // Start node has distance 0
    heap.push(State {
        cost: 0.0,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost, node }) = heap.pop() {
        // Stale heap entry, or already settled through an equal-cost path
        if settled.contains_key(&node) || distances.get(&node).is_some_and(|&best| cost > best) {
            continue;
        }

        // Check max cost constraint
        if max_cost.is_some_and(|max| cost > max) {
            break;
        }

        settled.insert(node, cost);

        // Check if we've reached every target
        if let (Some(targets), Some(left)) = (targets, remaining.as_mut()) {
            if targets.contains(&node) {
                *left -= 1;
                if *left == 0 {
                    break;
                }
            }
        }

        for (next, weight) in graph.neighbors(node) {
            let next_cost = cost + weight;

            match distances.entry(next) {
                Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                    predecessors.insert(next, node);
                }
                Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                        predecessors.insert(next, node);
                    }
                }
            }
        }
    }

    ShortestPaths {
        start,
        settled,
        predecessors,
    }
}

/// Shortest distance and path between two nodes
pub fn shortest_path(
    graph: &TrailGraph,
    start: Coordinate,
    target: Coordinate,
) -> Option<(Kilometers, Vec<Coordinate>)> {
    let targets: HashSet<Coordinate> = [target].into_iter().collect();
    let paths = dijkstra_paths(graph, start, Some(&targets), None);
    Some((paths.distance_to(target)?, paths.path_to(target)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Segment;

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon)
    }

    /// a - b - d and a long detour a - e - d
    fn diamond() -> (TrailGraph, [Coordinate; 4]) {
        let a = c(0.0, 0.0);
        let b = c(0.0, 0.01);
        let d = c(0.0, 0.02);
        let e = c(0.05, 0.01);
        let graph = TrailGraph::from_segments(&[
            Segment::new(a, b),
            Segment::new(b, d),
            Segment::new(a, e),
            Segment::new(e, d),
        ]);
        (graph, [a, b, d, e])
    }

    #[test]
    fn test_prefers_shorter_branch() {
        let (graph, [a, b, d, _]) = diamond();
        let (distance, path) = shortest_path(&graph, a, d).unwrap();

        let expected = graph.edge_weight(a, b).unwrap() + graph.edge_weight(b, d).unwrap();
        assert!((distance - expected).abs() < 1e-12);
        assert_eq!(path, vec![a, b, d]);
    }

    #[test]
    fn test_start_is_reached_at_zero() {
        let (graph, [a, ..]) = diamond();
        let paths = dijkstra_paths(&graph, a, None, None);
        assert_eq!(paths.distance_to(a), Some(0.0));
        assert_eq!(paths.path_to(a), Some(vec![a]));
        assert_eq!(paths.settled_count(), 4);
    }

    #[test]
    fn test_other_component_is_unreached() {
        let (mut graph, [a, ..]) = diamond();
        let island_a = c(10.0, 10.0);
        let island_b = c(10.0, 10.01);
        graph.add_edge(island_a, island_b);

        assert!(shortest_path(&graph, a, island_b).is_none());
        let paths = dijkstra_paths(&graph, a, None, None);
        assert!(paths.distance_to(island_a).is_none());
        assert!(paths.path_to(island_a).is_none());
    }

    #[test]
    fn test_max_cost_limits_search() {
        let (graph, [a, b, d, _]) = diamond();
        let to_b = graph.edge_weight(a, b).unwrap();
        let paths = dijkstra_paths(&graph, a, None, Some(to_b * 1.5));

        assert!(paths.distance_to(b).is_some());
        assert!(paths.distance_to(d).is_none());
    }
}
