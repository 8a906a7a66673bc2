//! Graph shared between concurrent routing requests
//!
//! All mutation happens under the write lock, so readers never observe a
//! partially simplified or partially augmented graph. Routing works on a
//! private copy: POIs attached for one request are invisible to others
//! unless they were attached through [`SharedTrailGraph::attach_pois`].

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    Coordinate, Error, Kilometers, Poi, TrailGraph,
    algo::simplify::{SimplifyStats, simplify_graph},
    loading::{RoutingConfig, SimplifyConfig},
    routing::{PoiConnection, RoutePlan, attach_pois, route_to_pois},
};

#[derive(Debug, Clone, Default)]
pub struct SharedTrailGraph {
    inner: Arc<RwLock<TrailGraph>>,
}

impl SharedTrailGraph {
    pub fn new(graph: TrailGraph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, TrailGraph>, Error> {
        self.inner.read().map_err(|_| Error::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, TrailGraph>, Error> {
        self.inner.write().map_err(|_| Error::LockPoisoned)
    }

    /// Simplifies the shared graph under the write lock
    ///
    /// # Errors
    ///
    /// Returns simplification errors or [`Error::LockPoisoned`].
    pub fn simplify(&self, config: &SimplifyConfig) -> Result<SimplifyStats, Error> {
        let mut graph = self.write()?;
        simplify_graph(&mut graph, config)
    }

    /// Attaches POIs to the shared graph itself, making them visible to
    /// every later reader
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if a writer panicked.
    pub fn attach_pois(
        &self,
        pois: &[Poi],
        max_connect_distance: Kilometers,
    ) -> Result<Vec<PoiConnection>, Error> {
        let mut graph = self.write()?;
        Ok(attach_pois(&mut graph, pois, max_connect_distance))
    }

    /// Routes to `pois` on a private copy of the graph; the shared graph is
    /// left unchanged
    ///
    /// # Errors
    ///
    /// See [`route_to_pois`].
    pub fn route_to_pois(
        &self,
        start: Coordinate,
        pois: &[Poi],
        config: &RoutingConfig,
    ) -> Result<RoutePlan, Error> {
        let mut working = self.snapshot()?;
        route_to_pois(&mut working, start, pois, config)
    }

    /// Consistent copy of the current graph
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if a writer panicked.
    pub fn snapshot(&self) -> Result<TrailGraph, Error> {
        Ok(self.read()?.clone())
    }

    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if a writer panicked.
    pub fn node_count(&self) -> Result<usize, Error> {
        Ok(self.read()?.node_count())
    }
}

impl From<TrailGraph> for SharedTrailGraph {
    fn from(graph: TrailGraph) -> Self {
        Self::new(graph)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::Segment;

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon)
    }

    fn shared_trail() -> SharedTrailGraph {
        let nodes: Vec<Coordinate> = (0..10).map(|i| c(0.0, f64::from(i) * 0.001)).collect();
        let segments: Vec<Segment> = nodes
            .windows(2)
            .map(|pair| Segment::new(pair[0], pair[1]))
            .collect();
        SharedTrailGraph::new(TrailGraph::from_segments(&segments))
    }

    #[test]
    fn test_concurrent_routing_does_not_leak_pois() {
        let shared = shared_trail();
        let before = shared.node_count().unwrap();

        thread::scope(|scope| {
            for worker in 0..4 {
                let shared = &shared;
                scope.spawn(move || {
                    let poi = Poi::new(format!("poi-{worker}"), c(0.001, f64::from(worker) * 0.002));
                    let plan = shared
                        .route_to_pois(c(0.0, 0.0), &[poi], &RoutingConfig::default())
                        .unwrap();
                    assert!(plan.results[0].outcome.is_reachable());
                });
            }
        });

        assert_eq!(shared.node_count().unwrap(), before);
    }

    #[test]
    fn test_explicit_shared_attachment_is_visible() {
        let shared = shared_trail();
        let before = shared.node_count().unwrap();

        let connections = shared
            .attach_pois(&[Poi::new("Shelter", c(0.001, 0.0))], 10.0)
            .unwrap();

        assert!(connections[0].is_connected());
        assert_eq!(shared.node_count().unwrap(), before + 1);
    }

    #[test]
    fn test_simplify_under_write_lock() {
        let shared = shared_trail();
        let stats = shared.simplify(&SimplifyConfig::strict()).unwrap();

        assert_eq!(stats.removed_nodes, 8);
        assert_eq!(shared.node_count().unwrap(), 2);
    }
}
