//! Paths serving the stops near a query point.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::catalog::{CatalogError, RouteCatalog};
use crate::domain::{PathId, PathInfo, PathStop};
use crate::geo;

use super::proximity::ProximityMatch;

/// A path reachable from a query point, tagged with the stop used to get
/// on or off it.
#[derive(Debug, Clone)]
pub struct PathCandidate {
    pub info: PathInfo,
    /// The nearest-ranked match whose stop lies on this path.
    pub stop: ProximityMatch,
    /// Index of the polyline vertex nearest the stop.
    pub anchor: usize,
}

impl PathCandidate {
    pub fn id(&self) -> PathId {
        self.info.id()
    }
}

/// Paths containing any of `matches`, each tagged with the first match (in
/// the given nearest-first order) that lies on it.
///
/// The choice per path is greedy: a later, slightly farther stop on the
/// same path is never considered even if it would give a shorter ride.
/// Paths come out in discovery order.
pub fn paths_near<C: RouteCatalog + ?Sized>(
    catalog: &C,
    matches: &[ProximityMatch],
) -> Result<Vec<PathCandidate>, CatalogError> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for m in matches {
        for info in catalog.paths_containing_stop(m.stop.id)? {
            if !seen.insert(info.id()) {
                continue;
            }
            let anchor = geo::nearest_point_on_polyline(m.stop.location, info.points())
                .map(|n| n.index)
                .unwrap_or(0);
            candidates.push(PathCandidate {
                info,
                stop: m.clone(),
                anchor,
            });
        }
    }

    Ok(candidates)
}

/// Request-local memo of [`RouteCatalog::path_stops_of`].
pub struct PathStopCache<'a, C: RouteCatalog + ?Sized> {
    catalog: &'a C,
    entries: HashMap<PathId, Arc<[PathStop]>>,
}

impl<'a, C: RouteCatalog + ?Sized> PathStopCache<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self {
            catalog,
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, path: PathId) -> Result<Arc<[PathStop]>, CatalogError> {
        if let Some(stops) = self.entries.get(&path) {
            return Ok(stops.clone());
        }
        let stops: Arc<[PathStop]> = self.catalog.path_stops_of(path)?.into();
        self.entries.insert(path, stops.clone());
        Ok(stops)
    }
}
