//! In-memory catalog.
//!
//! Holds a whole city network in memory with lookup tables for the
//! planner queries and for browsing. City-scale data (hundreds of stops and paths) fits
//! comfortably, and the search scans stay cheap.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{
    Company, CompanyId, Coord, DirectionalPath, PathId, PathInfo, PathStop, Route, RouteId, Stop,
    StopId,
};
use crate::geo::EARTH_RADIUS_M;

use super::{CatalogError, CatalogStats, RouteCatalog};

/// Meters per degree of latitude.
const METERS_PER_DEGREE: f64 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

/// Slack applied to the bounding-box prefilter so it never drops a stop
/// that the exact haversine check would keep.
const BOX_MARGIN: f64 = 1.1;

/// A validated, immutable catalog held in memory.
#[derive(Debug)]
pub struct InMemoryCatalog {
    companies: Vec<Arc<Company>>,
    routes: Vec<Arc<Route>>,
    /// Paths in insertion order.
    paths: Vec<PathInfo>,
    path_index: HashMap<PathId, usize>,
    /// Indices into `paths` for each route, ascending.
    paths_by_route: HashMap<RouteId, Vec<usize>>,
    stops: Vec<Arc<Stop>>,
    /// Stops along each path, ordered by sequence position.
    path_stops: HashMap<PathId, Vec<PathStop>>,
    /// Indices into `paths` serving each stop, ascending.
    paths_by_stop: HashMap<StopId, Vec<usize>>,
    path_stop_count: usize,
    loaded_at: DateTime<Utc>,
}

impl InMemoryCatalog {
    /// Loads a catalog from a JSON snapshot file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, CatalogError> {
        super::CatalogSnapshot::from_file(path)?.into_catalog()
    }
}

impl RouteCatalog for InMemoryCatalog {
    fn stops_near(&self, point: Coord, radius_meters: f64) -> Result<Vec<Arc<Stop>>, CatalogError> {
        if !point.is_finite() {
            return Ok(Vec::new());
        }
        if !radius_meters.is_finite() {
            return Ok(self.stops.clone());
        }

        let dlat = radius_meters.max(0.0) / METERS_PER_DEGREE * BOX_MARGIN;
        let extreme_lat = (point.lat.abs() + dlat).min(90.0);
        let dlng = dlat / extreme_lat.to_radians().cos().max(1e-6);

        Ok(self
            .stops
            .iter()
            .filter(|s| {
                (s.location.lat - point.lat).abs() <= dlat
                    && (s.location.lng - point.lng).abs() <= dlng
            })
            .cloned()
            .collect())
    }

    fn paths_containing_stop(&self, stop: StopId) -> Result<Vec<PathInfo>, CatalogError> {
        Ok(self
            .paths_by_stop
            .get(&stop)
            .map(|indices| indices.iter().map(|&i| self.paths[i].clone()).collect())
            .unwrap_or_default())
    }

    fn path_stops_of(&self, path: PathId) -> Result<Vec<PathStop>, CatalogError> {
        Ok(self.path_stops.get(&path).cloned().unwrap_or_default())
    }

    fn stats(&self) -> Result<CatalogStats, CatalogError> {
        Ok(CatalogStats {
            companies: self.companies.len(),
            routes: self.routes.len(),
            paths: self.paths.len(),
            stops: self.stops.len(),
            path_stops: self.path_stop_count,
            loaded_at: self.loaded_at,
        })
    }

    fn companies(&self) -> Result<Vec<Arc<Company>>, CatalogError> {
        Ok(self.companies.clone())
    }

    fn routes_of_company(
        &self,
        company: CompanyId,
    ) -> Result<Option<Vec<Arc<Route>>>, CatalogError> {
        if !self.companies.iter().any(|c| c.id == company) {
            return Ok(None);
        }
        Ok(Some(
            self.routes
                .iter()
                .filter(|r| r.company == company)
                .cloned()
                .collect(),
        ))
    }

    fn route(
        &self,
        route: RouteId,
    ) -> Result<Option<(Arc<Route>, Vec<PathInfo>)>, CatalogError> {
        let Some(found) = self.routes.iter().find(|r| r.id == route) else {
            return Ok(None);
        };
        let paths = self
            .paths_by_route
            .get(&route)
            .map(|indices| indices.iter().map(|&i| self.paths[i].clone()).collect())
            .unwrap_or_default();
        Ok(Some((found.clone(), paths)))
    }

    fn path(&self, path: PathId) -> Result<Option<PathInfo>, CatalogError> {
        Ok(self.path_index.get(&path).map(|&i| self.paths[i].clone()))
    }
}

/// A pending stop-on-path association.
#[derive(Debug, Clone)]
struct PendingPathStop {
    path: PathId,
    stop: StopId,
    order: u32,
    distance_meters: f64,
}

/// Builder for an [`InMemoryCatalog`].
///
/// Provides a fluent API for adding entities; every cross-entity invariant
/// is checked once in [`CatalogBuilder::build`].
///
/// # Example
///
/// ```
/// use transit_server::catalog::{CatalogBuilder, RouteCatalog};
/// use transit_server::domain::*;
///
/// let catalog = CatalogBuilder::new()
///     .company(Company { id: CompanyId(1), name: "Cotum".into(), color: "#3B82F6".into() })
///     .route(Route {
///         id: RouteId(1),
///         company: CompanyId(1),
///         name: "Centro".into(),
///         code: "A-25".into(),
///     })
///     .path(DirectionalPath::new(
///         PathId(1),
///         RouteId(1),
///         Direction::Outbound,
///         "#ff0000",
///         vec![Coord::new(-16.40, -71.54), Coord::new(-16.40, -71.53)],
///     ).unwrap())
///     .stop(Stop::new(StopId(1), "Plaza", Coord::new(-16.40, -71.54)))
///     .path_stop(PathId(1), StopId(1), 1, 0.0)
///     .build()
///     .unwrap();
///
/// assert_eq!(catalog.paths_containing_stop(StopId(1)).unwrap().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    companies: Vec<Company>,
    routes: Vec<Route>,
    paths: Vec<DirectionalPath>,
    stops: Vec<Stop>,
    path_stops: Vec<PendingPathStop>,
}

impl CatalogBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn company(mut self, company: Company) -> Self {
        self.companies.push(company);
        self
    }

    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    pub fn path(mut self, path: DirectionalPath) -> Self {
        self.paths.push(path);
        self
    }

    pub fn stop(mut self, stop: Stop) -> Self {
        self.stops.push(stop);
        self
    }

    /// Places `stop` on `path` at sequence position `order`.
    pub fn path_stop(
        mut self,
        path: PathId,
        stop: StopId,
        order: u32,
        distance_meters: f64,
    ) -> Self {
        self.path_stops.push(PendingPathStop {
            path,
            stop,
            order,
            distance_meters,
        });
        self
    }

    /// Validates and builds the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Invalid`] if:
    /// - Any id is duplicated within its entity kind
    /// - A route, path or path-stop references a missing entity
    /// - A route has two paths in the same direction
    /// - A stop appears twice on the same path
    pub fn build(self) -> Result<InMemoryCatalog, CatalogError> {
        let mut companies: HashMap<CompanyId, Arc<Company>> = HashMap::new();
        let mut company_order = Vec::with_capacity(self.companies.len());
        for company in self.companies {
            let id = company.id;
            let company = Arc::new(company);
            if companies.insert(id, company.clone()).is_some() {
                return Err(CatalogError::Invalid(format!("duplicate company {id}")));
            }
            company_order.push(company);
        }

        let mut routes: HashMap<RouteId, Arc<Route>> = HashMap::new();
        let mut route_order = Vec::with_capacity(self.routes.len());
        for route in self.routes {
            if !companies.contains_key(&route.company) {
                return Err(CatalogError::Invalid(format!(
                    "route {} references unknown company {}",
                    route.id, route.company
                )));
            }
            let id = route.id;
            let route = Arc::new(route);
            if routes.insert(id, route.clone()).is_some() {
                return Err(CatalogError::Invalid(format!("duplicate route {id}")));
            }
            route_order.push(route);
        }

        let mut paths = Vec::with_capacity(self.paths.len());
        let mut path_index = HashMap::new();
        let mut paths_by_route: HashMap<RouteId, Vec<usize>> = HashMap::new();
        let mut directions = HashSet::new();
        for path in self.paths {
            let route = routes.get(&path.route).cloned().ok_or_else(|| {
                CatalogError::Invalid(format!(
                    "path {} references unknown route {}",
                    path.id, path.route
                ))
            })?;
            if !directions.insert((path.route, path.direction)) {
                return Err(CatalogError::Invalid(format!(
                    "route {} already has a {} path",
                    path.route, path.direction
                )));
            }
            if path_index.insert(path.id, paths.len()).is_some() {
                return Err(CatalogError::Invalid(format!("duplicate path {}", path.id)));
            }
            paths_by_route.entry(path.route).or_default().push(paths.len());
            let company = companies.get(&route.company).cloned().ok_or_else(|| {
                CatalogError::Invalid(format!("unknown company {}", route.company))
            })?;
            paths.push(PathInfo {
                path: Arc::new(path),
                route,
                company,
            });
        }

        let mut stops = Vec::with_capacity(self.stops.len());
        let mut stop_index: HashMap<StopId, usize> = HashMap::new();
        for stop in self.stops {
            if stop_index.insert(stop.id, stops.len()).is_some() {
                return Err(CatalogError::Invalid(format!("duplicate stop {}", stop.id)));
            }
            stops.push(Arc::new(stop));
        }

        let path_stop_count = self.path_stops.len();
        let mut path_stops: HashMap<PathId, Vec<PathStop>> = HashMap::new();
        let mut paths_by_stop: HashMap<StopId, Vec<usize>> = HashMap::new();
        let mut seen = HashSet::new();
        for pending in self.path_stops {
            let &p = path_index.get(&pending.path).ok_or_else(|| {
                CatalogError::Invalid(format!(
                    "stop {} placed on unknown path {}",
                    pending.stop, pending.path
                ))
            })?;
            let &s = stop_index.get(&pending.stop).ok_or_else(|| {
                CatalogError::Invalid(format!(
                    "unknown stop {} placed on path {}",
                    pending.stop, pending.path
                ))
            })?;
            if !seen.insert((pending.path, pending.stop)) {
                return Err(CatalogError::Invalid(format!(
                    "stop {} appears twice on path {}",
                    pending.stop, pending.path
                )));
            }

            path_stops.entry(pending.path).or_default().push(PathStop {
                stop: stops[s].clone(),
                order: pending.order,
                distance_meters: pending.distance_meters,
            });
            paths_by_stop.entry(pending.stop).or_default().push(p);
        }

        // Stable sort keeps insertion order among equal positions.
        for list in path_stops.values_mut() {
            list.sort_by_key(|ps| ps.order);
        }
        for list in paths_by_stop.values_mut() {
            list.sort_unstable();
        }

        Ok(InMemoryCatalog {
            companies: company_order,
            routes: route_order,
            paths,
            path_index,
            paths_by_route,
            stops,
            path_stops,
            paths_by_stop,
            path_stop_count,
            loaded_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Direction;

    fn company(id: u64) -> Company {
        Company {
            id: CompanyId(id),
            name: format!("Company {id}"),
            color: "#3B82F6".to_string(),
        }
    }

    fn route(id: u64, company: u64) -> Route {
        Route {
            id: RouteId(id),
            company: CompanyId(company),
            name: format!("Route {id}"),
            code: format!("R-{id}"),
        }
    }

    fn path(id: u64, route: u64, direction: Direction) -> DirectionalPath {
        DirectionalPath::new(
            PathId(id),
            RouteId(route),
            direction,
            "#ff0000",
            vec![Coord::new(-16.40, -71.54), Coord::new(-16.40, -71.53)],
        )
        .unwrap()
    }

    fn stop(id: u64, lat: f64, lng: f64) -> Stop {
        Stop::new(StopId(id), format!("Stop {id}"), Coord::new(lat, lng))
    }

    fn base() -> CatalogBuilder {
        CatalogBuilder::new()
            .company(company(1))
            .route(route(1, 1))
            .path(path(10, 1, Direction::Outbound))
            .path(path(11, 1, Direction::Return))
            .stop(stop(1, -16.40, -71.54))
            .stop(stop(2, -16.40, -71.535))
            .stop(stop(3, -16.40, -71.53))
    }

    #[test]
    fn path_stops_sorted_by_order_with_stable_ties() {
        let catalog = base()
            .path_stop(PathId(10), StopId(3), 3, 0.0)
            .path_stop(PathId(10), StopId(1), 1, 0.0)
            .path_stop(PathId(10), StopId(2), 1, 0.0)
            .build()
            .unwrap();

        let ids: Vec<u64> = catalog
            .path_stops_of(PathId(10))
            .unwrap()
            .iter()
            .map(|ps| ps.stop.id.0)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(catalog.path_stops_of(PathId(99)).unwrap().is_empty());
    }

    #[test]
    fn paths_containing_stop_in_catalog_order() {
        let catalog = base()
            .path_stop(PathId(11), StopId(1), 5, 0.0)
            .path_stop(PathId(10), StopId(1), 1, 0.0)
            .build()
            .unwrap();

        let paths: Vec<PathId> = catalog
            .paths_containing_stop(StopId(1))
            .unwrap()
            .iter()
            .map(|p| p.id())
            .collect();
        assert_eq!(paths, vec![PathId(10), PathId(11)]);

        let info = &catalog.paths_containing_stop(StopId(1)).unwrap()[0];
        assert_eq!(info.route.code, "R-1");
        assert_eq!(info.company.name, "Company 1");
        assert!(catalog.paths_containing_stop(StopId(2)).unwrap().is_empty());
    }

    #[test]
    fn stops_near_prefilters_by_box() {
        let catalog = base().stop(stop(4, -16.50, -71.54)).build().unwrap();

        let near: Vec<u64> = catalog
            .stops_near(Coord::new(-16.40, -71.54), 2000.0)
            .unwrap()
            .iter()
            .map(|s| s.id.0)
            .collect();
        assert_eq!(near, vec![1, 2, 3]);

        let all = catalog
            .stops_near(Coord::new(-16.40, -71.54), f64::INFINITY)
            .unwrap();
        assert_eq!(all.len(), 4);

        let none = catalog
            .stops_near(Coord::new(f64::NAN, -71.54), 2000.0)
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn stats_count_entities() {
        let catalog = base()
            .path_stop(PathId(10), StopId(1), 1, 0.0)
            .build()
            .unwrap();
        let stats = catalog.stats().unwrap();
        assert_eq!(stats.companies, 1);
        assert_eq!(stats.routes, 1);
        assert_eq!(stats.paths, 2);
        assert_eq!(stats.stops, 3);
        assert_eq!(stats.path_stops, 1);
    }

    #[test]
    fn browses_companies_routes_and_paths() {
        let catalog = base()
            .company(company(2))
            .route(route(2, 2))
            .route(route(3, 1))
            .build()
            .unwrap();

        let companies: Vec<u64> = catalog
            .companies()
            .unwrap()
            .iter()
            .map(|c| c.id.0)
            .collect();
        assert_eq!(companies, vec![1, 2]);

        let routes: Vec<u64> = catalog
            .routes_of_company(CompanyId(1))
            .unwrap()
            .unwrap()
            .iter()
            .map(|r| r.id.0)
            .collect();
        assert_eq!(routes, vec![1, 3]);
        assert!(catalog.routes_of_company(CompanyId(9)).unwrap().is_none());

        let (route, paths) = catalog.route(RouteId(1)).unwrap().unwrap();
        assert_eq!(route.code, "R-1");
        let directions: Vec<Direction> = paths.iter().map(|p| p.path.direction).collect();
        assert_eq!(directions, vec![Direction::Outbound, Direction::Return]);

        let (_, paths) = catalog.route(RouteId(3)).unwrap().unwrap();
        assert!(paths.is_empty());
        assert!(catalog.route(RouteId(9)).unwrap().is_none());

        let path = catalog.path(PathId(11)).unwrap().unwrap();
        assert_eq!(path.route.id, RouteId(1));
        assert_eq!(path.company.id, CompanyId(1));
        assert!(catalog.path(PathId(99)).unwrap().is_none());
    }

    #[test]
    fn rejects_second_path_in_same_direction() {
        let err = base()
            .path(path(12, 1, Direction::Outbound))
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::Invalid(_)));
    }

    #[test]
    fn rejects_duplicate_stop_on_path() {
        let err = base()
            .path_stop(PathId(10), StopId(1), 1, 0.0)
            .path_stop(PathId(10), StopId(1), 2, 0.0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("appears twice"));
    }

    #[test]
    fn rejects_dangling_references() {
        let err = CatalogBuilder::new().route(route(1, 9)).build().unwrap_err();
        assert!(err.to_string().contains("unknown company"));

        let err = base().path(path(20, 7, Direction::Outbound)).build().unwrap_err();
        assert!(err.to_string().contains("unknown route"));

        let err = base()
            .path_stop(PathId(10), StopId(42), 1, 0.0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("unknown stop"));

        let err = base()
            .path_stop(PathId(42), StopId(1), 1, 0.0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("unknown path"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = base().stop(stop(1, 0.0, 0.0)).build().unwrap_err();
        assert!(err.to_string().contains("duplicate stop"));
    }
}
