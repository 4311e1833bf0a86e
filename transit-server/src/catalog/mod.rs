//! Read-only access to the bus network.
//!
//! The planner never owns network data: it reads stops, paths and the
//! stops along each path through [`RouteCatalog`]. Reads are blocking and
//! the catalog is never mutated during a search, so concurrent searches
//! need no locking beyond what an implementation does internally.

mod error;
mod memory;
mod snapshot;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{
    Company, CompanyId, Coord, PathId, PathInfo, PathStop, Route, RouteId, Stop, StopId,
};

pub use error::CatalogError;
pub use memory::{CatalogBuilder, InMemoryCatalog};
pub use snapshot::{
    CatalogSnapshot, CompanyRecord, PathRecord, PathStopRecord, RouteRecord, StopRecord,
};

/// Entity counts for monitoring.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogStats {
    pub companies: usize,
    pub routes: usize,
    pub paths: usize,
    pub stops: usize,
    pub path_stops: usize,
    pub loaded_at: DateTime<Utc>,
}

/// Source of network data for the planner.
///
/// This abstraction allows the planner to be tested with mock data.
pub trait RouteCatalog: Send + Sync {
    /// Stops that may lie within `radius_meters` of `point`.
    ///
    /// This is a candidate set: implementations may return more stops than
    /// are actually within the radius (all stops, if there is no spatial
    /// index), but must not omit any that are.
    fn stops_near(&self, point: Coord, radius_meters: f64) -> Result<Vec<Arc<Stop>>, CatalogError>;

    /// Directional paths that serve `stop`, with route and company
    /// resolved, in a stable order.
    fn paths_containing_stop(&self, stop: StopId) -> Result<Vec<PathInfo>, CatalogError>;

    /// Stops along `path`, ordered by sequence position.
    fn path_stops_of(&self, path: PathId) -> Result<Vec<PathStop>, CatalogError>;

    /// Entity counts.
    fn stats(&self) -> Result<CatalogStats, CatalogError>;

    /// All companies, in catalog order.
    fn companies(&self) -> Result<Vec<Arc<Company>>, CatalogError>;

    /// Routes run by `company`, or `None` if there is no such company.
    fn routes_of_company(
        &self,
        company: CompanyId,
    ) -> Result<Option<Vec<Arc<Route>>>, CatalogError>;

    /// A route with its directional paths, or `None` if there is no such
    /// route.
    fn route(&self, route: RouteId) -> Result<Option<(Arc<Route>, Vec<PathInfo>)>, CatalogError>;

    /// One directional path, resolved.
    fn path(&self, path: PathId) -> Result<Option<PathInfo>, CatalogError>;
}
