//! Connection search between two points.
//!
//! Direct journeys are looked for first. Only if too few turn up does the
//! (much more expensive) transfer search run. Both feed the ranker.

use tracing::debug;

use crate::catalog::{CatalogError, RouteCatalog};
use crate::domain::{Coord, DomainError, Journey};

use super::candidates::{PathStopCache, paths_near};
use super::config::SearchConfig;
use super::direct::search_direct;
use super::proximity::StopProximityIndex;
use super::rank::rank_journeys;
use super::transfer::search_transfers;

/// Error from connection search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Missing, non-numeric or out-of-range input.
    #[error("invalid search request: {0}")]
    InvalidInput(String),

    /// The catalog could not be read.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl SearchError {
    /// True if the same request may succeed later.
    pub fn is_retryable(&self) -> bool {
        match self {
            SearchError::InvalidInput(_) => false,
            SearchError::Catalog(e) => e.is_retryable(),
        }
    }
}

impl From<DomainError> for SearchError {
    fn from(e: DomainError) -> Self {
        SearchError::InvalidInput(e.to_string())
    }
}

/// Request for connection search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub origin: Coord,
    pub destination: Coord,

    /// Caps how far from each point stops are looked for (meters).
    /// Defaults to [`SearchConfig::search_radius_m`].
    pub radius_meters: Option<f64>,
}

impl SearchRequest {
    /// Create a new search request.
    pub fn new(origin: Coord, destination: Coord) -> Self {
        Self {
            origin,
            destination,
            radius_meters: None,
        }
    }

    pub fn with_radius(mut self, radius_meters: f64) -> Self {
        self.radius_meters = Some(radius_meters);
        self
    }

    /// Validate the search request.
    pub fn validate(&self) -> Result<(), SearchError> {
        Coord::parse(self.origin.lat, self.origin.lng)?;
        Coord::parse(self.destination.lat, self.destination.lng)?;

        if let Some(radius) = self.radius_meters {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(SearchError::InvalidInput(format!(
                    "radius must be a positive number of meters, got {radius}"
                )));
            }
        }

        Ok(())
    }
}

/// Counters describing how a search went.
///
/// An empty journey list is not an error; these say why it was empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchDiagnostics {
    pub origin_stops: usize,
    pub destination_stops: usize,
    /// Radius at which the origin proximity search stopped (meters).
    pub origin_radius_m: f64,
    pub destination_radius_m: f64,
    /// Paths serving both an origin stop and a destination stop.
    pub candidate_paths: usize,
    pub direct_journeys: usize,
    pub transfer_search_ran: bool,
    pub transfer_pairs_examined: usize,
    pub transfer_pairs_pruned: usize,
    pub transfer_journeys: usize,
    /// Transfer exploration was truncated by the combination cap.
    pub combination_cap_hit: bool,
}

/// Result of connection search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Found journeys, ranked best-first.
    pub journeys: Vec<Journey>,
    pub diagnostics: SearchDiagnostics,
}

/// Finds journeys between two points.
///
/// Stateless between requests: everything it builds is request-local, and
/// the catalog is only read.
pub struct Finder<'a, C: RouteCatalog + ?Sized> {
    catalog: &'a C,
    config: &'a SearchConfig,
}

impl<'a, C: RouteCatalog + ?Sized> Finder<'a, C> {
    /// Create a new finder.
    pub fn new(catalog: &'a C, config: &'a SearchConfig) -> Self {
        Self { catalog, config }
    }

    /// Search for journeys from `request.origin` to `request.destination`.
    pub fn find_connections(&self, request: &SearchRequest) -> Result<SearchOutcome, SearchError> {
        request.validate()?;

        let max_radius = request
            .radius_meters
            .unwrap_or(self.config.search_radius_m)
            .min(self.config.max_radius_m);
        let initial_radius = self.config.initial_radius_m.min(max_radius);

        let proximity = StopProximityIndex::new(self.catalog, self.config);
        let near_origin =
            proximity.nearby_stops_within(request.origin, initial_radius, max_radius)?;
        let near_destination =
            proximity.nearby_stops_within(request.destination, initial_radius, max_radius)?;

        let mut diagnostics = SearchDiagnostics {
            origin_stops: near_origin.matches.len(),
            destination_stops: near_destination.matches.len(),
            origin_radius_m: near_origin.radius_meters,
            destination_radius_m: near_destination.radius_meters,
            ..SearchDiagnostics::default()
        };

        if near_origin.is_empty() || near_destination.is_empty() {
            debug!(
                origin = %request.origin,
                destination = %request.destination,
                origin_stops = diagnostics.origin_stops,
                destination_stops = diagnostics.destination_stops,
                "no stops near one end"
            );
            return Ok(SearchOutcome {
                journeys: Vec::new(),
                diagnostics,
            });
        }

        let from_origin = paths_near(self.catalog, &near_origin.matches)?;
        let to_destination = paths_near(self.catalog, &near_destination.matches)?;
        let mut cache = PathStopCache::new(self.catalog);

        let direct = search_direct(&mut cache, &from_origin, &to_destination, self.config)?;
        diagnostics.candidate_paths = direct.candidate_paths;
        diagnostics.direct_journeys = direct.journeys.len();

        let transfers = if direct.journeys.len() < self.config.min_direct_results {
            let transfer =
                search_transfers(&mut cache, &from_origin, &to_destination, self.config)?;
            diagnostics.transfer_search_ran = true;
            diagnostics.transfer_pairs_examined = transfer.pairs_examined;
            diagnostics.transfer_pairs_pruned = transfer.pairs_pruned;
            diagnostics.transfer_journeys = transfer.journeys.len();
            diagnostics.combination_cap_hit = transfer.capped;
            transfer.journeys
        } else {
            Vec::new()
        };

        let journeys = rank_journeys(direct.journeys, transfers, self.config.max_results);

        debug!(
            origin = %request.origin,
            destination = %request.destination,
            direct = diagnostics.direct_journeys,
            transfer = diagnostics.transfer_journeys,
            returned = journeys.len(),
            "connection search finished"
        );

        Ok(SearchOutcome {
            journeys,
            diagnostics,
        })
    }
}
