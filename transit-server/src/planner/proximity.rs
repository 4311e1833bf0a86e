//! Stops near a point, with adaptive radius.
//!
//! The search starts with a small radius and doubles it until at least one
//! stop is found or the cap is reached. Dense areas stay cheap; sparse ones
//! still get an answer.

use std::sync::Arc;

use tracing::trace;

use crate::catalog::{CatalogError, RouteCatalog};
use crate::domain::{Coord, Stop};
use crate::geo;

use super::config::SearchConfig;
use super::timing::walking_minutes;

/// A stop found near a query point.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityMatch {
    pub stop: Arc<Stop>,
    pub distance_meters: f64,
    pub walking_minutes: f64,
}

/// Result of a proximity search.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximitySearch {
    /// Matches, nearest first. Empty if nothing lies within the cap.
    pub matches: Vec<ProximityMatch>,
    /// The radius at which the search stopped (meters).
    pub radius_meters: f64,
}

impl ProximitySearch {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Finds catalog stops near a point.
pub struct StopProximityIndex<'a, C: RouteCatalog + ?Sized> {
    catalog: &'a C,
    config: &'a SearchConfig,
}

impl<'a, C: RouteCatalog + ?Sized> StopProximityIndex<'a, C> {
    pub fn new(catalog: &'a C, config: &'a SearchConfig) -> Self {
        Self { catalog, config }
    }

    /// Stops within the configured initial radius, widening up to the
    /// configured maximum.
    pub fn nearby_stops(&self, point: Coord) -> Result<ProximitySearch, CatalogError> {
        self.nearby_stops_within(point, self.config.initial_radius_m, self.config.max_radius_m)
    }

    /// Stops within `initial_radius`, doubling the radius (capped at
    /// `max_radius`) while nothing is found.
    ///
    /// The loop terminates: each round either returns or strictly grows the
    /// radius towards `max_radius`, and returns once it gets there.
    pub fn nearby_stops_within(
        &self,
        point: Coord,
        initial_radius: f64,
        max_radius: f64,
    ) -> Result<ProximitySearch, CatalogError> {
        let max_radius = if max_radius.is_finite() { max_radius.max(0.0) } else { 0.0 };
        let mut radius = if initial_radius.is_finite() && initial_radius > 0.0 {
            initial_radius.min(max_radius)
        } else {
            max_radius
        };

        // One catalog read at the widest radius; each round only filters.
        let mut candidates: Vec<(Arc<Stop>, f64)> = self
            .catalog
            .stops_near(point, max_radius)?
            .into_iter()
            .map(|stop| {
                let d = geo::distance(point, stop.location);
                (stop, d)
            })
            .filter(|(_, d)| d.is_finite())
            .collect();
        // Stable: equidistant stops keep catalog order.
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

        loop {
            let matches: Vec<ProximityMatch> = candidates
                .iter()
                .take_while(|(_, d)| *d <= radius)
                .map(|(stop, d)| ProximityMatch {
                    stop: stop.clone(),
                    distance_meters: *d,
                    walking_minutes: walking_minutes(*d, self.config),
                })
                .collect();

            if !matches.is_empty() || radius >= max_radius {
                trace!(%point, radius, found = matches.len(), "proximity search finished");
                return Ok(ProximitySearch {
                    matches,
                    radius_meters: radius,
                });
            }

            radius = (radius * 2.0).min(max_radius);
        }
    }
}
