//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogStats;
use crate::domain::{
    Company, CompanyId, Coord, Direction, Distances, Journey, Leg, PathId, PathInfo, PathLabel,
    PathStop, Route, RouteId, StopDescriptor, StopId, Timing, TransferPoint, round_tenth,
};
use crate::planner::{ProximitySearch, SearchDiagnostics, SearchError, SearchRequest};

/// Request to find connections between two points.
///
/// Every field is kept as text so that a missing or malformed value becomes
/// a 400 with an explanatory body instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectionsRequest {
    pub origin_lat: Option<String>,
    pub origin_lng: Option<String>,
    pub dest_lat: Option<String>,
    pub dest_lng: Option<String>,

    /// Optional search radius in meters
    pub radius: Option<String>,
}

impl ConnectionsRequest {
    /// Parse into a validated planner request.
    pub fn to_search_request(&self) -> Result<SearchRequest, SearchError> {
        let origin = Coord::parse(
            required("origin_lat", &self.origin_lat)?,
            required("origin_lng", &self.origin_lng)?,
        )?;
        let destination = Coord::parse(
            required("dest_lat", &self.dest_lat)?,
            required("dest_lng", &self.dest_lng)?,
        )?;

        let mut request = SearchRequest::new(origin, destination);
        if let Some(radius) = optional("radius", &self.radius)? {
            request = request.with_radius(radius);
        }
        request.validate()?;
        Ok(request)
    }
}

/// Request for stops near a point.
#[derive(Debug, Default, Deserialize)]
pub struct NearbyStopsRequest {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

impl NearbyStopsRequest {
    pub fn to_coord(&self) -> Result<Coord, SearchError> {
        Ok(Coord::parse(
            required("lat", &self.lat)?,
            required("lng", &self.lng)?,
        )?)
    }
}

fn required(name: &str, value: &Option<String>) -> Result<f64, SearchError> {
    optional(name, value)?.ok_or_else(|| SearchError::InvalidInput(format!("missing {name}")))
}

fn optional(name: &str, value: &Option<String>) -> Result<Option<f64>, SearchError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text
            .parse::<f64>()
            .map(Some)
            .map_err(|_| {
                SearchError::InvalidInput(format!("{name} must be a number, got {text:?}"))
            }),
    }
}

/// Response for connection search.
#[derive(Debug, Serialize)]
pub struct ConnectionsResponse {
    /// Found journeys, best first
    pub journeys: Vec<JourneyResult>,

    pub diagnostics: DiagnosticsResult,
}

/// A journey option.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JourneyResult {
    Direct(DirectResult),
    Transfer(TransferResult),
}

/// A single-bus journey.
#[derive(Debug, Serialize)]
pub struct DirectResult {
    pub id: String,

    #[serde(flatten)]
    pub path: PathResult,

    /// Ridden geometry as `[lat, lng]` pairs
    pub polyline: Vec<Coord>,

    pub timing: TimingResult,
    pub distances: DistanceResult,
    pub boarding: StopResult,
    pub alighting: StopResult,

    /// Number of changes (always 0)
    pub transfers: usize,
}

/// A two-bus journey.
#[derive(Debug, Serialize)]
pub struct TransferResult {
    pub id: String,

    /// Both legs' geometry joined
    pub polyline: Vec<Coord>,

    pub timing: TimingResult,
    pub distances: DistanceResult,
    pub boarding: StopResult,
    pub alighting: StopResult,
    pub transfer: TransferPointResult,

    /// The two legs, in travel order
    pub legs: Vec<LegResult>,

    /// Number of changes (always 1)
    pub transfers: usize,
}

/// One ride within a transfer journey.
#[derive(Debug, Serialize)]
pub struct LegResult {
    #[serde(flatten)]
    pub path: PathResult,

    pub boarding: StopResult,
    pub alighting: StopResult,
    pub polyline: Vec<Coord>,
    pub distance_meters: f64,
    pub in_vehicle_minutes: f64,
}

/// Route, company and direction labels of a path.
#[derive(Debug, Serialize)]
pub struct PathResult {
    pub path_id: PathId,
    pub route: String,
    pub route_code: String,
    pub company: String,
    pub company_color: String,
    pub direction: Direction,

    /// Line color
    pub color: String,
}

/// Minutes breakdown.
#[derive(Debug, Serialize)]
pub struct TimingResult {
    pub total_minutes: f64,
    pub in_vehicle_minutes: f64,
    pub walking_minutes: f64,
    pub walking_origin_minutes: f64,
    pub walking_destination_minutes: f64,
    pub transfer_minutes: f64,
}

/// Meters breakdown.
#[derive(Debug, Serialize)]
pub struct DistanceResult {
    pub total_meters: f64,
    pub in_vehicle_meters: f64,
    pub walking_meters: f64,
    pub walking_origin_meters: f64,
    pub walking_destination_meters: f64,
}

/// A boarding, alighting or transfer place.
#[derive(Debug, Serialize)]
pub struct StopResult {
    /// Catalog stop, if the place is one
    pub id: Option<StopId>,
    pub name: String,
    pub location: Coord,
    pub distance_meters: f64,

    /// Position of the stop along its path
    pub position: Option<u32>,
}

/// Where the two legs of a transfer journey meet.
#[derive(Debug, Serialize)]
pub struct TransferPointResult {
    pub location: Coord,
    pub gap_meters: f64,
    pub stop: Option<StopResult>,
}

/// How the search went.
#[derive(Debug, Serialize)]
pub struct DiagnosticsResult {
    pub origin_stops: usize,
    pub destination_stops: usize,
    pub origin_radius_m: f64,
    pub destination_radius_m: f64,
    pub candidate_paths: usize,
    pub direct_journeys: usize,
    pub transfer_search_ran: bool,
    pub transfer_pairs_examined: usize,
    pub transfer_pairs_pruned: usize,
    pub transfer_journeys: usize,
    pub combination_cap_hit: bool,
}

/// Response for nearby stops.
#[derive(Debug, Serialize)]
pub struct NearbyStopsResponse {
    /// Radius the search widened to
    pub radius_meters: f64,

    /// Stops, nearest first
    pub stops: Vec<NearbyStopResult>,
}

#[derive(Debug, Serialize)]
pub struct NearbyStopResult {
    pub id: StopId,
    pub name: String,
    pub location: Coord,
    pub popular: bool,
    pub distance_meters: f64,
    pub walking_minutes: f64,
}

/// Response for catalog statistics.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub companies: usize,
    pub routes: usize,
    pub paths: usize,
    pub stops: usize,
    pub path_stops: usize,
    pub loaded_at: DateTime<Utc>,
}

/// Response listing companies.
#[derive(Debug, Serialize)]
pub struct CompaniesResponse {
    pub companies: Vec<CompanyResult>,
}

#[derive(Debug, Serialize)]
pub struct CompanyResult {
    pub id: CompanyId,
    pub name: String,
    pub color: String,

    /// Number of routes the company runs
    pub route_count: usize,
}

/// Response listing one company's routes.
#[derive(Debug, Serialize)]
pub struct CompanyRoutesResponse {
    pub company: CompanyResult,
    pub routes: Vec<RouteSummaryResult>,
}

#[derive(Debug, Serialize)]
pub struct RouteSummaryResult {
    pub id: RouteId,
    pub name: String,
    pub code: String,
}

/// A route with the geometry and stops of each direction.
#[derive(Debug, Serialize)]
pub struct RouteDetailResponse {
    pub id: RouteId,
    pub name: String,
    pub code: String,
    pub company: String,
    pub company_color: String,

    /// Outbound and/or return paths, in catalog order
    pub paths: Vec<PathDetailResult>,
}

/// One directional path with its geometry and stops.
#[derive(Debug, Serialize)]
pub struct PathDetailResult {
    #[serde(flatten)]
    pub path: PathResult,

    /// Recorded geometry as `[lat, lng]` pairs
    pub polyline: Vec<Coord>,

    /// File the geometry was recorded from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Stops in sequence order
    pub stops: Vec<PathStopResult>,
}

#[derive(Debug, Serialize)]
pub struct PathStopResult {
    pub id: StopId,
    pub name: String,
    pub location: Coord,
    pub popular: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub order: u32,

    /// Offset of the stop from the path geometry
    pub distance_meters: f64,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Present (and empty) on failed connection searches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journeys: Option<Vec<JourneyResult>>,
}

// Conversion implementations

impl JourneyResult {
    /// Create from a domain Journey.
    pub fn from_journey(journey: &Journey) -> Self {
        let timing = TimingResult::from_timing(journey.timing());
        let distances = DistanceResult::from_distances(journey.distances());
        let boarding = StopResult::from_descriptor(journey.boarding());
        let alighting = StopResult::from_descriptor(journey.alighting());

        match journey {
            Journey::Direct(j) => JourneyResult::Direct(DirectResult {
                id: j.id.clone(),
                path: PathResult::from_label(&j.leg.path),
                polyline: j.leg.polyline.clone(),
                timing,
                distances,
                boarding,
                alighting,
                transfers: journey.transfers(),
            }),
            Journey::Transfer(j) => JourneyResult::Transfer(TransferResult {
                id: j.id.clone(),
                polyline: journey.polyline(),
                timing,
                distances,
                boarding,
                alighting,
                transfer: TransferPointResult::from_transfer(&j.transfer),
                legs: j.legs.iter().map(LegResult::from_leg).collect(),
                transfers: journey.transfers(),
            }),
        }
    }
}

impl LegResult {
    /// Create from a domain Leg.
    pub fn from_leg(leg: &Leg) -> Self {
        Self {
            path: PathResult::from_label(&leg.path),
            boarding: StopResult::from_descriptor(&leg.board),
            alighting: StopResult::from_descriptor(&leg.alight),
            polyline: leg.polyline.clone(),
            distance_meters: leg.distance_meters,
            in_vehicle_minutes: leg.in_vehicle_minutes,
        }
    }
}

impl PathResult {
    fn from_label(label: &PathLabel) -> Self {
        Self {
            path_id: label.path,
            route: label.route_name.clone(),
            route_code: label.route_code.clone(),
            company: label.company.clone(),
            company_color: label.company_color.clone(),
            direction: label.direction,
            color: label.color.clone(),
        }
    }
}

impl TimingResult {
    fn from_timing(t: &Timing) -> Self {
        Self {
            total_minutes: t.total_minutes,
            in_vehicle_minutes: t.in_vehicle_minutes,
            walking_minutes: t.walking_minutes,
            walking_origin_minutes: t.walking_origin_minutes,
            walking_destination_minutes: t.walking_destination_minutes,
            transfer_minutes: t.transfer_minutes,
        }
    }
}

impl DistanceResult {
    fn from_distances(d: &Distances) -> Self {
        Self {
            total_meters: d.total_meters,
            in_vehicle_meters: d.in_vehicle_meters,
            walking_meters: d.walking_meters,
            walking_origin_meters: d.walking_origin_meters,
            walking_destination_meters: d.walking_destination_meters,
        }
    }
}

impl StopResult {
    fn from_descriptor(d: &StopDescriptor) -> Self {
        Self {
            id: d.stop,
            name: d.name.clone(),
            location: d.location,
            distance_meters: d.distance_meters,
            position: d.position,
        }
    }
}

impl TransferPointResult {
    fn from_transfer(t: &TransferPoint) -> Self {
        Self {
            location: t.location,
            gap_meters: t.gap_meters,
            stop: t.stop.as_ref().map(StopResult::from_descriptor),
        }
    }
}

impl From<&SearchDiagnostics> for DiagnosticsResult {
    fn from(d: &SearchDiagnostics) -> Self {
        Self {
            origin_stops: d.origin_stops,
            destination_stops: d.destination_stops,
            origin_radius_m: d.origin_radius_m,
            destination_radius_m: d.destination_radius_m,
            candidate_paths: d.candidate_paths,
            direct_journeys: d.direct_journeys,
            transfer_search_ran: d.transfer_search_ran,
            transfer_pairs_examined: d.transfer_pairs_examined,
            transfer_pairs_pruned: d.transfer_pairs_pruned,
            transfer_journeys: d.transfer_journeys,
            combination_cap_hit: d.combination_cap_hit,
        }
    }
}

impl From<&ProximitySearch> for NearbyStopsResponse {
    fn from(search: &ProximitySearch) -> Self {
        Self {
            radius_meters: search.radius_meters,
            stops: search
                .matches
                .iter()
                .map(|m| NearbyStopResult {
                    id: m.stop.id,
                    name: m.stop.name.clone(),
                    location: m.stop.location,
                    popular: m.stop.popular,
                    distance_meters: round_tenth(m.distance_meters),
                    walking_minutes: m.walking_minutes,
                })
                .collect(),
        }
    }
}

impl CompanyResult {
    pub fn from_company(company: &Company, route_count: usize) -> Self {
        Self {
            id: company.id,
            name: company.name.clone(),
            color: company.color.clone(),
            route_count,
        }
    }
}

impl From<&Route> for RouteSummaryResult {
    fn from(route: &Route) -> Self {
        Self {
            id: route.id,
            name: route.name.clone(),
            code: route.code.clone(),
        }
    }
}

impl RouteDetailResponse {
    /// Create from a route and its paths, each with its stops.
    pub fn from_route(
        route: &Route,
        company: &Company,
        paths: &[(PathInfo, Vec<PathStop>)],
    ) -> Self {
        Self {
            id: route.id,
            name: route.name.clone(),
            code: route.code.clone(),
            company: company.name.clone(),
            company_color: company.color.clone(),
            paths: paths
                .iter()
                .map(|(info, stops)| PathDetailResult::from_path(info, stops))
                .collect(),
        }
    }
}

impl PathDetailResult {
    pub fn from_path(info: &PathInfo, stops: &[PathStop]) -> Self {
        Self {
            path: PathResult::from_label(&PathLabel::from(info)),
            polyline: info.points().to_vec(),
            source: info.path.source.clone(),
            stops: stops
                .iter()
                .map(|ps| PathStopResult {
                    id: ps.stop.id,
                    name: ps.stop.name.clone(),
                    location: ps.stop.location,
                    popular: ps.stop.popular,
                    description: ps.stop.description.clone(),
                    order: ps.order,
                    distance_meters: round_tenth(ps.distance_meters),
                })
                .collect(),
        }
    }
}

impl From<CatalogStats> for StatsResponse {
    fn from(s: CatalogStats) -> Self {
        Self {
            companies: s.companies,
            routes: s.routes,
            paths: s.paths,
            stops: s.stops,
            path_stops: s.path_stops,
            loaded_at: s.loaded_at,
        }
    }
}
