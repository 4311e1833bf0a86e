//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::catalog::CatalogError;
use crate::domain::{CompanyId, PathId, RouteId};
use crate::planner::{Finder, SearchError, StopProximityIndex};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/connections", get(find_connections))
        .route("/api/stops/nearby", get(nearby_stops))
        .route("/api/stats", get(catalog_stats))
        .route("/api/companies", get(list_companies))
        .route("/api/companies/:id/routes", get(company_routes))
        .route("/api/routes/:id", get(route_detail))
        .route("/api/paths/:id", get(path_detail))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Run catalog-bound work off the async executor.
async fn run_blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal {
            message: format!("search task failed: {e}"),
        })?
}

/// Find journeys between two points.
async fn find_connections(
    State(state): State<AppState>,
    Query(req): Query<ConnectionsRequest>,
) -> Result<Json<ConnectionsResponse>, AppError> {
    let request = req.to_search_request()?;

    let outcome = run_blocking(move || {
        let finder = Finder::new(state.catalog.as_ref(), &state.config);
        Ok(finder.find_connections(&request)?)
    })
    .await?;

    let journeys = outcome
        .journeys
        .iter()
        .map(JourneyResult::from_journey)
        .collect();

    Ok(Json(ConnectionsResponse {
        journeys,
        diagnostics: DiagnosticsResult::from(&outcome.diagnostics),
    }))
}

/// Stops near one point, nearest first.
async fn nearby_stops(
    State(state): State<AppState>,
    Query(req): Query<NearbyStopsRequest>,
) -> Result<Json<NearbyStopsResponse>, AppError> {
    let point = req.to_coord().map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;

    let search = run_blocking(move || {
        let index = StopProximityIndex::new(state.catalog.as_ref(), &state.config);
        Ok(index.nearby_stops(point)?)
    })
    .await?;

    Ok(Json(NearbyStopsResponse::from(&search)))
}

/// Catalog totals.
async fn catalog_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let stats = run_blocking(move || Ok(state.catalog.stats()?)).await?;
    Ok(Json(StatsResponse::from(stats)))
}

/// All companies with their route counts.
async fn list_companies(
    State(state): State<AppState>,
) -> Result<Json<CompaniesResponse>, AppError> {
    let response = run_blocking(move || {
        let catalog = state.catalog.as_ref();
        let mut companies = Vec::new();
        for company in catalog.companies()? {
            let routes = catalog.routes_of_company(company.id)?.unwrap_or_default();
            companies.push(CompanyResult::from_company(&company, routes.len()));
        }
        Ok(CompaniesResponse { companies })
    })
    .await?;

    Ok(Json(response))
}

/// Routes run by one company.
async fn company_routes(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<CompanyRoutesResponse>, AppError> {
    let company_id = CompanyId(id);
    let missing = move || AppError::NotFound {
        message: format!("company {company_id} not found"),
    };

    let response = run_blocking(move || {
        let catalog = state.catalog.as_ref();
        let routes = catalog.routes_of_company(company_id)?.ok_or_else(missing)?;
        let company = catalog
            .companies()?
            .into_iter()
            .find(|c| c.id == company_id)
            .ok_or_else(missing)?;

        Ok(CompanyRoutesResponse {
            company: CompanyResult::from_company(&company, routes.len()),
            routes: routes
                .iter()
                .map(|r| RouteSummaryResult::from(r.as_ref()))
                .collect(),
        })
    })
    .await?;

    Ok(Json(response))
}

/// A route with both directions' geometry and stops.
async fn route_detail(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<RouteDetailResponse>, AppError> {
    let route_id = RouteId(id);

    let response = run_blocking(move || {
        let catalog = state.catalog.as_ref();
        let (route, paths) = catalog.route(route_id)?.ok_or_else(|| AppError::NotFound {
            message: format!("route {route_id} not found"),
        })?;
        let company = catalog
            .companies()?
            .into_iter()
            .find(|c| c.id == route.company)
            .ok_or_else(|| AppError::Internal {
                message: format!(
                    "route {route_id} references unknown company {}",
                    route.company
                ),
            })?;

        let mut detailed = Vec::with_capacity(paths.len());
        for info in paths {
            let stops = catalog.path_stops_of(info.id())?;
            detailed.push((info, stops));
        }

        Ok(RouteDetailResponse::from_route(&route, &company, &detailed))
    })
    .await?;

    Ok(Json(response))
}

/// One directional path's geometry and stops.
async fn path_detail(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<PathDetailResult>, AppError> {
    let path_id = PathId(id);

    let response = run_blocking(move || {
        let catalog = state.catalog.as_ref();
        let info = catalog.path(path_id)?.ok_or_else(|| AppError::NotFound {
            message: format!("path {path_id} not found"),
        })?;
        let stops = catalog.path_stops_of(path_id)?;
        Ok(PathDetailResult::from_path(&info, &stops))
    })
    .await?;

    Ok(Json(response))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Connection search rejected its input; answered with an empty list
    InvalidSearch { message: String },
    BadRequest { message: String },
    NotFound { message: String },
    /// The catalog is temporarily unreachable
    Unavailable { message: String },
    Internal { message: String },
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        if e.is_retryable() {
            AppError::Unavailable {
                message: e.to_string(),
            }
        } else {
            AppError::Internal {
                message: e.to_string(),
            }
        }
    }
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::InvalidInput(_) => AppError::InvalidSearch {
                message: e.to_string(),
            },
            SearchError::Catalog(e) => AppError::from(e),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidSearch { .. } | AppError::BadRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, journeys) = match self {
            AppError::InvalidSearch { message } => (message, Some(Vec::new())),
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::Unavailable { message }
            | AppError::Internal { message } => (message, None),
        };

        if status == StatusCode::SERVICE_UNAVAILABLE {
            warn!(%status, "{message}");
        } else if status.is_server_error() {
            error!(%status, "{message}");
        } else {
            debug!(%status, "{message}");
        }

        let body = Json(ErrorResponse {
            error: message,
            journeys,
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;
    use crate::catalog::{CatalogBuilder, CatalogStats, RouteCatalog};
    use crate::domain::*;
    use crate::planner::SearchConfig;

    const LAT: f64 = -16.40;
    const LNG: f64 = -71.55;

    fn eastbound(i: usize) -> Coord {
        Coord::new(LAT, LNG + 0.001 * i as f64)
    }

    fn state() -> AppState {
        let catalog = CatalogBuilder::new()
            .company(Company {
                id: CompanyId(1),
                name: "Cotum".to_string(),
                color: "#3B82F6".to_string(),
            })
            .route(Route {
                id: RouteId(1),
                company: CompanyId(1),
                name: "Centro".to_string(),
                code: "A-25".to_string(),
            })
            .path(
                DirectionalPath::new(
                    PathId(1),
                    RouteId(1),
                    Direction::Outbound,
                    "#e74c3c",
                    (0..12).map(eastbound).collect(),
                )
                .unwrap(),
            )
            .stop(Stop::new(StopId(1), "Mercado", eastbound(2)))
            .stop(Stop::new(StopId(2), "Hospital", eastbound(9)))
            .path_stop(PathId(1), StopId(1), 1, 0.0)
            .path_stop(PathId(1), StopId(2), 2, 0.0)
            .build()
            .unwrap();
        AppState::new(catalog, SearchConfig::default())
    }

    struct DownCatalog;

    impl RouteCatalog for DownCatalog {
        fn stops_near(&self, _point: Coord, _radius: f64) -> Result<Vec<Arc<Stop>>, CatalogError> {
            Err(CatalogError::Unavailable("timeout".to_string()))
        }

        fn paths_containing_stop(&self, _stop: StopId) -> Result<Vec<PathInfo>, CatalogError> {
            Err(CatalogError::Unavailable("timeout".to_string()))
        }

        fn path_stops_of(&self, _path: PathId) -> Result<Vec<PathStop>, CatalogError> {
            Err(CatalogError::Unavailable("timeout".to_string()))
        }

        fn stats(&self) -> Result<CatalogStats, CatalogError> {
            Err(CatalogError::Invalid("dangling path stop".to_string()))
        }

        fn companies(&self) -> Result<Vec<Arc<Company>>, CatalogError> {
            Err(CatalogError::Unavailable("timeout".to_string()))
        }

        fn routes_of_company(
            &self,
            _company: CompanyId,
        ) -> Result<Option<Vec<Arc<Route>>>, CatalogError> {
            Err(CatalogError::Unavailable("timeout".to_string()))
        }

        fn route(
            &self,
            _route: RouteId,
        ) -> Result<Option<(Arc<Route>, Vec<PathInfo>)>, CatalogError> {
            Err(CatalogError::Unavailable("timeout".to_string()))
        }

        fn path(&self, _path: PathId) -> Result<Option<PathInfo>, CatalogError> {
            Err(CatalogError::Unavailable("timeout".to_string()))
        }
    }

    fn connections(origin: Coord, destination: Coord) -> ConnectionsRequest {
        ConnectionsRequest {
            origin_lat: Some(origin.lat.to_string()),
            origin_lng: Some(origin.lng.to_string()),
            dest_lat: Some(destination.lat.to_string()),
            dest_lng: Some(destination.lng.to_string()),
            radius: None,
        }
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn connections_found() {
        let Json(response) = find_connections(
            State(state()),
            Query(connections(eastbound(2), eastbound(9))),
        )
        .await
        .unwrap();

        assert_eq!(response.journeys.len(), 1);
        assert!(matches!(response.journeys[0], JourneyResult::Direct(_)));
        assert_eq!(response.diagnostics.candidate_paths, 1);
    }

    #[tokio::test]
    async fn invalid_search_is_400_with_empty_journeys() {
        let mut req = connections(eastbound(2), eastbound(9));
        req.dest_lat = Some("abc".to_string());

        let err = find_connections(State(state()), Query(req))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidSearch { .. }));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["journeys"], serde_json::json!([]));
        assert!(body["error"].as_str().unwrap().contains("dest_lat"));
    }

    #[tokio::test]
    async fn unavailable_catalog_is_503() {
        let state = AppState::new(DownCatalog, SearchConfig::default());
        let err = find_connections(State(state), Query(connections(eastbound(2), eastbound(9))))
            .await
            .unwrap_err();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert!(body.get("journeys").is_none());
    }

    #[tokio::test]
    async fn invalid_catalog_is_500() {
        let state = AppState::new(DownCatalog, SearchConfig::default());
        let err = catalog_stats(State(state)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn nearby_stops_nearest_first() {
        let req = NearbyStopsRequest {
            lat: Some(eastbound(8).lat.to_string()),
            lng: Some(eastbound(8).lng.to_string()),
        };
        let Json(response) = nearby_stops(State(state()), Query(req)).await.unwrap();

        assert_eq!(response.stops.len(), 1);
        assert_eq!(response.stops[0].id, StopId(2));
        assert_eq!(response.radius_meters, 500.0);
    }

    #[tokio::test]
    async fn nearby_stops_rejects_bad_point() {
        let req = NearbyStopsRequest {
            lat: Some("-16.4".to_string()),
            lng: Some("999".to_string()),
        };
        let err = nearby_stops(State(state()), Query(req)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stats_reports_totals() {
        let Json(stats) = catalog_stats(State(state())).await.unwrap();
        assert_eq!(stats.companies, 1);
        assert_eq!(stats.routes, 1);
        assert_eq!(stats.paths, 1);
        assert_eq!(stats.stops, 2);
        assert_eq!(stats.path_stops, 2);
    }

    #[tokio::test]
    async fn companies_listed_with_route_counts() {
        let Json(response) = list_companies(State(state())).await.unwrap();

        assert_eq!(response.companies.len(), 1);
        let company = &response.companies[0];
        assert_eq!(company.id, CompanyId(1));
        assert_eq!(company.name, "Cotum");
        assert_eq!(company.route_count, 1);
    }

    #[tokio::test]
    async fn company_routes_listed() {
        let Json(response) = company_routes(State(state()), Path(1)).await.unwrap();

        assert_eq!(response.company.name, "Cotum");
        assert_eq!(response.routes.len(), 1);
        assert_eq!(response.routes[0].id, RouteId(1));
        assert_eq!(response.routes[0].code, "A-25");
    }

    #[tokio::test]
    async fn unknown_company_is_404() {
        let err = company_routes(State(state()), Path(7)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "company 7 not found");
        assert!(body.get("journeys").is_none());
    }

    #[tokio::test]
    async fn route_detail_carries_paths_and_stops() {
        let Json(response) = route_detail(State(state()), Path(1)).await.unwrap();

        assert_eq!(response.name, "Centro");
        assert_eq!(response.company, "Cotum");
        assert_eq!(response.company_color, "#3B82F6");
        assert_eq!(response.paths.len(), 1);

        let path = &response.paths[0];
        assert_eq!(path.path.path_id, PathId(1));
        assert_eq!(path.polyline.len(), 12);
        let stops: Vec<_> = path.stops.iter().map(|s| s.id).collect();
        assert_eq!(stops, vec![StopId(1), StopId(2)]);
        assert_eq!(path.stops[1].order, 2);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let err = route_detail(State(state()), Path(42)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn path_detail_found() {
        let Json(response) = path_detail(State(state()), Path(1)).await.unwrap();

        assert_eq!(response.path.route_code, "A-25");
        assert_eq!(response.path.direction, Direction::Outbound);
        assert_eq!(response.stops.len(), 2);
        assert_eq!(response.stops[0].name, "Mercado");
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let err = path_detail(State(state()), Path(3)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn browsing_an_unavailable_catalog_is_503() {
        let state = AppState::new(DownCatalog, SearchConfig::default());
        let err = list_companies(State(state)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
