use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use transit_server::catalog::{InMemoryCatalog, RouteCatalog};
use transit_server::planner::SearchConfig;
use transit_server::web::{AppState, create_router};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let catalog_path =
        std::env::var("CATALOG_PATH").expect("CATALOG_PATH must point to a catalog snapshot");
    let catalog = InMemoryCatalog::load(&catalog_path).expect("Failed to load catalog");

    let stats = catalog.stats().expect("Failed to read catalog statistics");
    info!(
        path = %catalog_path,
        companies = stats.companies,
        routes = stats.routes,
        paths = stats.paths,
        stops = stats.stops,
        path_stops = stats.path_stops,
        "catalog loaded"
    );

    let search_config = match std::env::var("SEARCH_CONFIG_PATH") {
        Ok(path) => {
            let config = SearchConfig::from_file(&path).expect("Failed to load search config");
            info!(path = %path, "search config loaded");
            config
        }
        Err(_) => SearchConfig::default(),
    };

    let state = AppState::new(catalog, search_config);
    let app = create_router(state);

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()
        .expect("BIND_ADDR must be a socket address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");
    info!(%addr, "transit connection finder listening");
    info!("  GET /health");
    info!("  GET /api/connections?origin_lat&origin_lng&dest_lat&dest_lng[&radius]");
    info!("  GET /api/stops/nearby?lat&lng");
    info!("  GET /api/stats");
    info!("  GET /api/companies");
    info!("  GET /api/companies/:id/routes");
    info!("  GET /api/routes/:id");
    info!("  GET /api/paths/:id");

    axum::serve(listener, app).await.expect("Server error");
}
