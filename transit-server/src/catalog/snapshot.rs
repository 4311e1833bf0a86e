//! JSON snapshot format for loading a catalog from disk.
//!
//! A snapshot is the whole network in one document:
//!
//! ```json
//! {
//!   "companies": [{ "id": 1, "name": "Cotum", "color": "#3B82F6" }],
//!   "routes": [{ "id": 1, "company": 1, "name": "Centro", "code": "A-25" }],
//!   "paths": [{ "id": 1, "route": 1, "direction": "OUTBOUND", "color": "#e74c3c",
//!               "points": [[-16.42, -71.55], [-16.40, -71.538]] }],
//!   "stops": [{ "id": 1, "name": "Terminal", "lat": -16.42, "lng": -71.55 }],
//!   "path_stops": [{ "path": 1, "stop": 1, "order": 1, "distance_meters": 4.2 }]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{
    Company, CompanyId, Coord, Direction, DirectionalPath, PathId, Route, RouteId, Stop, StopId,
};

use super::{CatalogBuilder, CatalogError, InMemoryCatalog};

fn default_color() -> String {
    "#3B82F6".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub id: CompanyId,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRecord {
    pub id: RouteId,
    pub company: CompanyId,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathRecord {
    pub id: PathId,
    pub route: RouteId,
    pub direction: Direction,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub source: Option<String>,
    /// `[lat, lng]` pairs in travel order.
    pub points: Vec<Coord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopRecord {
    pub id: StopId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub popular: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathStopRecord {
    pub path: PathId,
    pub stop: StopId,
    pub order: u32,
    #[serde(default)]
    pub distance_meters: f64,
}

/// The serialized form of a whole catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub companies: Vec<CompanyRecord>,
    #[serde(default)]
    pub routes: Vec<RouteRecord>,
    #[serde(default)]
    pub paths: Vec<PathRecord>,
    #[serde(default)]
    pub stops: Vec<StopRecord>,
    #[serde(default)]
    pub path_stops: Vec<PathStopRecord>,
}

impl CatalogSnapshot {
    /// Reads and parses a snapshot file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parses a snapshot from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validates the snapshot and builds an in-memory catalog.
    pub fn into_catalog(self) -> Result<InMemoryCatalog, CatalogError> {
        let mut builder = CatalogBuilder::new();

        for c in self.companies {
            builder = builder.company(Company {
                id: c.id,
                name: c.name,
                color: c.color,
            });
        }

        for r in self.routes {
            builder = builder.route(Route {
                id: r.id,
                company: r.company,
                name: r.name,
                code: r.code,
            });
        }

        for p in self.paths {
            let mut path = DirectionalPath::new(p.id, p.route, p.direction, p.color, p.points)?;
            if let Some(source) = p.source {
                path = path.with_source(source);
            }
            builder = builder.path(path);
        }

        for s in self.stops {
            let mut stop = Stop::new(s.id, s.name, Coord::new(s.lat, s.lng));
            stop.popular = s.popular;
            stop.description = s.description;
            builder = builder.stop(stop);
        }

        for ps in self.path_stops {
            builder = builder.path_stop(ps.path, ps.stop, ps.order, ps.distance_meters);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RouteCatalog;
    use std::io::Write;

    const SAMPLE: &str = r##"{
        "companies": [{ "id": 1, "name": "Cotum", "color": "#3B82F6" }],
        "routes": [{ "id": 1, "company": 1, "name": "Centro Historico", "code": "A-25" }],
        "paths": [{
            "id": 7, "route": 1, "direction": "OUTBOUND", "color": "#e74c3c",
            "source": "ruta-a-ida.kml",
            "points": [[-16.4200, -71.5500], [-16.4015, -71.5380], [-16.3989, -71.5369]]
        }],
        "stops": [
            {
                "id": 1, "name": "Terminal Terrestre",
                "lat": -16.4200, "lng": -71.5500, "popular": true
            },
            { "id": 2, "name": "Plaza de Armas", "lat": -16.3989, "lng": -71.5369 }
        ],
        "path_stops": [
            { "path": 7, "stop": 2, "order": 2, "distance_meters": 3.5 },
            { "path": 7, "stop": 1, "order": 1 }
        ]
    }"##;

    #[test]
    fn parse_and_build() {
        let catalog = CatalogSnapshot::from_json(SAMPLE)
            .unwrap()
            .into_catalog()
            .unwrap();

        let path_stops = catalog.path_stops_of(PathId(7)).unwrap();
        assert_eq!(path_stops.len(), 2);
        assert_eq!(path_stops[0].stop.name, "Terminal Terrestre");
        assert!(path_stops[0].stop.popular);
        assert_eq!(path_stops[1].distance_meters, 3.5);

        let info = &catalog.paths_containing_stop(StopId(2)).unwrap()[0];
        assert_eq!(info.points().len(), 3);
        assert_eq!(info.path.source.as_deref(), Some("ruta-a-ida.kml"));
        assert_eq!(info.route.code, "A-25");
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let catalog = InMemoryCatalog::load(&path).unwrap();
        assert_eq!(catalog.stats().unwrap().stops, 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = InMemoryCatalog::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }

    #[test]
    fn malformed_json_is_json_error() {
        let err = CatalogSnapshot::from_json("{ \"stops\": [").unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)));
    }

    #[test]
    fn short_polyline_is_invalid() {
        let json = r#"{
            "companies": [{ "id": 1, "name": "C" }],
            "routes": [{ "id": 1, "company": 1, "name": "R", "code": "R" }],
            "paths": [{ "id": 1, "route": 1, "direction": "RETURN", "points": [[0.0, 0.0]] }]
        }"#;
        let err = CatalogSnapshot::from_json(json)
            .unwrap()
            .into_catalog()
            .unwrap_err();
        assert!(matches!(err, CatalogError::Invalid(_)));
    }
}
