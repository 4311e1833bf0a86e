//! Bus network entities: companies, routes, directional paths and stops.
//!
//! These are created by data-loading tooling and are read-only while a
//! search runs. Invariants that involve more than one entity (for example
//! "at most one path per route and direction") are enforced by the catalog
//! builder, not here.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{CompanyId, Coord, DomainError, PathId, RouteId, StopId};

/// A bus company operating one or more routes.
#[derive(Debug, Clone, PartialEq)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    /// Brand color as a hex string, e.g. `#3B82F6`.
    pub color: String,
}

/// A named bus line.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub id: RouteId,
    pub company: CompanyId,
    /// Display name, e.g. "Alto Selva Alegre - Centro".
    pub name: String,
    /// Unique short code, e.g. "A-25".
    pub code: String,
}

/// Direction of travel of a [`DirectionalPath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Outbound,
    Return,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Outbound => "OUTBOUND",
            Direction::Return => "RETURN",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One concrete direction of travel for a route.
///
/// Carries the recorded polyline. Point order is travel order, and there
/// are always at least two points.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalPath {
    pub id: PathId,
    pub route: RouteId,
    pub direction: Direction,
    /// Line color as a hex string.
    pub color: String,
    /// Tag of the file the geometry was loaded from, if any.
    pub source: Option<String>,
    points: Vec<Coord>,
}

impl DirectionalPath {
    /// Creates a path, rejecting polylines with fewer than two points.
    pub fn new(
        id: PathId,
        route: RouteId,
        direction: Direction,
        color: impl Into<String>,
        points: Vec<Coord>,
    ) -> Result<Self, DomainError> {
        if points.len() < 2 {
            return Err(DomainError::PolylineTooShort {
                path: id,
                points: points.len(),
            });
        }

        Ok(Self {
            id,
            route,
            direction,
            color: color.into(),
            source: None,
            points,
        })
    }

    /// Attaches the source-file tag.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The polyline in travel order.
    pub fn points(&self) -> &[Coord] {
        &self.points
    }

    /// Index of the last polyline vertex.
    pub fn last_index(&self) -> usize {
        self.points.len() - 1
    }
}

/// A fixed boarding/alighting point.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub location: Coord,
    /// Display-only; has no effect on matching.
    pub popular: bool,
    pub description: Option<String>,
}

impl Stop {
    pub fn new(id: StopId, name: impl Into<String>, location: Coord) -> Self {
        Self {
            id,
            name: name.into(),
            location,
            popular: false,
            description: None,
        }
    }
}

/// A stop's position along a directional path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathStop {
    pub stop: Arc<Stop>,
    /// Sequence position along the path.
    pub order: u32,
    /// Offset of the stop from the path geometry, computed at load time.
    pub distance_meters: f64,
}

/// A directional path with its route and company resolved.
#[derive(Debug, Clone)]
pub struct PathInfo {
    pub path: Arc<DirectionalPath>,
    pub route: Arc<Route>,
    pub company: Arc<Company>,
}

impl PathInfo {
    pub fn id(&self) -> PathId {
        self.path.id
    }

    pub fn points(&self) -> &[Coord] {
        self.path.points()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_requires_two_points() {
        let err = DirectionalPath::new(
            PathId(1),
            RouteId(1),
            Direction::Outbound,
            "#fff",
            vec![Coord::new(0.0, 0.0)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            DomainError::PolylineTooShort {
                path: PathId(1),
                points: 1
            }
        );

        let path = DirectionalPath::new(
            PathId(1),
            RouteId(1),
            Direction::Return,
            "#fff",
            vec![Coord::new(0.0, 0.0), Coord::new(0.0, 0.001)],
        )
        .unwrap()
        .with_source("ruta-a-vuelta.kml");
        assert_eq!(path.last_index(), 1);
        assert_eq!(path.source.as_deref(), Some("ruta-a-vuelta.kml"));
    }

    #[test]
    fn direction_serde_uses_uppercase_tags() {
        assert_eq!(
            serde_json::to_string(&Direction::Outbound).unwrap(),
            "\"OUTBOUND\""
        );
        let d: Direction = serde_json::from_str("\"RETURN\"").unwrap();
        assert_eq!(d, Direction::Return);
        assert_eq!(d.to_string(), "RETURN");
    }
}
