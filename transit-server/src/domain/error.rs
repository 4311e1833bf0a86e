//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from catalog/IO errors.

use super::PathId;

/// Domain-level errors for validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Coordinate is non-finite or outside WGS84 bounds
    #[error("invalid coordinate ({lat}, {lng}): {reason}")]
    InvalidCoordinate {
        lat: f64,
        lng: f64,
        reason: &'static str,
    },

    /// Path geometry has fewer than two points
    #[error("path {path} has {points} point(s), needs at least 2")]
    PolylineTooShort { path: PathId, points: usize },
}
