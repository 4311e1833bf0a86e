//! Geographic coordinate type.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::DomainError;

/// A WGS84 position as a (latitude, longitude) pair in degrees.
///
/// `Coord` is deliberately permissive: it can hold NaN or out-of-range
/// values so that malformed catalog data degrades to "never matches"
/// (see [`crate::geo::distance`]) instead of failing a whole search.
/// Use [`Coord::parse`] at the edges where user input enters.
///
/// Serializes as a `[lat, lng]` pair, the same shape used by polylines.
///
/// # Examples
///
/// ```
/// use transit_server::domain::Coord;
///
/// let plaza = Coord::parse(-16.3989, -71.5370).unwrap();
/// assert_eq!(plaza.lat, -16.3989);
///
/// assert!(Coord::parse(f64::NAN, 0.0).is_err());
/// assert!(Coord::parse(91.0, 0.0).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coord {
    pub lat: f64,
    pub lng: f64,
}

impl Coord {
    /// Creates a coordinate without validation.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Creates a coordinate, rejecting non-finite or out-of-range values.
    pub fn parse(lat: f64, lng: f64) -> Result<Self, DomainError> {
        let coord = Self::new(lat, lng);
        if !coord.is_finite() {
            return Err(DomainError::InvalidCoordinate {
                lat,
                lng,
                reason: "must be finite numbers",
            });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(DomainError::InvalidCoordinate {
                lat,
                lng,
                reason: "latitude must be within [-90, 90]",
            });
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(DomainError::InvalidCoordinate {
                lat,
                lng,
                reason: "longitude must be within [-180, 180]",
            });
        }
        Ok(coord)
    }

    /// Returns true if both components are finite.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Returns true if this point lies within `tolerance` degrees of `other`
    /// on both axes.
    pub fn within_degrees(&self, other: &Coord, tolerance: f64) -> bool {
        (self.lat - other.lat).abs() <= tolerance && (self.lng - other.lng).abs() <= tolerance
    }

    /// Planar distance in degrees. Only meaningful for tiny separations.
    pub fn degree_distance(&self, other: &Coord) -> f64 {
        (self.lat - other.lat).hypot(self.lng - other.lng)
    }
}

impl From<[f64; 2]> for Coord {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self::new(lat, lng)
    }
}

impl From<Coord> for [f64; 2] {
    fn from(coord: Coord) -> Self {
        [coord.lat, coord.lng]
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coord({}, {})", self.lat, self.lng)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}
