//! Geometry on the sphere and on recorded polylines.
//!
//! Distances are great-circle (haversine) meters. Polylines are treated as
//! discrete sets of sampled vertices: nothing here interpolates between
//! vertices, which matches the granularity at which paths are recorded.

use crate::domain::Coord;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters.
///
/// Returns `f64::INFINITY` if either point is non-finite, so malformed data
/// never matches anything instead of failing the caller.
///
/// # Examples
///
/// ```
/// use transit_server::domain::Coord;
/// use transit_server::geo::distance;
///
/// let a = Coord::new(-16.3989, -71.5370);
/// assert_eq!(distance(a, a), 0.0);
/// assert!(distance(a, Coord::new(f64::NAN, 0.0)).is_infinite());
/// ```
pub fn distance(a: Coord, b: Coord) -> f64 {
    if !a.is_finite() || !b.is_finite() {
        return f64::INFINITY;
    }

    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    // Rounding can push h a hair outside [0, 1] for antipodal points.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// The polyline vertex closest to a reference point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestPoint {
    pub distance: f64,
    pub index: usize,
    pub point: Coord,
}

/// Finds the vertex of `polyline` nearest to `reference` by linear scan.
///
/// Ties go to the lowest index. Returns `None` for an empty polyline, or
/// when every distance is infinite (malformed reference).
pub fn nearest_point_on_polyline(reference: Coord, polyline: &[Coord]) -> Option<NearestPoint> {
    let mut best: Option<NearestPoint> = None;

    for (index, &point) in polyline.iter().enumerate() {
        let d = distance(reference, point);
        if !d.is_finite() {
            continue;
        }
        if best.is_none_or(|b| d < b.distance) {
            best = Some(NearestPoint {
                distance: d,
                index,
                point,
            });
        }
    }

    best
}

/// Sum of great-circle distances between consecutive points.
pub fn polyline_length(points: &[Coord]) -> f64 {
    points.windows(2).map(|w| distance(w[0], w[1])).sum()
}

/// Drops points closer than `tolerance_deg` (planar degrees) to the last
/// kept point.
///
/// The first point is always kept.
pub fn dedup_consecutive(points: Vec<Coord>, tolerance_deg: f64) -> Vec<Coord> {
    let mut out: Vec<Coord> = Vec::with_capacity(points.len());
    for point in points {
        match out.last() {
            Some(last) if last.degree_distance(&point) < tolerance_deg => {}
            _ => out.push(point),
        }
    }
    out
}

/// A unit vector pointing east/north.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heading {
    pub east: f64,
    pub north: f64,
}

impl Heading {
    pub fn dot(&self, other: &Heading) -> f64 {
        self.east * other.east + self.north * other.north
    }
}

/// Local travel direction of a polyline around `index`.
///
/// Uses the vertices `window / 2` either side of `index` (clamped to the
/// polyline), with longitude scaled by the cosine of latitude so the vector
/// is roughly isotropic. Returns `None` if the window collapses to a single
/// location.
pub fn heading_at(polyline: &[Coord], index: usize, window: usize) -> Option<Heading> {
    if polyline.is_empty() {
        return None;
    }
    let last = polyline.len() - 1;
    let index = index.min(last);
    let half = (window / 2).max(1);
    let start = polyline[index.saturating_sub(half)];
    let end = polyline[(index + half).min(last)];

    let scale = ((start.lat + end.lat) / 2.0).to_radians().cos();
    let east = (end.lng - start.lng) * scale;
    let north = end.lat - start.lat;
    let norm = east.hypot(north);

    if !norm.is_finite() || norm == 0.0 {
        return None;
    }

    Some(Heading {
        east: east / norm,
        north: north / norm,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Points within a city-sized box, where the planner actually operates.
    fn city_point() -> impl Strategy<Value = Coord> {
        (-16.6f64..-16.2, -71.7f64..-71.3).prop_map(|(lat, lng)| Coord::new(lat, lng))
    }

    fn polyline() -> impl Strategy<Value = Vec<Coord>> {
        prop::collection::vec(city_point(), 1..40)
    }

    proptest! {
        #[test]
        fn distance_identity(p in city_point()) {
            prop_assert_eq!(distance(p, p), 0.0);
        }

        #[test]
        fn distance_symmetric(a in city_point(), b in city_point()) {
            prop_assert!((distance(a, b) - distance(b, a)).abs() < 1e-9);
        }

        #[test]
        fn distance_triangle_inequality(a in city_point(), b in city_point(), c in city_point()) {
            prop_assert!(distance(a, c) <= distance(a, b) + distance(b, c) + 1e-6);
        }

        #[test]
        fn nearest_point_is_minimal(reference in city_point(), line in polyline()) {
            let nearest = nearest_point_on_polyline(reference, &line).unwrap();
            prop_assert_eq!(line[nearest.index], nearest.point);
            for (i, &p) in line.iter().enumerate() {
                let d = distance(reference, p);
                prop_assert!(d >= nearest.distance);
                if i < nearest.index {
                    prop_assert!(d > nearest.distance);
                }
            }
        }

        #[test]
        fn dedup_leaves_no_close_neighbours(line in polyline()) {
            let out = dedup_consecutive(line.clone(), 1e-4);
            prop_assert!(!out.is_empty());
            prop_assert_eq!(out[0], line[0]);
            for w in out.windows(2) {
                prop_assert!(w[0].degree_distance(&w[1]) >= 1e-4);
            }
        }
    }
}
