//! Polyline slicing between two stops of a path.
//!
//! Extraction never fails. It tries the stop sequence first, then the
//! nearest polyline vertices, then a straight line, and finally gives back
//! the whole polyline.

use tracing::trace;

use crate::domain::{Coord, DirectionalPath, PathStop, Stop, StopId};
use crate::geo;

use super::config::SearchConfig;

/// How a segment was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Every stop between the two ends was matched to a polyline vertex.
    PathStops,
    /// Sliced between the polyline vertices nearest each stop.
    NearestVertices,
    /// A two-point line between the stops.
    StraightLine,
    /// The unmodified path polyline.
    FullPolyline,
}

/// A slice of path geometry in travel order.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Points after deduplication. Empty only for an empty input polyline.
    pub points: Vec<Coord>,
    pub strategy: ExtractionStrategy,
    /// Inclusive polyline index range the points were taken from, when
    /// they came from the polyline.
    pub range: Option<(usize, usize)>,
}

impl Segment {
    pub fn length_meters(&self) -> f64 {
        geo::polyline_length(&self.points)
    }
}

/// Sequence position of `stop` within an ordered stop list.
pub fn position_of(path_stops: &[PathStop], stop: StopId) -> Option<usize> {
    path_stops.iter().position(|ps| ps.stop.id == stop)
}

/// Extracts the part of `path` ridden between `start` and `end`.
///
/// Arguments may be given in either order: the result always follows the
/// path's direction of travel.
pub fn extract_segment(
    path: &DirectionalPath,
    path_stops: &[PathStop],
    start: &Stop,
    end: &Stop,
    config: &SearchConfig,
) -> Segment {
    let points = path.points();

    let raw = match (position_of(path_stops, start.id), position_of(path_stops, end.id)) {
        (Some(a), Some(b)) => {
            let (lo, hi) = (a.min(b), a.max(b));
            by_path_stops(points, &path_stops[lo..=hi], config.segment_match_tolerance_deg)
                .or_else(|| {
                    trace!(path = %path.id, "stop sequence not found on polyline");
                    by_nearest_vertices(points, start.location, end.location)
                })
                .or_else(|| straight_line(start.location, end.location))
        }
        _ => {
            trace!(path = %path.id, start = %start.id, end = %end.id, "stop not on path");
            straight_line(start.location, end.location)
        }
    };

    let (raw, strategy, range) = raw.unwrap_or_else(|| {
        let range = (!points.is_empty()).then(|| (0, points.len() - 1));
        (points.to_vec(), ExtractionStrategy::FullPolyline, range)
    });

    Segment {
        points: geo::dedup_consecutive(raw, config.dedup_tolerance_deg),
        strategy,
        range,
    }
}

type RawSegment = (Vec<Coord>, ExtractionStrategy, Option<(usize, usize)>);

/// Chains vertex matches for each consecutive stop, so the slice follows
/// the path even where it doubles back near itself.
fn by_path_stops(points: &[Coord], stops: &[PathStop], tolerance: f64) -> Option<RawSegment> {
    let first = stops.first()?;
    let start = locate_vertex(points, first.stop.location, 0, tolerance)?;

    let mut cursor = start;
    for ps in &stops[1..] {
        cursor = locate_vertex(points, ps.stop.location, cursor, tolerance)?;
    }

    Some((
        points[start..=cursor].to_vec(),
        ExtractionStrategy::PathStops,
        Some((start, cursor)),
    ))
}

/// First run of vertices at or after `from` within `tolerance` degrees of
/// `target`, returning the closest vertex of that run.
fn locate_vertex(points: &[Coord], target: Coord, from: usize, tolerance: f64) -> Option<usize> {
    let first = (from..points.len()).find(|&i| points[i].within_degrees(&target, tolerance))?;

    (first..points.len())
        .take_while(|&i| points[i].within_degrees(&target, tolerance))
        .min_by(|&a, &b| {
            points[a]
                .degree_distance(&target)
                .total_cmp(&points[b].degree_distance(&target))
        })
}

fn by_nearest_vertices(points: &[Coord], a: Coord, b: Coord) -> Option<RawSegment> {
    let ia = geo::nearest_point_on_polyline(a, points)?.index;
    let ib = geo::nearest_point_on_polyline(b, points)?.index;
    let (lo, hi) = (ia.min(ib), ia.max(ib));

    Some((
        points[lo..=hi].to_vec(),
        ExtractionStrategy::NearestVertices,
        Some((lo, hi)),
    ))
}

fn straight_line(a: Coord, b: Coord) -> Option<RawSegment> {
    (a.is_finite() && b.is_finite()).then(|| (vec![a, b], ExtractionStrategy::StraightLine, None))
}
