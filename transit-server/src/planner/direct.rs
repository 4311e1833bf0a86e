//! Single-path journeys.

use std::collections::HashMap;

use tracing::trace;

use crate::catalog::{CatalogError, RouteCatalog};
use crate::domain::{
    DirectJourney, Distances, Journey, Leg, PathId, PathLabel, PathStop, StopDescriptor, Timing,
    round_tenth,
};
use crate::geo;

use super::candidates::{PathCandidate, PathStopCache};
use super::config::SearchConfig;
use super::segment::{extract_segment, position_of};
use super::timing::{cruise_minutes, stop_table_minutes};

/// Output of the direct search.
#[derive(Debug, Clone, Default)]
pub struct DirectSearch {
    pub journeys: Vec<Journey>,
    /// Paths serving both ends.
    pub candidate_paths: usize,
}

/// Journeys riding one path from a stop near the origin to a stop near
/// the destination.
///
/// Candidate paths are those present on both sides; each is ridden between
/// its greedy boarding and alighting stops. Emission follows the origin
/// side's discovery order.
pub fn search_direct<C: RouteCatalog + ?Sized>(
    cache: &mut PathStopCache<'_, C>,
    from_origin: &[PathCandidate],
    to_destination: &[PathCandidate],
    config: &SearchConfig,
) -> Result<DirectSearch, CatalogError> {
    let by_path: HashMap<PathId, &PathCandidate> =
        to_destination.iter().map(|c| (c.id(), c)).collect();

    let mut result = DirectSearch::default();

    for board in from_origin {
        let Some(alight) = by_path.get(&board.id()) else {
            continue;
        };
        result.candidate_paths += 1;

        if board.stop.stop.id == alight.stop.stop.id {
            trace!(path = %board.id(), stop = %board.stop.stop.id, "same stop on both ends");
            continue;
        }

        let path_stops = cache.get(board.id())?;
        if !rides_forward(board, alight, &path_stops) {
            trace!(
                path = %board.id(),
                board = %board.stop.stop.id,
                alight = %alight.stop.stop.id,
                "alighting stop comes before boarding stop"
            );
            continue;
        }

        result
            .journeys
            .push(Journey::Direct(direct_journey(board, alight, &path_stops, config)));
    }

    Ok(result)
}

/// Whether riding `board` to `alight` follows the path's direction of
/// travel. Stop sequence decides when both stops are on the path; polyline
/// anchors decide otherwise.
fn rides_forward(board: &PathCandidate, alight: &PathCandidate, path_stops: &[PathStop]) -> bool {
    match (
        position_of(path_stops, board.stop.stop.id),
        position_of(path_stops, alight.stop.stop.id),
    ) {
        (Some(from), Some(to)) => from < to,
        _ => board.anchor <= alight.anchor,
    }
}

fn direct_journey(
    board: &PathCandidate,
    alight: &PathCandidate,
    path_stops: &[PathStop],
    config: &SearchConfig,
) -> DirectJourney {
    let (from, to) = (&board.stop.stop, &alight.stop.stop);
    let segment = extract_segment(&board.info.path, path_stops, from, to, config);

    let distance = if segment.points.len() >= 2 {
        segment.length_meters()
    } else {
        geo::distance(from.location, to.location)
    };

    let board_position = position_of(path_stops, from.id);
    let alight_position = position_of(path_stops, to.id);
    let in_vehicle = match (board_position, alight_position) {
        (Some(a), Some(b)) => stop_table_minutes(path_stops, a, b, config),
        _ => None,
    }
    .unwrap_or_else(|| cruise_minutes(distance, config));

    trace!(
        path = %board.id(),
        strategy = ?segment.strategy,
        distance,
        in_vehicle,
        "direct candidate"
    );

    let descriptor = |candidate: &PathCandidate, position: Option<usize>| StopDescriptor {
        stop: Some(candidate.stop.stop.id),
        name: candidate.stop.stop.name.clone(),
        location: candidate.stop.stop.location,
        distance_meters: round_tenth(candidate.stop.distance_meters),
        position: position.map(|p| path_stops[p].order),
        polyline_index: candidate.anchor,
    };

    let walk_origin = board.stop.walking_minutes;
    let walk_destination = alight.stop.walking_minutes;

    DirectJourney {
        id: format!("direct-{}-{}-{}", board.id(), from.id, to.id),
        leg: Leg {
            path: PathLabel::from(&board.info),
            board: descriptor(board, board_position),
            alight: descriptor(alight, alight_position),
            polyline: segment.points,
            distance_meters: round_tenth(distance),
            in_vehicle_minutes: round_tenth(in_vehicle),
        },
        timing: Timing::new(in_vehicle, walk_origin, walk_destination, 0.0),
        distances: Distances::new(
            distance,
            board.stop.distance_meters,
            alight.stop.distance_meters,
        ),
    }
}
