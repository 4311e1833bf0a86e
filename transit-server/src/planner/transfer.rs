//! Two-path journeys joined at a transfer point.
//!
//! The full cross product of origin and destination paths, each scanned
//! point by point, is far too much work per request. Exploration is
//! bounded instead: a few legs per side, pruning by position and local
//! direction, sampled windows, and a cap on kept combinations.

use tracing::{debug, trace};

use crate::catalog::{CatalogError, RouteCatalog};
use crate::domain::{
    Coord, Distances, Journey, Leg, PathLabel, PathStop, StopDescriptor, Timing, TransferJourney,
    TransferPoint, round_tenth,
};
use crate::geo;

use super::candidates::{PathCandidate, PathStopCache};
use super::config::SearchConfig;
use super::segment::position_of;
use super::timing::transfer_ride_minutes;

/// Output of the transfer search.
#[derive(Debug, Clone, Default)]
pub struct TransferSearch {
    pub journeys: Vec<Journey>,
    /// Leg pairs on distinct paths that were looked at.
    pub pairs_examined: usize,
    /// Pairs rejected by position or direction before sampling.
    pub pairs_pruned: usize,
    /// Exploration stopped early because the kept-combination cap was hit.
    pub capped: bool,
}

/// Journeys boarding a path near the origin and changing to a path near
/// the destination where the two pass within the transfer radius.
pub fn search_transfers<C: RouteCatalog + ?Sized>(
    cache: &mut PathStopCache<'_, C>,
    from_origin: &[PathCandidate],
    to_destination: &[PathCandidate],
    config: &SearchConfig,
) -> Result<TransferSearch, CatalogError> {
    let first_legs = &from_origin[..from_origin.len().min(config.max_legs_per_side)];
    let second_legs = &to_destination[..to_destination.len().min(config.max_legs_per_side)];

    let mut result = TransferSearch::default();

    'pairs: for a in first_legs {
        for b in second_legs {
            if a.id() == b.id() {
                continue;
            }
            if result.journeys.len() >= config.max_transfer_combinations {
                result.capped = true;
                break 'pairs;
            }
            result.pairs_examined += 1;

            if !heading_compatible(a, b, config) {
                trace!(first = %a.id(), second = %b.id(), "pruned by position or direction");
                result.pairs_pruned += 1;
                continue;
            }

            let Some(approach) = closest_approach(a, b, config) else {
                trace!(first = %a.id(), second = %b.id(), "paths never come close");
                continue;
            };

            let first_slice = &a.info.points()[a.anchor..=approach.from_index];
            let second_slice = &b.info.points()[approach.to_index..=b.anchor];
            let first_length = geo::polyline_length(first_slice);
            let second_length = geo::polyline_length(second_slice);
            if first_length < config.min_leg_length_m || second_length < config.min_leg_length_m {
                trace!(
                    first = %a.id(),
                    second = %b.id(),
                    first_length,
                    second_length,
                    "leg too short"
                );
                continue;
            }

            let first_stops = cache.get(a.id())?;
            let second_stops = cache.get(b.id())?;
            result.journeys.push(Journey::Transfer(transfer_journey(
                Ride {
                    candidate: a,
                    path_stops: &first_stops,
                    polyline: first_slice,
                    length: first_length,
                },
                Ride {
                    candidate: b,
                    path_stops: &second_stops,
                    polyline: second_slice,
                    length: second_length,
                },
                approach,
                config,
            )));
        }
    }

    debug!(
        kept = result.journeys.len(),
        examined = result.pairs_examined,
        pruned = result.pairs_pruned,
        capped = result.capped,
        "transfer search finished"
    );

    Ok(result)
}

/// Boarding early on the first leg, alighting late on the second, and
/// local travel directions not opposed.
fn heading_compatible(a: &PathCandidate, b: &PathCandidate, config: &SearchConfig) -> bool {
    let a_last = a.info.path.last_index() as f64;
    let b_last = b.info.path.last_index() as f64;
    if a.anchor as f64 > config.leg_position_fraction * a_last {
        return false;
    }
    if (b.anchor as f64) < (1.0 - config.leg_position_fraction) * b_last {
        return false;
    }

    let window = config.direction_window_points;
    match (
        geo::heading_at(a.info.points(), a.anchor, window),
        geo::heading_at(b.info.points(), b.anchor, window),
    ) {
        (Some(ha), Some(hb)) => ha.dot(&hb) >= -config.direction_tolerance,
        // A degenerate window says nothing about direction.
        _ => true,
    }
}

/// The closest sampled point pair between the first leg after boarding and
/// the second leg before alighting.
#[derive(Debug, Clone, Copy)]
struct Approach {
    from_index: usize,
    to_index: usize,
    gap: f64,
}

fn closest_approach(
    a: &PathCandidate,
    b: &PathCandidate,
    config: &SearchConfig,
) -> Option<Approach> {
    let a_points = a.info.points();
    let b_points = b.info.points();

    let a_end = (a.anchor + config.transfer_window_points).min(a_points.len());
    let b_start = (b.anchor + 1).saturating_sub(config.transfer_window_points);

    let a_samples = sample(a.anchor, a_end, config.transfer_samples);
    let b_samples = sample(b_start, b.anchor + 1, config.transfer_samples);

    let mut best: Option<Approach> = None;
    for i in a_samples {
        for j in b_samples.clone() {
            let gap = geo::distance(a_points[i], b_points[j]);
            if gap > config.transfer_radius_m {
                continue;
            }
            if best.is_none_or(|current| gap < current.gap) {
                best = Some(Approach {
                    from_index: i,
                    to_index: j,
                    gap,
                });
            }
        }
    }
    best
}

/// At most `samples` evenly strided indices of `start..end`.
fn sample(start: usize, end: usize, samples: usize) -> std::iter::StepBy<std::ops::Range<usize>> {
    let len = end.saturating_sub(start);
    let stride = len.div_ceil(samples.max(1)).max(1);
    (start..end).step_by(stride)
}

struct Ride<'a> {
    candidate: &'a PathCandidate,
    path_stops: &'a [PathStop],
    polyline: &'a [Coord],
    length: f64,
}

impl Ride<'_> {
    fn stop_descriptor(&self) -> StopDescriptor {
        let m = &self.candidate.stop;
        StopDescriptor {
            stop: Some(m.stop.id),
            name: m.stop.name.clone(),
            location: m.stop.location,
            distance_meters: round_tenth(m.distance_meters),
            position: position_of(self.path_stops, m.stop.id).map(|p| self.path_stops[p].order),
            polyline_index: self.candidate.anchor,
        }
    }

    fn leg(&self, board: StopDescriptor, alight: StopDescriptor, config: &SearchConfig) -> Leg {
        Leg {
            path: PathLabel::from(&self.candidate.info),
            board,
            alight,
            polyline: geo::dedup_consecutive(self.polyline.to_vec(), config.dedup_tolerance_deg),
            distance_meters: round_tenth(self.length),
            in_vehicle_minutes: round_tenth(transfer_ride_minutes(self.length, config)),
        }
    }
}

fn transfer_journey(
    first: Ride<'_>,
    second: Ride<'_>,
    approach: Approach,
    config: &SearchConfig,
) -> TransferJourney {
    let a_point = first.candidate.info.points()[approach.from_index];
    let b_point = second.candidate.info.points()[approach.to_index];
    let location = Coord::new((a_point.lat + b_point.lat) / 2.0, (a_point.lng + b_point.lng) / 2.0);

    let stop = transfer_stop(first.path_stops, location, approach.from_index, config);
    let at_transfer = |polyline_index: usize| {
        stop.clone()
            .map(|s| StopDescriptor {
                polyline_index,
                ..s
            })
            .unwrap_or_else(|| StopDescriptor {
                stop: None,
                name: "Transfer point".to_string(),
                location,
                distance_meters: round_tenth(approach.gap),
                position: None,
                polyline_index,
            })
    };

    let ridden = first.length + second.length;
    let walk_origin = first.candidate.stop.walking_minutes;
    let walk_destination = second.candidate.stop.walking_minutes;

    let first_leg = first.leg(
        first.stop_descriptor(),
        at_transfer(approach.from_index),
        config,
    );
    let second_leg = second.leg(
        at_transfer(approach.to_index),
        second.stop_descriptor(),
        config,
    );

    TransferJourney {
        id: format!(
            "transfer-{}-{}-{}-{}",
            first.candidate.id(),
            second.candidate.id(),
            approach.from_index,
            approach.to_index
        ),
        legs: [first_leg, second_leg],
        transfer: TransferPoint {
            location,
            gap_meters: round_tenth(approach.gap),
            from_index: approach.from_index,
            to_index: approach.to_index,
            stop,
        },
        timing: Timing::new(
            transfer_ride_minutes(ridden, config),
            walk_origin,
            walk_destination,
            config.transfer_overhead_minutes,
        ),
        distances: Distances::new(
            ridden,
            first.candidate.stop.distance_meters,
            second.candidate.stop.distance_meters,
        ),
    }
}

/// Nearest stop of the first leg within the transfer radius of `location`.
fn transfer_stop(
    path_stops: &[PathStop],
    location: Coord,
    polyline_index: usize,
    config: &SearchConfig,
) -> Option<StopDescriptor> {
    path_stops
        .iter()
        .map(|ps| (ps, geo::distance(location, ps.stop.location)))
        .filter(|(_, d)| *d <= config.transfer_radius_m)
        .min_by(|x, y| x.1.total_cmp(&y.1))
        .map(|(ps, d)| StopDescriptor {
            stop: Some(ps.stop.id),
            name: ps.stop.name.clone(),
            location: ps.stop.location,
            distance_meters: round_tenth(d),
            position: Some(ps.order),
            polyline_index,
        })
}
