//! Journey ranking for search results.
//!
//! The only signal is estimated door-to-door time. Price, company and
//! crowding play no part.

use crate::domain::Journey;

/// Rank journeys by estimated total minutes.
///
/// Direct journeys are placed before transfer journeys ahead of sorting,
/// and the sort is stable, so ties keep that discovery order. At most
/// `max_results` journeys are returned, best-first.
pub fn rank_journeys(
    direct: Vec<Journey>,
    transfer: Vec<Journey>,
    max_results: usize,
) -> Vec<Journey> {
    let mut journeys = direct;
    journeys.extend(transfer);

    journeys.sort_by(|a, b| a.total_minutes().total_cmp(&b.total_minutes()));
    journeys.truncate(max_results);

    journeys
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::domain::*;

    fn descriptor(name: &str) -> StopDescriptor {
        StopDescriptor {
            stop: None,
            name: name.to_string(),
            location: Coord::new(-16.40, -71.54),
            distance_meters: 0.0,
            position: None,
            polyline_index: 0,
        }
    }

    fn leg(path: u64) -> Leg {
        Leg {
            path: PathLabel {
                path: PathId(path),
                route: RouteId(path),
                route_name: format!("Route {path}"),
                route_code: format!("R-{path}"),
                company: "Test Co".to_string(),
                company_color: "#000000".to_string(),
                direction: Direction::Outbound,
                color: "#ff0000".to_string(),
            },
            board: descriptor("board"),
            alight: descriptor("alight"),
            polyline: vec![Coord::new(-16.40, -71.54), Coord::new(-16.40, -71.53)],
            distance_meters: 1000.0,
            in_vehicle_minutes: 3.0,
        }
    }

    /// A direct journey whose total is `minutes` (rounded to a tenth).
    pub fn direct(id: &str, minutes: f64) -> Journey {
        Journey::Direct(DirectJourney {
            id: id.to_string(),
            leg: leg(1),
            timing: Timing::new(minutes, 0.0, 0.0, 0.0),
            distances: Distances::new(1000.0, 0.0, 0.0),
        })
    }

    /// A transfer journey whose total is `minutes` (rounded to a tenth).
    pub fn transfer(id: &str, minutes: f64) -> Journey {
        Journey::Transfer(TransferJourney {
            id: id.to_string(),
            legs: [leg(1), leg(2)],
            transfer: TransferPoint {
                location: Coord::new(-16.40, -71.53),
                gap_meters: 20.0,
                from_index: 1,
                to_index: 0,
                stop: None,
            },
            timing: Timing::new(minutes, 0.0, 0.0, 0.0),
            distances: Distances::new(2000.0, 0.0, 0.0),
        })
    }
}


#[cfg(test)]
mod proptests {
    use super::fixtures::{direct, transfer};
    use super::*;
    use proptest::prelude::*;

    /// Strategy for generating a journey of either kind.
    fn journey_strategy() -> impl Strategy<Value = Journey> {
        (any::<bool>(), 0u32..1000, 0.0f64..120.0).prop_map(|(is_direct, id, minutes)| {
            if is_direct {
                direct(&format!("d{id}"), minutes)
            } else {
                transfer(&format!("t{id}"), minutes)
            }
        })
    }

    fn journeys_strategy() -> impl Strategy<Value = Vec<Journey>> {
        prop::collection::vec(journey_strategy(), 0..20)
    }

    proptest! {
        #[test]
        fn rank_journeys_is_sorted(
            directs in journeys_strategy(),
            transfers in journeys_strategy(),
            max_results in 0usize..30,
        ) {
            let ranked = rank_journeys(directs, transfers, max_results);

            for window in ranked.windows(2) {
                prop_assert!(
                    window[0].total_minutes() <= window[1].total_minutes(),
                    "Not sorted: {} should come before {}",
                    window[0].total_minutes(),
                    window[1].total_minutes()
                );
            }
        }

        #[test]
        fn rank_journeys_keeps_the_fastest(
            directs in journeys_strategy(),
            transfers in journeys_strategy(),
            max_results in 0usize..30,
        ) {
            let mut all: Vec<f64> = directs
                .iter()
                .chain(transfers.iter())
                .map(|j| j.total_minutes())
                .collect();
            all.sort_by(|a, b| a.total_cmp(b));
            all.truncate(max_results);

            let ranked = rank_journeys(directs, transfers, max_results);
            let kept: Vec<f64> = ranked.iter().map(|j| j.total_minutes()).collect();

            prop_assert_eq!(kept, all);
        }
    }
}
