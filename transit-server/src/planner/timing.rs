//! Travel time estimates.
//!
//! There are no timetables: all times are derived from distances using
//! urban speed heuristics from [`SearchConfig`].

use crate::domain::{PathStop, round_tenth};
use crate::geo;

use super::config::SearchConfig;

/// Minutes to walk `distance_m`, rounded to one decimal.
pub fn walking_minutes(distance_m: f64, config: &SearchConfig) -> f64 {
    round_tenth(distance_m / 1000.0 / config.walking_speed_kmh * 60.0)
}

/// Minutes for a single stop-to-stop hop.
///
/// Short hops are slower (acceleration, traffic lights), and every hop pays
/// a dwell addend proportional to its length.
pub fn hop_minutes(distance_m: f64, config: &SearchConfig) -> f64 {
    let km = distance_m / 1000.0;
    let speed = if km < config.slow_hop_threshold_km {
        config.slow_speed_kmh
    } else {
        config.cruise_speed_kmh
    };
    km / speed * 60.0 + config.dwell_minutes * (distance_m / config.dwell_interval_m)
}

/// Minutes between positions `from` and `to` of an ordered stop list,
/// summing [`hop_minutes`] over consecutive stops.
///
/// Positions may be given in either order. Returns `None` if either is out
/// of bounds or they are equal.
pub fn stop_table_minutes(
    path_stops: &[PathStop],
    from: usize,
    to: usize,
    config: &SearchConfig,
) -> Option<f64> {
    let (lo, hi) = (from.min(to), from.max(to));
    if lo == hi || hi >= path_stops.len() {
        return None;
    }

    Some(
        path_stops[lo..=hi]
            .windows(2)
            .map(|w| {
                let d = geo::distance(w[0].stop.location, w[1].stop.location);
                hop_minutes(d, config)
            })
            .sum(),
    )
}

/// Minutes to ride `distance_m` at cruise speed.
pub fn cruise_minutes(distance_m: f64, config: &SearchConfig) -> f64 {
    distance_m / 1000.0 / config.cruise_speed_kmh * 60.0
}

/// Minutes to ride `distance_m` at the average speed used for transfer
/// journeys.
pub fn transfer_ride_minutes(distance_m: f64, config: &SearchConfig) -> f64 {
    distance_m / config.transfer_speed_mps / 60.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coord, Stop, StopId};
    use std::sync::Arc;

    fn path_stop(id: u64, location: Coord, order: u32) -> PathStop {
        PathStop {
            stop: Arc::new(Stop::new(StopId(id), format!("Stop {id}"), location)),
            order,
            distance_meters: 0.0,
        }
    }

    #[test]
    fn walking_at_five_kmh() {
        let config = SearchConfig::default();
        // 500 m at 5 km/h is 6 minutes.
        assert_eq!(walking_minutes(500.0, &config), 6.0);
        assert_eq!(walking_minutes(130.0, &config), 1.6);
        assert_eq!(walking_minutes(0.0, &config), 0.0);
    }

    #[test]
    fn short_hops_are_slower() {
        let config = SearchConfig::default();
        // 300 m at 15 km/h = 1.2 min, plus 0.2 dwell.
        assert!((hop_minutes(300.0, &config) - 1.4).abs() < 1e-9);
        // 600 m at 20 km/h = 1.8 min, plus 0.4 dwell.
        assert!((hop_minutes(600.0, &config) - 2.2).abs() < 1e-9);
    }

    #[test]
    fn stop_table_sums_hops_in_either_order() {
        let config = SearchConfig::default();
        let stops = vec![
            path_stop(1, Coord::new(0.0, 0.0), 1),
            path_stop(2, Coord::new(0.0, 0.003), 2),
            path_stop(3, Coord::new(0.0, 0.009), 3),
        ];
        let hop = |i: usize| {
            hop_minutes(
                geo::distance(stops[i].stop.location, stops[i + 1].stop.location),
                &config,
            )
        };
        let expected = hop(0) + hop(1);

        let forward = stop_table_minutes(&stops, 0, 2, &config).unwrap();
        let backward = stop_table_minutes(&stops, 2, 0, &config).unwrap();
        assert!((forward - expected).abs() < 1e-9);
        assert_eq!(forward, backward);

        assert!(stop_table_minutes(&stops, 1, 1, &config).is_none());
        assert!(stop_table_minutes(&stops, 0, 3, &config).is_none());
    }

    #[test]
    fn ride_speeds() {
        let config = SearchConfig::default();
        // 2 km at 20 km/h = 6 minutes.
        assert!((cruise_minutes(2000.0, &config) - 6.0).abs() < 1e-9);
        // 2400 m at 4 m/s = 10 minutes.
        assert!((transfer_ride_minutes(2400.0, &config) - 10.0).abs() < 1e-9);
    }
}
