//! Journey types.
//!
//! A `Journey` is a candidate rider itinerary produced by the planner:
//! either a single bus ride or two rides joined at a transfer point.
//! Journeys are built per request and never stored.

use super::{Coord, Direction, PathId, PathInfo, RouteId, StopId};

/// Rounds to one decimal place, the precision used for minutes and meters
/// in journey breakdowns.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Labels describing the path a leg rides on.
#[derive(Debug, Clone, PartialEq)]
pub struct PathLabel {
    pub path: PathId,
    pub route: RouteId,
    pub route_name: String,
    pub route_code: String,
    pub company: String,
    pub company_color: String,
    pub direction: Direction,
    /// Line color of the directional path.
    pub color: String,
}

impl From<&PathInfo> for PathLabel {
    fn from(info: &PathInfo) -> Self {
        Self {
            path: info.path.id,
            route: info.route.id,
            route_name: info.route.name.clone(),
            route_code: info.route.code.clone(),
            company: info.company.name.clone(),
            company_color: info.company.color.clone(),
            direction: info.path.direction,
            color: info.path.color.clone(),
        }
    }
}

/// A place where a leg begins or ends.
///
/// For boarding/alighting this is a catalog stop. The transfer end of a leg
/// may be a bare polyline point, in which case `stop` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct StopDescriptor {
    pub stop: Option<StopId>,
    pub name: String,
    pub location: Coord,
    /// Walking distance from the query point, or the gap to the other
    /// path for a transfer point.
    pub distance_meters: f64,
    /// Sequence position of the stop along the path, when known.
    pub position: Option<u32>,
    /// Index of the matching vertex in the path polyline.
    pub polyline_index: usize,
}

/// One ride on one directional path.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub path: PathLabel,
    pub board: StopDescriptor,
    pub alight: StopDescriptor,
    /// The slice of path geometry ridden, in travel order.
    pub polyline: Vec<Coord>,
    pub distance_meters: f64,
    pub in_vehicle_minutes: f64,
}

/// Estimated minutes, broken down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub total_minutes: f64,
    pub in_vehicle_minutes: f64,
    pub walking_minutes: f64,
    pub walking_origin_minutes: f64,
    pub walking_destination_minutes: f64,
    /// Fixed overhead added for changing buses. Zero for direct journeys.
    pub transfer_minutes: f64,
}

impl Timing {
    /// Builds a breakdown from unrounded components.
    ///
    /// Every field is rounded to one decimal. The total is computed from the
    /// unrounded components, so it may differ from the sum of the rounded
    /// fields by a tenth.
    pub fn new(
        in_vehicle_minutes: f64,
        walking_origin_minutes: f64,
        walking_destination_minutes: f64,
        transfer_minutes: f64,
    ) -> Self {
        let walking = walking_origin_minutes + walking_destination_minutes;
        Self {
            total_minutes: round_tenth(in_vehicle_minutes + walking + transfer_minutes),
            in_vehicle_minutes: round_tenth(in_vehicle_minutes),
            walking_minutes: round_tenth(walking),
            walking_origin_minutes: round_tenth(walking_origin_minutes),
            walking_destination_minutes: round_tenth(walking_destination_minutes),
            transfer_minutes: round_tenth(transfer_minutes),
        }
    }
}

/// Distances in meters, mirroring [`Timing`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distances {
    pub total_meters: f64,
    pub in_vehicle_meters: f64,
    pub walking_meters: f64,
    pub walking_origin_meters: f64,
    pub walking_destination_meters: f64,
}

impl Distances {
    pub fn new(
        in_vehicle_meters: f64,
        walking_origin_meters: f64,
        walking_destination_meters: f64,
    ) -> Self {
        let walking = walking_origin_meters + walking_destination_meters;
        Self {
            total_meters: round_tenth(in_vehicle_meters + walking),
            in_vehicle_meters: round_tenth(in_vehicle_meters),
            walking_meters: round_tenth(walking),
            walking_origin_meters: round_tenth(walking_origin_meters),
            walking_destination_meters: round_tenth(walking_destination_meters),
        }
    }
}

/// Where two paths come close enough to change buses.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferPoint {
    /// Midpoint between the two closest polyline points.
    pub location: Coord,
    /// Distance between the two paths at this point.
    pub gap_meters: f64,
    /// Alighting vertex on the first leg's polyline.
    pub from_index: usize,
    /// Boarding vertex on the second leg's polyline.
    pub to_index: usize,
    /// Nearest catalog stop of the first leg, if one lies within the
    /// transfer radius.
    pub stop: Option<StopDescriptor>,
}

/// A journey on a single path.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectJourney {
    pub id: String,
    pub leg: Leg,
    pub timing: Timing,
    pub distances: Distances,
}

/// A journey on two paths with one change.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferJourney {
    pub id: String,
    pub legs: [Leg; 2],
    pub transfer: TransferPoint,
    pub timing: Timing,
    pub distances: Distances,
}

/// A candidate itinerary.
#[derive(Debug, Clone, PartialEq)]
pub enum Journey {
    Direct(DirectJourney),
    Transfer(TransferJourney),
}

impl Journey {
    pub fn id(&self) -> &str {
        match self {
            Journey::Direct(j) => &j.id,
            Journey::Transfer(j) => &j.id,
        }
    }

    /// Estimated door-to-door minutes; the ranking key.
    pub fn total_minutes(&self) -> f64 {
        self.timing().total_minutes
    }

    pub fn timing(&self) -> &Timing {
        match self {
            Journey::Direct(j) => &j.timing,
            Journey::Transfer(j) => &j.timing,
        }
    }

    pub fn distances(&self) -> &Distances {
        match self {
            Journey::Direct(j) => &j.distances,
            Journey::Transfer(j) => &j.distances,
        }
    }

    /// Number of bus changes.
    pub fn transfers(&self) -> usize {
        match self {
            Journey::Direct(_) => 0,
            Journey::Transfer(_) => 1,
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, Journey::Direct(_))
    }

    /// Legs in travel order.
    pub fn legs(&self) -> &[Leg] {
        match self {
            Journey::Direct(j) => std::slice::from_ref(&j.leg),
            Journey::Transfer(j) => &j.legs,
        }
    }

    /// Where the rider first boards.
    pub fn boarding(&self) -> &StopDescriptor {
        &self.legs()[0].board
    }

    /// Where the rider finally alights.
    pub fn alighting(&self) -> &StopDescriptor {
        &self.legs()[self.legs().len() - 1].alight
    }

    /// The full ridden geometry, legs concatenated.
    pub fn polyline(&self) -> Vec<Coord> {
        let mut points: Vec<Coord> = Vec::new();
        for leg in self.legs() {
            let skip = match (points.last(), leg.polyline.first()) {
                (Some(last), Some(first)) if last == first => 1,
                _ => 0,
            };
            points.extend(leg.polyline.iter().skip(skip));
        }
        points
    }
}
