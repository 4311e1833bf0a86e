//! Domain types for the transit connection finder.
//!
//! This module contains the bus network model (companies, routes,
//! directional paths, stops) and the journeys the planner produces.
//! Single-entity invariants are enforced at construction time.

mod coord;
mod error;
mod ids;
mod journey;
mod network;

pub use coord::Coord;
pub use error::DomainError;
pub use ids::{CompanyId, PathId, RouteId, StopId};
pub use journey::{
    DirectJourney, Distances, Journey, Leg, PathLabel, StopDescriptor, Timing, TransferJourney,
    TransferPoint, round_tenth,
};
pub use network::{Company, Direction, DirectionalPath, PathInfo, PathStop, Route, Stop};
