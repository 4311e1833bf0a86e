//! Connection planner.
//!
//! This module answers "which buses, possibly with one change, get me from
//! A to B, and roughly how long will it take?":
//!
//! 1. Stops near each point are found with an adaptive radius.
//! 2. Paths serving both sides yield direct journeys.
//! 3. If there are too few, pairs of paths that pass close to each other
//!    yield transfer journeys.
//! 4. Everything is ranked by estimated total minutes.

mod candidates;
mod config;
mod direct;
mod proximity;
mod rank;
mod search;
mod segment;
mod timing;
mod transfer;


pub use candidates::{PathCandidate, PathStopCache, paths_near};
pub use config::{ConfigError, SearchConfig};
pub use direct::{DirectSearch, search_direct};
pub use proximity::{ProximityMatch, ProximitySearch, StopProximityIndex};
pub use rank::rank_journeys;
pub use search::{Finder, SearchDiagnostics, SearchError, SearchOutcome, SearchRequest};
pub use segment::{ExtractionStrategy, Segment, extract_segment};
pub use timing::{hop_minutes, walking_minutes};
pub use transfer::{TransferSearch, search_transfers};
