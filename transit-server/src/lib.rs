//! Transit connection finder server.
//!
//! Answers "which buses get me from here to there?" for a city bus
//! network: direct rides on one path, or two rides joined where the paths
//! pass close to each other, ranked by estimated door-to-door minutes.

pub mod catalog;
pub mod domain;
pub mod geo;
pub mod planner;
pub mod web;
