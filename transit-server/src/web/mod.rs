//! Web layer for the transit connection finder.
//!
//! Provides JSON endpoints for connection search, nearby stops, catalog
//! statistics and browsing of companies, routes and paths.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
