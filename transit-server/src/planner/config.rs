//! Search configuration for the connection finder.

use std::path::Path;

use serde::Deserialize;

/// Configuration parameters for connection search.
///
/// Every radius, speed, cap and tolerance the planner uses lives here.
/// Deserializes from partial JSON: missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// First radius tried when looking for stops near a point (meters).
    pub initial_radius_m: f64,

    /// The proximity radius doubles until this cap (meters).
    pub max_radius_m: f64,

    /// Search radius used when a request doesn't give one (meters).
    /// Caps proximity widening for that request.
    pub search_radius_m: f64,

    /// Walking speed used for walking minutes (km/h).
    pub walking_speed_kmh: f64,

    /// Bus speed for short stop-to-stop hops (km/h).
    pub slow_speed_kmh: f64,

    /// Hops shorter than this use `slow_speed_kmh` (km).
    pub slow_hop_threshold_km: f64,

    /// Bus speed for everything else (km/h).
    pub cruise_speed_kmh: f64,

    /// Dwell minutes added per `dwell_interval_m` of travel.
    pub dwell_minutes: f64,

    /// Distance over which one `dwell_minutes` is incurred (meters).
    pub dwell_interval_m: f64,

    /// Per-axis tolerance when matching a stop to a polyline vertex
    /// (degrees).
    pub segment_match_tolerance_deg: f64,

    /// Consecutive output points closer than this are merged (degrees).
    pub dedup_tolerance_deg: f64,

    /// Transfer search runs only when fewer direct journeys than this were
    /// found.
    pub min_direct_results: usize,

    /// Maximum candidate paths considered on each side of a transfer.
    pub max_legs_per_side: usize,

    /// Maximum transfer journeys kept.
    pub max_transfer_combinations: usize,

    /// Maximum polyline points scanned on each leg when looking for a
    /// transfer point.
    pub transfer_window_points: usize,

    /// Maximum samples probed within each transfer window.
    pub transfer_samples: usize,

    /// Maximum gap between two paths at a transfer point (meters).
    pub transfer_radius_m: f64,

    /// Each leg of a transfer journey must be at least this long (meters).
    pub min_leg_length_m: f64,

    /// Average bus speed used for transfer journeys (m/s).
    pub transfer_speed_mps: f64,

    /// Fixed minutes added for changing buses.
    pub transfer_overhead_minutes: f64,

    /// Boarding must happen within this leading fraction of the first
    /// leg's polyline, and alighting within the same trailing fraction of
    /// the second leg's.
    pub leg_position_fraction: f64,

    /// Number of polyline points used to estimate local travel direction.
    pub direction_window_points: usize,

    /// Pairs whose local directions have a dot product below
    /// `-direction_tolerance` are rejected.
    pub direction_tolerance: f64,

    /// Maximum number of journeys to return.
    pub max_results: usize,
}

impl SearchConfig {
    /// Reads overrides from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: SearchConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that radii, speeds and caps are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("initial_radius_m", self.initial_radius_m),
            ("max_radius_m", self.max_radius_m),
            ("search_radius_m", self.search_radius_m),
            ("walking_speed_kmh", self.walking_speed_kmh),
            ("slow_speed_kmh", self.slow_speed_kmh),
            ("cruise_speed_kmh", self.cruise_speed_kmh),
            ("dwell_interval_m", self.dwell_interval_m),
            ("transfer_speed_mps", self.transfer_speed_mps),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
        }
        if self.initial_radius_m > self.max_radius_m {
            return Err(ConfigError::Invalid(
                "initial_radius_m must not exceed max_radius_m".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.leg_position_fraction) {
            return Err(ConfigError::Invalid(
                "leg_position_fraction must be within [0, 1]".to_string(),
            ));
        }
        if self.transfer_samples == 0 || self.transfer_window_points == 0 {
            return Err(ConfigError::Invalid(
                "transfer window and samples must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            initial_radius_m: 500.0,
            max_radius_m: 5000.0,
            search_radius_m: 2000.0,
            walking_speed_kmh: 5.0,
            slow_speed_kmh: 15.0,
            slow_hop_threshold_km: 0.5,
            cruise_speed_kmh: 20.0,
            dwell_minutes: 0.2,
            dwell_interval_m: 300.0,
            segment_match_tolerance_deg: 1e-3,
            dedup_tolerance_deg: 1e-4,
            min_direct_results: 3,
            max_legs_per_side: 8,
            max_transfer_combinations: 15,
            transfer_window_points: 100,
            transfer_samples: 15,
            transfer_radius_m: 100.0,
            min_leg_length_m: 500.0,
            transfer_speed_mps: 4.0,
            transfer_overhead_minutes: 4.0,
            leg_position_fraction: 0.7,
            direction_window_points: 10,
            direction_tolerance: 0.1,
            max_results: 10,
        }
    }
}

/// Error loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
