#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Route planning glue between a directions service and the proximity core.
//!
//! [`decode`] turns a directions response or `GeoJSON` line into a path of
//! [`GeoPoint`]s. [`assessment`] runs the proximity filter over the current
//! event set and produces everything the trip panel shows: distance, a
//! coarse duration, and per-category alert counts.

pub mod assessment;
pub mod decode;

use roadwatch_geometry::{AVERAGE_SPEED_KMH, GeoPoint, GeometryError, ProximityMode};
use serde::Deserialize;

pub use assessment::{AlertSummary, RouteAssessment, assess_route, format_distance_km};
pub use decode::{parse_route, parse_route_value};

/// Errors from decoding route geometry.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document is JSON but not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The directions service did not return a usable route.
    #[error("No route found")]
    NoRoute,

    /// The geometry is not a line.
    #[error("Unsupported route geometry: {kind}")]
    UnsupportedGeometry {
        /// What was found instead.
        kind: String,
    },

    /// A route vertex is outside the valid coordinate range.
    #[error(transparent)]
    InvalidCoordinate(#[from] GeometryError),

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// `[route]` configuration section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteConfig {
    /// Alert radius around the route, in kilometers.
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    /// Average speed for the duration estimate, in km/h.
    #[serde(default = "default_average_speed_kmh")]
    pub average_speed_kmh: f64,
    /// How distance to the route is measured.
    #[serde(default)]
    pub proximity: ProximityMode,
    /// Paths with at least this many vertices are filtered through an
    /// R-tree instead of a linear scan (vertex mode only).
    #[serde(default = "default_index_threshold")]
    pub index_threshold: usize,
}

const fn default_radius_km() -> f64 {
    15.0
}

const fn default_average_speed_kmh() -> f64 {
    AVERAGE_SPEED_KMH
}

const fn default_index_threshold() -> usize {
    512
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            radius_km: default_radius_km(),
            average_speed_kmh: default_average_speed_kmh(),
            proximity: ProximityMode::default(),
            index_threshold: default_index_threshold(),
        }
    }
}

/// Reads and decodes a route file (see [`parse_route`]).
///
/// # Errors
///
/// Returns [`RouteError`] if the file cannot be read or decoded.
pub fn load_route_file(path: impl AsRef<std::path::Path>) -> Result<Vec<GeoPoint>, RouteError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let route = parse_route(&text)?;
    log::info!("Loaded {}-point route from {}", route.len(), path.display());
    Ok(route)
}
