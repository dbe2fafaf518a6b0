//! Route proximity filtering.
//!
//! The default [`ProximityMode::Vertex`] treats a route as its sample
//! points: an item is near the route when it lies within the radius of at
//! least one path vertex. Directions services return densely sampled
//! polylines, so this is close to the true corridor, but a point beside the
//! middle of a long, sparsely sampled edge can be missed.
//! [`ProximityMode::Segment`] measures to each great-circle segment instead
//! and is strictly more inclusive.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::{EARTH_RADIUS_KM, GeoPoint, Locatable, distance_km};

/// How distance from a point to a path is measured.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProximityMode {
    /// Distance to the nearest path vertex.
    #[default]
    Vertex,
    /// Distance to the nearest great-circle segment between consecutive
    /// vertices.
    Segment,
}

/// Returns the items of `candidates` that lie within `radius_km` of any
/// vertex of `path`, preserving input order.
///
/// Unlocatable items are skipped. An empty path matches nothing.
#[must_use]
pub fn nearby<'a, T: Locatable>(
    candidates: &'a [T],
    path: &[GeoPoint],
    radius_km: f64,
) -> Vec<&'a T> {
    nearby_with_mode(candidates, path, radius_km, ProximityMode::Vertex)
}

/// Like [`nearby`], with an explicit [`ProximityMode`].
#[must_use]
pub fn nearby_with_mode<'a, T: Locatable>(
    candidates: &'a [T],
    path: &[GeoPoint],
    radius_km: f64,
    mode: ProximityMode,
) -> Vec<&'a T> {
    if path.is_empty() {
        return Vec::new();
    }

    let matched: Vec<&T> = candidates
        .iter()
        .filter(|candidate| {
            candidate
                .location()
                .is_some_and(|point| is_near_path(point, path, radius_km, mode))
        })
        .collect();

    log::debug!(
        "{} of {} candidates within {radius_km} km of a {}-point path ({mode})",
        matched.len(),
        candidates.len(),
        path.len(),
    );

    matched
}

/// Returns `true` if `point` lies within `radius_km` of `path`.
#[must_use]
pub fn is_near_path(point: GeoPoint, path: &[GeoPoint], radius_km: f64, mode: ProximityMode) -> bool {
    match mode {
        ProximityMode::Segment if path.len() >= 2 => path
            .windows(2)
            .any(|pair| distance_to_segment_km(point, pair[0], pair[1]) <= radius_km),
        ProximityMode::Vertex | ProximityMode::Segment => path
            .iter()
            .any(|vertex| distance_km(point, *vertex) <= radius_km),
    }
}

/// Distance from `point` to the nearest part of `path`, or `None` for an
/// empty path.
#[must_use]
pub fn distance_to_path_km(point: GeoPoint, path: &[GeoPoint], mode: ProximityMode) -> Option<f64> {
    match mode {
        ProximityMode::Segment if path.len() >= 2 => path
            .windows(2)
            .map(|pair| distance_to_segment_km(point, pair[0], pair[1]))
            .reduce(f64::min),
        ProximityMode::Vertex | ProximityMode::Segment => path
            .iter()
            .map(|vertex| distance_km(point, *vertex))
            .reduce(f64::min),
    }
}

/// Great-circle distance from `point` to the arc `start`→`end`.
///
/// Uses cross-track distance when the perpendicular foot falls on the arc
/// and the nearer endpoint otherwise. Never larger than the distance to
/// either endpoint.
fn distance_to_segment_km(point: GeoPoint, start: GeoPoint, end: GeoPoint) -> f64 {
    let to_start = distance_km(start, point);
    let to_end = distance_km(end, point);
    let segment = distance_km(start, end);

    if segment <= 0.0 || to_start <= 0.0 {
        return to_start.min(to_end);
    }

    let angular = to_start / EARTH_RADIUS_KM;
    let relative_bearing = initial_bearing(start, point) - initial_bearing(start, end);

    // Foot of the perpendicular lies before the start of the arc.
    if relative_bearing.cos() < 0.0 {
        return to_start.min(to_end);
    }

    let cross_track = (angular.sin() * relative_bearing.sin())
        .clamp(-1.0, 1.0)
        .asin();
    let along_track = (angular.cos() / cross_track.cos())
        .clamp(-1.0, 1.0)
        .acos()
        * EARTH_RADIUS_KM;

    if along_track > segment {
        return to_start.min(to_end);
    }

    (cross_track * EARTH_RADIUS_KM)
        .abs()
        .min(to_start)
        .min(to_end)
}

/// Initial great-circle bearing from `from` to `to`, in radians.
fn initial_bearing(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.lat().to_radians();
    let lat2 = to.lat().to_radians();
    let d_lon = (to.lon() - from.lon()).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    y.atan2(x)
}
