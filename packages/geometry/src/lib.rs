#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geospatial proximity primitives for route alerts.
//!
//! Everything in this crate is a pure function over plain values: great-circle
//! distance between two [`GeoPoint`]s, filtering of located items that lie
//! near a route polyline, and route length / travel-time estimates. Nothing
//! here holds state, so every function is safe to call from any thread.
//!
//! Coordinates are always `(longitude, latitude)` in degrees, longitude
//! first, matching `GeoJSON` and WKT ordering.

pub mod index;
pub mod proximity;
pub mod route;
pub mod wkt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use index::RouteIndex;
pub use proximity::{
    ProximityMode, distance_to_path_km, is_near_path, nearby, nearby_with_mode,
};
pub use route::{
    AVERAGE_SPEED_KMH, TravelEstimate, estimate_duration, estimate_duration_at, route_length_km,
};
pub use wkt::parse_wkt_point;

/// Mean Earth radius used by the haversine formula, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Errors raised by the optional coordinate validation.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    /// Longitude or latitude is not finite or lies outside its valid range.
    #[error("invalid coordinate ({lon}, {lat}): expected lon in [-180, 180], lat in [-90, 90]")]
    InvalidCoordinate {
        /// The rejected longitude.
        lon: f64,
        /// The rejected latitude.
        lat: f64,
    },
}

/// A geographic coordinate in degrees, longitude first.
///
/// Serializes as a two-element array `[lon, lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    lon: f64,
    lat: f64,
}

impl GeoPoint {
    /// Creates a point without range checks.
    ///
    /// Out-of-range values are passed straight through to the distance
    /// math; use [`Self::try_new`] when the input comes from an untrusted
    /// source.
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Creates a point, rejecting non-finite or out-of-range coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidCoordinate`] if `lon` is outside
    /// `[-180, 180]` or `lat` is outside `[-90, 90]`.
    pub fn try_new(lon: f64, lat: f64) -> Result<Self, GeometryError> {
        if (-180.0..=180.0).contains(&lon) && (-90.0..=90.0).contains(&lat) {
            Ok(Self { lon, lat })
        } else {
            Err(GeometryError::InvalidCoordinate { lon, lat })
        }
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn lon(self) -> f64 {
        self.lon
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn lat(self) -> f64 {
        self.lat
    }

    /// Returns `true` if both coordinates are finite and within range.
    #[must_use]
    pub fn is_valid(self) -> bool {
        Self::try_new(self.lon, self.lat).is_ok()
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.lon, self.lat)
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self::new(lon, lat)
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(point: GeoPoint) -> Self {
        [point.lon, point.lat]
    }
}

impl From<geo::Point<f64>> for GeoPoint {
    fn from(point: geo::Point<f64>) -> Self {
        Self::new(point.x(), point.y())
    }
}

impl From<geo::Coord<f64>> for GeoPoint {
    fn from(coord: geo::Coord<f64>) -> Self {
        Self::new(coord.x, coord.y)
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(point: GeoPoint) -> Self {
        Self::new(point.lon, point.lat)
    }
}

/// Anything that may carry a geographic position.
///
/// Items whose location is missing or could not be decoded return `None`
/// and are treated as unlocatable by every proximity query.
pub trait Locatable {
    /// The item's position, if it has a usable one.
    fn location(&self) -> Option<GeoPoint>;
}

impl Locatable for GeoPoint {
    fn location(&self) -> Option<GeoPoint> {
        Some(*self)
    }
}

impl Locatable for Option<GeoPoint> {
    fn location(&self) -> Option<GeoPoint> {
        *self
    }
}

impl<T: Locatable + ?Sized> Locatable for &T {
    fn location(&self) -> Option<GeoPoint> {
        (**self).location()
    }
}

/// Great-circle distance between two points in kilometers (haversine).
///
/// Symmetric, never negative, and zero for identical points. Coordinates are
/// not validated.
#[must_use]
pub fn distance_km(p1: GeoPoint, p2: GeoPoint) -> f64 {
    let d_lat = (p2.lat - p1.lat).to_radians();
    let d_lon = (p2.lon - p1.lon).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + p1.lat.to_radians().cos() * p2.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points.
    let a = a.min(1.0);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEXICO_CITY: GeoPoint = GeoPoint::new(-99.1332, 19.4326);
    const GUADALAJARA: GeoPoint = GeoPoint::new(-103.3496, 20.6597);
    const MONTERREY: GeoPoint = GeoPoint::new(-100.3161, 25.6866);

    #[test]
    fn mexico_city_to_guadalajara() {
        let d = distance_km(MEXICO_CITY, GUADALAJARA);
        assert!((460.0..=470.0).contains(&d), "got {d}");
    }

    #[test]
    fn distance_to_self_is_zero() {
        for p in [MEXICO_CITY, GUADALAJARA, GeoPoint::new(0.0, 0.0), GeoPoint::new(180.0, -90.0)] {
            assert!(distance_km(p, p).abs() < 1e-9);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (MEXICO_CITY, GUADALAJARA),
            (MONTERREY, GUADALAJARA),
            (GeoPoint::new(179.9, 10.0), GeoPoint::new(-179.9, -10.0)),
        ];
        for (a, b) in pairs {
            assert!((distance_km(a, b) - distance_km(b, a)).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn triangle_inequality_holds() {
        let ab = distance_km(MEXICO_CITY, MONTERREY);
        let bc = distance_km(MONTERREY, GUADALAJARA);
        let ac = distance_km(MEXICO_CITY, GUADALAJARA);
        assert!(ac <= ab + bc + 1e-9);
    }

    #[test]
    fn antipodal_points_are_half_circumference() {
        let d = distance_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(180.0, 0.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn try_new_rejects_out_of_range() {
        assert!(GeoPoint::try_new(-99.1, 19.4).is_ok());
        assert_eq!(
            GeoPoint::try_new(181.0, 0.0),
            Err(GeometryError::InvalidCoordinate { lon: 181.0, lat: 0.0 })
        );
        assert!(GeoPoint::try_new(0.0, -90.5).is_err());
        assert!(GeoPoint::try_new(f64::NAN, 0.0).is_err());
        assert!(!GeoPoint::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn serializes_as_lon_lat_array() {
        let json = serde_json::to_string(&MEXICO_CITY).unwrap();
        assert_eq!(json, "[-99.1332,19.4326]");

        let back: GeoPoint = serde_json::from_str("[-103.3496, 20.6597]").unwrap();
        assert_eq!(back, GUADALAJARA);
    }

    #[test]
    fn converts_to_and_from_geo_point() {
        let point: geo::Point<f64> = MONTERREY.into();
        assert!((point.x() - MONTERREY.lon()).abs() < f64::EPSILON);
        assert!((point.y() - MONTERREY.lat()).abs() < f64::EPSILON);
        assert_eq!(GeoPoint::from(point), MONTERREY);
    }
}
