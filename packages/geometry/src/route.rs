//! Route length and a coarse travel-time estimate.

use serde::{Deserialize, Serialize};

use crate::{GeoPoint, distance_km};

/// Assumed average driving speed. A fixed heuristic, not a measurement.
pub const AVERAGE_SPEED_KMH: f64 = 60.0;

/// Total length of a path in kilometers: the sum of the great-circle
/// distances between consecutive vertices.
///
/// Paths with fewer than two points have zero length.
#[must_use]
pub fn route_length_km(path: &[GeoPoint]) -> f64 {
    path.windows(2)
        .map(|pair| distance_km(pair[0], pair[1]))
        .sum()
}

/// Approximate driving time at [`AVERAGE_SPEED_KMH`].
///
/// Ignores road class and traffic; suitable only as a label.
#[must_use]
pub fn estimate_duration(path: &[GeoPoint]) -> TravelEstimate {
    estimate_duration_at(path, AVERAGE_SPEED_KMH)
}

/// Approximate driving time at a caller-supplied average speed.
#[must_use]
pub fn estimate_duration_at(path: &[GeoPoint], speed_kmh: f64) -> TravelEstimate {
    TravelEstimate::from_distance(route_length_km(path), speed_kmh)
}

/// Whole hours plus rounded minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TravelEstimate {
    /// Whole hours (floor of distance / speed).
    pub hours: u32,
    /// Remaining fraction of an hour, rounded to the nearest minute.
    pub minutes: u32,
}

impl TravelEstimate {
    /// Splits `distance_km / speed_kmh` into floored hours and rounded
    /// minutes.
    ///
    /// The minute rounding is applied to the remainder only, so a remainder
    /// of 59.5 minutes or more reads as `60`. Non-finite input or a
    /// non-positive speed yields a zero estimate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_distance(distance_km: f64, speed_kmh: f64) -> Self {
        if !distance_km.is_finite() || !speed_kmh.is_finite() || speed_kmh <= 0.0 || distance_km <= 0.0
        {
            return Self::default();
        }

        let total_hours = distance_km / speed_kmh;
        let hours = total_hours.floor();
        let minutes = ((total_hours - hours) * 60.0).round();

        Self {
            hours: hours as u32,
            minutes: minutes as u32,
        }
    }

    /// The estimate expressed in minutes.
    #[must_use]
    pub const fn total_minutes(self) -> u32 {
        self.hours.saturating_mul(60).saturating_add(self.minutes)
    }
}

impl std::fmt::Display for TravelEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_paths_have_zero_length() {
        assert!(route_length_km(&[]).abs() < f64::EPSILON);
        assert!(route_length_km(&[GeoPoint::new(-99.1, 19.4)]).abs() < f64::EPSILON);
        assert_eq!(estimate_duration(&[]), TravelEstimate::default());
    }

    #[test]
    fn length_is_sum_of_legs() {
        let path = [
            GeoPoint::new(-99.1332, 19.4326),
            GeoPoint::new(-100.3899, 20.5888),
            GeoPoint::new(-103.3496, 20.6597),
        ];
        let expected = distance_km(path[0], path[1]) + distance_km(path[1], path[2]);
        assert!((route_length_km(&path) - expected).abs() < 1e-9);
        assert!(route_length_km(&path) > distance_km(path[0], path[2]));
    }

    #[test]
    fn splits_hours_and_minutes() {
        assert_eq!(
            TravelEstimate::from_distance(90.0, AVERAGE_SPEED_KMH),
            TravelEstimate { hours: 1, minutes: 30 }
        );
        assert_eq!(
            TravelEstimate::from_distance(45.0, AVERAGE_SPEED_KMH),
            TravelEstimate { hours: 0, minutes: 45 }
        );
        assert_eq!(
            TravelEstimate::from_distance(120.0, 60.0),
            TravelEstimate { hours: 2, minutes: 0 }
        );
    }

    #[test]
    fn rounds_minutes_of_remainder() {
        // 0.9999 h -> 59.994 min rounds up without carrying into hours.
        let estimate = TravelEstimate::from_distance(59.994, 60.0);
        assert_eq!(estimate, TravelEstimate { hours: 0, minutes: 60 });
    }

    #[test]
    fn degenerate_speed_yields_zero() {
        assert_eq!(TravelEstimate::from_distance(100.0, 0.0), TravelEstimate::default());
        assert_eq!(TravelEstimate::from_distance(100.0, -5.0), TravelEstimate::default());
        assert_eq!(TravelEstimate::from_distance(f64::NAN, 60.0), TravelEstimate::default());
    }

    #[test]
    fn estimate_uses_route_length() {
        // One degree of latitude is ~111.19 km: 1h 51m at 60 km/h.
        let path = [GeoPoint::new(-100.0, 25.0), GeoPoint::new(-100.0, 26.0)];
        let estimate = estimate_duration(&path);
        assert_eq!(estimate, TravelEstimate { hours: 1, minutes: 51 });
        assert_eq!(estimate.to_string(), "1h 51m");
        assert_eq!(estimate.total_minutes(), 111);
        assert_eq!(estimate_duration_at(&path, 111.0), TravelEstimate { hours: 1, minutes: 0 });
    }
}
