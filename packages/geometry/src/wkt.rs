//! Well-known-text point decoding.

use std::sync::LazyLock;

use regex::Regex;

use crate::GeoPoint;

/// Matches `POINT(lon lat)` anywhere in the input, case-insensitively, so
/// prefixed forms such as `SRID=4326;POINT(...)` also decode.
static POINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)POINT\s*\(\s*([-\d.]+)\s+([-\d.]+)\s*\)").expect("valid regex")
});

/// Parses a WKT point string into a [`GeoPoint`].
///
/// Returns `None` for anything that is not a two-number point, including
/// numbers such as `1.2.3` that match the pattern but are not valid floats.
/// Coordinates are not range-checked.
#[must_use]
pub fn parse_wkt_point(input: &str) -> Option<GeoPoint> {
    let caps = POINT_RE.captures(input)?;
    let lon = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let lat = caps.get(2)?.as_str().parse::<f64>().ok()?;
    Some(GeoPoint::new(lon, lat))
}
