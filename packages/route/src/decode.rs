//! Route geometry decoding.
//!
//! Accepts three shapes of JSON:
//!
//! * a directions response, `{"code": "Ok", "routes": [{"geometry": ...}]}`,
//!   taking the first route. A non-`Ok` code, an empty `routes` array, or a
//!   first route without coordinates is [`RouteError::NoRoute`];
//! * `GeoJSON`: a `LineString` or `MultiLineString` geometry, a `Feature`
//!   wrapping one, or a `FeatureCollection` (first line feature wins);
//! * a bare array of `[lon, lat]` pairs.

use geojson::GeoJson;
use roadwatch_geometry::GeoPoint;
use serde::Deserialize;

use crate::RouteError;

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    code: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    geometry: serde_json::Value,
}

/// Decodes a route from JSON text.
///
/// # Errors
///
/// Returns [`RouteError`] if the text is not JSON, is not one of the
/// accepted shapes, or contains out-of-range coordinates.
pub fn parse_route(text: &str) -> Result<Vec<GeoPoint>, RouteError> {
    parse_route_value(serde_json::from_str(text)?)
}

/// Decodes a route from an already-parsed JSON value.
///
/// # Errors
///
/// See [`parse_route`].
pub fn parse_route_value(value: serde_json::Value) -> Result<Vec<GeoPoint>, RouteError> {
    if value.is_array() {
        let pairs: Vec<[f64; 2]> = serde_json::from_value(value)?;
        return validated(pairs.into_iter().map(GeoPoint::from));
    }

    if value.get("routes").is_some() {
        return from_directions(serde_json::from_value(value)?);
    }

    from_geojson(GeoJson::from_json_value(value)?)
}

fn from_directions(response: DirectionsResponse) -> Result<Vec<GeoPoint>, RouteError> {
    if response.code.as_deref() != Some("Ok") {
        log::warn!("Directions response code: {:?}", response.code);
        return Err(RouteError::NoRoute);
    }

    let route = response.routes.into_iter().next().ok_or(RouteError::NoRoute)?;
    let geometry = geojson::Geometry::from_json_value(route.geometry)?;
    let points = line_points(geometry.try_into()?)?;

    if points.is_empty() {
        log::warn!("Directions response returned a route without coordinates");
        return Err(RouteError::NoRoute);
    }

    Ok(points)
}

fn from_geojson(document: GeoJson) -> Result<Vec<GeoPoint>, RouteError> {
    let geometry = match document {
        GeoJson::Geometry(geometry) => geometry,
        GeoJson::Feature(feature) => feature.geometry.ok_or_else(|| RouteError::UnsupportedGeometry {
            kind: "feature without geometry".to_string(),
        })?,
        GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .filter_map(|feature| feature.geometry)
            .find(|geometry| {
                matches!(
                    geometry.value,
                    geojson::Value::LineString(_) | geojson::Value::MultiLineString(_)
                )
            })
            .ok_or(RouteError::NoRoute)?,
    };

    line_points(geometry.try_into()?)
}

fn line_points(geometry: geo::Geometry<f64>) -> Result<Vec<GeoPoint>, RouteError> {
    match geometry {
        geo::Geometry::LineString(line) => {
            validated(line.coords().copied().map(GeoPoint::from))
        }
        geo::Geometry::MultiLineString(lines) => validated(
            lines
                .iter()
                .flat_map(|line| line.coords().copied())
                .map(GeoPoint::from),
        ),
        other => Err(RouteError::UnsupportedGeometry {
            kind: geometry_kind(&other).to_string(),
        }),
    }
}

fn validated(points: impl Iterator<Item = GeoPoint>) -> Result<Vec<GeoPoint>, RouteError> {
    points
        .map(|p| GeoPoint::try_new(p.lon(), p.lat()).map_err(RouteError::from))
        .collect()
}

const fn geometry_kind(geometry: &geo::Geometry<f64>) -> &'static str {
    match geometry {
        geo::Geometry::Point(_) => "Point",
        geo::Geometry::MultiPoint(_) => "MultiPoint",
        geo::Geometry::Polygon(_) => "Polygon",
        geo::Geometry::MultiPolygon(_) => "MultiPolygon",
        geo::Geometry::GeometryCollection(_) => "GeometryCollection",
        _ => "non-line geometry",
    }
}
