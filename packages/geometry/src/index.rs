//! R-tree accelerated vertex proximity for long routes.
//!
//! [`RouteIndex`] answers the same question as [`crate::nearby`] in
//! [`crate::ProximityMode::Vertex`] mode: the R-tree only narrows the set of
//! vertices that need an exact haversine check. The search window is a
//! latitude/longitude box that fully contains the query circle, so results
//! are identical to the linear scan. Where no such box exists (the circle
//! reaches a pole or crosses the antimeridian) the query falls back to
//! scanning every vertex.

use std::f64::consts::FRAC_PI_2;

use rstar::{AABB, RTree};

use crate::{EARTH_RADIUS_KM, GeoPoint, Locatable, distance_km};

/// Relative padding applied to the search window to absorb rounding.
const WINDOW_PADDING: f64 = 1e-6;

/// Absolute padding in degrees applied to the search window.
const WINDOW_PADDING_DEG: f64 = 1e-9;

/// Spatial index over the vertices of a single path.
pub struct RouteIndex {
    vertices: Vec<GeoPoint>,
    tree: RTree<[f64; 2]>,
    /// `false` when some vertex is out of range; windowed lookups would miss
    /// wrapped longitudes, so every query scans linearly.
    windowable: bool,
}

impl RouteIndex {
    /// Builds an index over `path`.
    #[must_use]
    pub fn new(path: &[GeoPoint]) -> Self {
        let windowable = path.iter().all(|vertex| vertex.is_valid());
        let tree = RTree::bulk_load(path.iter().map(|v| [v.lon(), v.lat()]).collect());

        if !windowable {
            log::warn!("Route contains out-of-range vertices; index will scan linearly");
        }
        log::debug!("Indexed {} route vertices", tree.size());

        Self {
            vertices: path.to_vec(),
            tree,
            windowable,
        }
    }

    /// Number of indexed vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns `true` if the indexed path has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The indexed path, in traversal order.
    #[must_use]
    pub fn vertices(&self) -> &[GeoPoint] {
        &self.vertices
    }

    /// Returns `true` if `point` is within `radius_km` of any vertex.
    #[must_use]
    pub fn is_near(&self, point: GeoPoint, radius_km: f64) -> bool {
        if self.vertices.is_empty() {
            return false;
        }

        let within = |vertex: GeoPoint| distance_km(point, vertex) <= radius_km;

        match self.search_window(point, radius_km) {
            Some(window) => self
                .tree
                .locate_in_envelope(&window)
                .any(|v| within(GeoPoint::new(v[0], v[1]))),
            None => self.vertices.iter().copied().any(within),
        }
    }

    /// Returns the items of `candidates` within `radius_km` of any indexed
    /// vertex, preserving input order. Unlocatable items are skipped.
    #[must_use]
    pub fn nearby<'a, T: Locatable>(&self, candidates: &'a [T], radius_km: f64) -> Vec<&'a T> {
        candidates
            .iter()
            .filter(|candidate| {
                candidate
                    .location()
                    .is_some_and(|point| self.is_near(point, radius_km))
            })
            .collect()
    }

    /// Bounding box containing every point within `radius_km` of `point`,
    /// or `None` if a linear scan is required.
    fn search_window(&self, point: GeoPoint, radius_km: f64) -> Option<AABB<[f64; 2]>> {
        if !self.windowable || !point.is_valid() || !radius_km.is_finite() || radius_km < 0.0 {
            return None;
        }

        let angular = radius_km / EARTH_RADIUS_KM;
        if angular >= FRAC_PI_2 {
            return None;
        }

        let cos_lat = point.lat().to_radians().cos();
        let sin_angular = angular.sin();
        if sin_angular >= cos_lat {
            return None;
        }

        let d_lat = angular.to_degrees().mul_add(1.0 + WINDOW_PADDING, WINDOW_PADDING_DEG);
        let d_lon = (sin_angular / cos_lat)
            .asin()
            .to_degrees()
            .mul_add(1.0 + WINDOW_PADDING, WINDOW_PADDING_DEG);

        let min_lon = point.lon() - d_lon;
        let max_lon = point.lon() + d_lon;
        if min_lon < -180.0 || max_lon > 180.0 {
            return None;
        }

        Some(AABB::from_corners(
            [min_lon, point.lat() - d_lat],
            [max_lon, point.lat() + d_lat],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nearby;

    fn dense_route() -> Vec<GeoPoint> {
        // Mexico City towards Guadalajara, sampled every ~1 km.
        (0..=460)
            .map(|i| {
                let t = f64::from(i) / 460.0;
                GeoPoint::new(-99.1332 + t * (-103.3496 + 99.1332), 19.4326 + t * (20.6597 - 19.4326))
            })
            .collect()
    }

    fn grid(lon0: f64, lat0: f64, step: f64) -> Vec<GeoPoint> {
        let mut points = Vec::new();
        for i in 0..25 {
            for j in 0..25 {
                points.push(GeoPoint::new(
                    lon0 + f64::from(i) * step,
                    lat0 + f64::from(j) * step,
                ));
            }
        }
        points
    }

    #[test]
    fn matches_linear_scan() {
        let route = dense_route();
        let index = RouteIndex::new(&route);
        let candidates = grid(-104.0, 19.0, 0.25);

        for radius in [0.0, 1.0, 15.0, 60.0, 400.0] {
            assert_eq!(
                index.nearby(&candidates, radius),
                nearby(&candidates, &route, radius),
                "radius {radius}"
            );
        }
    }

    #[test]
    fn matches_linear_scan_across_antimeridian() {
        let route = vec![
            GeoPoint::new(179.5, -16.0),
            GeoPoint::new(179.9, -16.2),
            GeoPoint::new(-179.8, -16.4),
            GeoPoint::new(-179.4, -16.5),
        ];
        let index = RouteIndex::new(&route);
        let candidates = vec![
            GeoPoint::new(179.95, -16.3),
            GeoPoint::new(-179.95, -16.3),
            GeoPoint::new(-179.3, -16.5),
            GeoPoint::new(170.0, -16.0),
        ];

        for radius in [5.0, 30.0, 100.0] {
            assert_eq!(
                index.nearby(&candidates, radius),
                nearby(&candidates, &route, radius),
                "radius {radius}"
            );
        }
    }

    #[test]
    fn matches_linear_scan_near_pole() {
        let route = vec![GeoPoint::new(0.0, 89.5), GeoPoint::new(90.0, 89.6)];
        let index = RouteIndex::new(&route);
        let candidates = vec![GeoPoint::new(180.0, 89.7), GeoPoint::new(-45.0, 88.0)];

        for radius in [10.0, 100.0, 300.0] {
            assert_eq!(
                index.nearby(&candidates, radius),
                nearby(&candidates, &route, radius)
            );
        }
    }

    #[test]
    fn empty_index_matches_nothing() {
        let index = RouteIndex::new(&[]);
        assert!(index.is_empty());
        assert!(!index.is_near(GeoPoint::new(0.0, 0.0), 20_000.0));
    }

    #[test]
    fn skips_unlocatable_candidates() {
        let route = dense_route();
        let index = RouteIndex::new(&route);
        let candidates = [None, Some(route[10])];
        let result = index.nearby(&candidates, 1.0);
        assert_eq!(result, vec![&candidates[1]]);
        assert_eq!(index.len(), route.len());
    }
}
