//! Trip summary for a planned route.

use roadwatch_event_models::{Event, EventKind};
use roadwatch_geometry::{
    GeoPoint, ProximityMode, RouteIndex, TravelEstimate, estimate_duration_at, nearby_with_mode,
    route_length_km,
};
use serde::Serialize;

use crate::RouteConfig;

/// Count of nearby events per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlertSummary {
    /// Crime and public-safety incidents.
    pub crime: usize,
    /// Natural or environmental hazards.
    pub hazard: usize,
    /// Construction, transit, and public works.
    pub infrastructure: usize,
    /// Festivals and community events.
    pub social: usize,
    /// Events whose category is not one of the four above.
    pub other: usize,
}

impl AlertSummary {
    /// Tallies `events` by [`EventKind`].
    #[must_use]
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        let mut summary = Self::default();
        for event in events {
            *summary.slot(event.kind) += 1;
        }
        summary
    }

    /// Number of events counted for `kind`.
    #[must_use]
    pub const fn count(&self, kind: EventKind) -> usize {
        match kind {
            EventKind::Crime => self.crime,
            EventKind::Hazard => self.hazard,
            EventKind::Infrastructure => self.infrastructure,
            EventKind::Social => self.social,
            EventKind::Unknown => self.other,
        }
    }

    /// Number of events across every bucket.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.crime + self.hazard + self.infrastructure + self.social + self.other
    }

    const fn slot(&mut self, kind: EventKind) -> &mut usize {
        match kind {
            EventKind::Crime => &mut self.crime,
            EventKind::Hazard => &mut self.hazard,
            EventKind::Infrastructure => &mut self.infrastructure,
            EventKind::Social => &mut self.social,
            EventKind::Unknown => &mut self.other,
        }
    }
}

/// Everything the trip panel shows for one route.
#[derive(Debug, Clone, Serialize)]
pub struct RouteAssessment<'a> {
    /// Sum of great-circle distances between consecutive vertices.
    pub length_km: f64,
    /// Driving time at the configured average speed.
    pub estimate: TravelEstimate,
    /// Events within the alert radius, in input order.
    pub nearby: Vec<&'a Event>,
    /// Per-category counts of `nearby`.
    pub alerts: AlertSummary,
}

/// Measures `path` and collects the events near it.
///
/// Long paths in vertex mode go through a [`RouteIndex`]; the result is the
/// same as the linear scan.
#[must_use]
pub fn assess_route<'a>(
    events: &'a [Event],
    path: &[GeoPoint],
    config: &RouteConfig,
) -> RouteAssessment<'a> {
    let nearby = if config.proximity == ProximityMode::Vertex && path.len() >= config.index_threshold
    {
        log::debug!("Indexing {}-point route", path.len());
        RouteIndex::new(path).nearby(events, config.radius_km)
    } else {
        nearby_with_mode(events, path, config.radius_km, config.proximity)
    };

    let alerts = AlertSummary::from_events(nearby.iter().copied());
    let length_km = route_length_km(path);
    let estimate = estimate_duration_at(path, config.average_speed_kmh);

    log::info!(
        "Route: {} ({estimate}), {} alerts within {} km",
        format_distance_km(length_km),
        alerts.total(),
        config.radius_km,
    );

    RouteAssessment {
        length_km,
        estimate,
        nearby,
        alerts,
    }
}

/// Renders a distance with one decimal, e.g. `"12.3 km"`.
#[must_use]
pub fn format_distance_km(km: f64) -> String {
    format!("{km:.1} km")
}
