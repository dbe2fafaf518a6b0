#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map event taxonomy and record types.
//!
//! Events arrive from the live news feed or the bundled fallback dataset.
//! Their location may be a `[lon, lat]` pair, a WKT `POINT(lon lat)` string,
//! or something unusable; all three decode into [`Event::location`], with
//! the last becoming `None` rather than a decoding error.

use roadwatch_geometry::{GeoPoint, Locatable, parse_wkt_point};
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Event category shown on the map and counted in route alerts.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EventKind {
    /// Crime and public-safety incidents
    Crime,
    /// Construction, transit, and public works
    Infrastructure,
    /// Natural or environmental hazards (fires, storms, floods)
    Hazard,
    /// Festivals, gatherings, and community events
    Social,
    /// Anything not mapped to a known category
    #[default]
    #[serde(other)]
    Unknown,
}

impl EventKind {
    /// Maps a free-form category name to a kind, falling back to
    /// [`Self::Unknown`] for unrecognized names.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        name.trim().parse().unwrap_or_default()
    }

    /// Categories that get their own bucket in route alert summaries.
    #[must_use]
    pub const fn alert_kinds() -> &'static [Self] {
        &[Self::Crime, Self::Hazard, Self::Infrastructure, Self::Social]
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Crime,
            Self::Infrastructure,
            Self::Hazard,
            Self::Social,
            Self::Unknown,
        ]
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Crime => "Crime",
            Self::Infrastructure => "Infrastructure",
            Self::Hazard => "Hazard",
            Self::Social => "Social",
            Self::Unknown => "Other",
        }
    }

    /// Marker color as a CSS hex string.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Crime => "#ed7b7b",
            Self::Infrastructure => "#99c5ff",
            Self::Hazard => "#edde53",
            Self::Social => "#65db8e",
            Self::Unknown => "#8C8C8C",
        }
    }
}

/// Event identifier as supplied by the feed (numeric or string).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    /// Numeric identifier.
    Number(i64),
    /// Opaque string identifier.
    Text(String),
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EventId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Location encodings accepted from event feeds.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawLocation {
    /// `[lon, lat]`
    Pair([f64; 2]),
    /// WKT point, e.g. `"POINT(-99.1332 19.4326)"`
    Wkt(String),
    /// Anything else (wrong arity, objects, numbers).
    Unsupported(serde::de::IgnoredAny),
}

impl RawLocation {
    /// Decodes into a point, or `None` if the encoding is unusable.
    #[must_use]
    pub fn resolve(&self) -> Option<GeoPoint> {
        match self {
            Self::Pair(pair) => Some(GeoPoint::from(*pair)),
            Self::Wkt(text) => parse_wkt_point(text),
            Self::Unsupported(_) => None,
        }
    }
}

/// A news or safety event plotted on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Feed identifier.
    pub id: EventId,
    /// Headline.
    #[serde(default)]
    pub title: String,
    /// Longer summary.
    #[serde(default)]
    pub description: Option<String>,
    /// Category; unknown or missing names map to [`EventKind::Unknown`].
    #[serde(rename = "type", default, deserialize_with = "deserialize_kind")]
    pub kind: EventKind,
    /// Position, or `None` when the feed supplied no usable location.
    #[serde(
        rename = "coordinates",
        default,
        deserialize_with = "deserialize_location"
    )]
    pub location: Option<GeoPoint>,
    /// Publication date as supplied by the feed (typically `YYYY-MM-DD`).
    #[serde(default)]
    pub date: Option<String>,
    /// Link to the full story.
    #[serde(default)]
    pub url: Option<String>,
}

impl Event {
    /// Returns `true` if this event can be placed on the map.
    #[must_use]
    pub const fn is_locatable(&self) -> bool {
        self.location.is_some()
    }
}

impl Locatable for Event {
    fn location(&self) -> Option<GeoPoint> {
        self.location
    }
}

fn deserialize_kind<'de, D>(deserializer: D) -> Result<EventKind, D::Error>
where
    D: Deserializer<'de>,
{
    let name: Option<String> = Option::deserialize(deserializer)?;
    Ok(name.as_deref().map(EventKind::from_name).unwrap_or_default())
}

fn deserialize_location<'de, D>(deserializer: D) -> Result<Option<GeoPoint>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawLocation> = Option::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(RawLocation::resolve))
}
