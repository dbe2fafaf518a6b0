//! Runtime configuration.
//!
//! Defaults are embedded from `config/default.toml` at compile time. A file
//! passed with `--config` replaces them, and `ROADWATCH_EVENTS_URL` takes
//! precedence over whatever `[events] api_url` says.

use std::path::Path;

use roadwatch_event::EventsConfig;
use roadwatch_route::RouteConfig;
use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Environment variable overriding the live event feed URL.
pub const EVENTS_URL_ENV: &str = "ROADWATCH_EVENTS_URL";

/// Errors from loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for [`RoadwatchConfig`].
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RoadwatchConfig {
    /// `[events]`: live feed location and HTTP settings.
    #[serde(default)]
    pub events: EventsConfig,
    /// `[route]`: alert radius, speed, and proximity mode.
    #[serde(default)]
    pub route: RouteConfig,
}

impl RoadwatchConfig {
    /// Parses a TOML document. Missing sections and keys take their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the document is malformed.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// The configuration compiled into the binary.
    ///
    /// # Panics
    ///
    /// Panics if the embedded `config/default.toml` is malformed.
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_toml(DEFAULT_CONFIG)
            .unwrap_or_else(|e| panic!("Failed to parse embedded config/default.toml: {e}"))
    }

    /// Loads `path` (or the embedded defaults) and applies environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `path` cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                log::debug!("Loading config from {}", path.display());
                Self::from_toml(&std::fs::read_to_string(path)?)?
            }
            None => Self::embedded(),
        };

        config.override_events_url(std::env::var(EVENTS_URL_ENV).ok());
        Ok(config)
    }

    /// Replaces the feed URL with `url` unless it is unset or blank.
    pub fn override_events_url(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|url| !url.trim().is_empty()) {
            log::debug!("Using events URL from {EVENTS_URL_ENV}");
            self.events.api_url = Some(url);
        }
    }
}

#[cfg(test)]
mod tests {
    use roadwatch_geometry::ProximityMode;

    use super::*;

    #[test]
    fn embedded_matches_defaults() {
        let config = RoadwatchConfig::embedded();
        assert_eq!(config, RoadwatchConfig::default());
        assert!(config.events.api_url.is_none());
        assert!((config.route.radius_km - 15.0).abs() < f64::EPSILON);
        assert!((config.route.average_speed_kmh - 60.0).abs() < f64::EPSILON);
        assert_eq!(config.route.proximity, ProximityMode::Vertex);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = RoadwatchConfig::from_toml(
            r#"
            [events]
            api_url = "http://localhost:8080/api/news/today"

            [route]
            radius_km = 5.0
            proximity = "segment"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.events.api_url.as_deref(),
            Some("http://localhost:8080/api/news/today")
        );
        assert_eq!(config.events.max_retries, 3);
        assert!((config.route.radius_km - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.route.proximity, ProximityMode::Segment);
        assert_eq!(config.route.index_threshold, 512);

        assert_eq!(RoadwatchConfig::from_toml("").unwrap(), RoadwatchConfig::default());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            RoadwatchConfig::from_toml("[route]\nproximity = \"nearest\""),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            RoadwatchConfig::load(Some(Path::new("/nonexistent/roadwatch.toml"))),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn events_url_override_ignores_blank() {
        let mut config = RoadwatchConfig::default();
        config.override_events_url(Some("   ".to_string()));
        assert!(config.events.api_url.is_none());

        config.override_events_url(None);
        assert!(config.events.api_url.is_none());

        config.override_events_url(Some("http://localhost:9/feed".to_string()));
        assert_eq!(config.events.api_url.as_deref(), Some("http://localhost:9/feed"));
    }
}
