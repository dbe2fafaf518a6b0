#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Event feed loading.
//!
//! Each feed implements [`EventSource`]. [`load_with_fallback`] fetches
//! from a source and, if that fails, substitutes the bundled dataset from
//! [`fallback`] so the map always has something to show. Individual
//! malformed records are dropped by [`normalize`] without failing the batch.

pub mod fallback;
pub mod normalize;
pub mod retry;

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use roadwatch_event_models::Event;
use serde::Deserialize;

/// Notice shown to the user when the live feed could not be loaded.
pub const FALLBACK_NOTICE: &str = "Failed to load live news data. Using mock data instead.";

/// Errors that can occur while loading events.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The feed answered, but not with an array of event records.
    #[error("Invalid event payload: {message}")]
    InvalidPayload {
        /// Description of what was wrong with the payload.
        message: String,
    },

    /// Non-retryable or exhausted HTTP status.
    #[error("Unexpected HTTP status: {message}")]
    Status {
        /// Status line and retry context.
        message: String,
    },
}

/// `[events]` configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventsConfig {
    /// Live feed endpoint returning a JSON array of events. When unset only
    /// the bundled dataset is used.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retry attempts for transient HTTP failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_max_retries() -> u32 {
    3
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

/// A provider of event records.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Human-readable description used in log output.
    fn name(&self) -> &str;

    /// Loads the current set of events.
    ///
    /// # Errors
    ///
    /// Returns [`EventError`] if the events cannot be retrieved or the
    /// payload is not an array of records.
    async fn fetch(&self) -> Result<Vec<Event>, EventError>;
}

/// Live JSON feed over HTTP.
pub struct HttpEventSource {
    client: reqwest::Client,
    url: String,
    max_retries: u32,
}

impl HttpEventSource {
    /// Creates a source for `url` using the timeout and retry settings in
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Http`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, config: &EventsConfig) -> Result<Self, EventError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            max_retries: config.max_retries,
        })
    }

    /// Builds a source from `config`, or `None` if no feed URL is configured.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &EventsConfig) -> Result<Option<Self>, EventError> {
        config
            .api_url
            .as_deref()
            .map(|url| Self::new(url, config))
            .transpose()
    }
}

#[async_trait]
impl EventSource for HttpEventSource {
    fn name(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Vec<Event>, EventError> {
        log::info!("Fetching events from {}", self.url);
        let body = retry::send_json(|| self.client.get(&self.url), self.max_retries).await?;
        normalize::parse_events(body)
    }
}

/// Events read from a local JSON file.
pub struct FileEventSource {
    path: PathBuf,
    name: String,
}

impl FileEventSource {
    /// Creates a source reading `path`.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();
        Self { path, name }
    }
}

#[async_trait]
impl EventSource for FileEventSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<Event>, EventError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        normalize::parse_events_str(&text)
    }
}

/// Where a loaded event set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOrigin {
    /// Fetched from the configured source.
    Live,
    /// The bundled dataset was used instead.
    Fallback,
}

/// Result of [`load_with_fallback`].
#[derive(Debug, Clone)]
pub struct LoadedEvents {
    /// The events to display.
    pub events: Vec<Event>,
    /// Whether the events are live or the fallback dataset.
    pub origin: EventOrigin,
    /// Non-fatal message to surface to the user, if any.
    pub notice: Option<String>,
}

impl LoadedEvents {
    /// The bundled dataset with no notice attached.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            events: fallback::fallback_events(),
            origin: EventOrigin::Fallback,
            notice: None,
        }
    }
}

/// Fetches events from `source`, falling back to the bundled dataset on
/// failure.
///
/// A payload that is not an array keeps the fallback silently (logged as a
/// warning). Any other failure also attaches [`FALLBACK_NOTICE`].
pub async fn load_with_fallback(source: &dyn EventSource) -> LoadedEvents {
    match source.fetch().await {
        Ok(events) => {
            log::info!("Loaded {} events from {}", events.len(), source.name());
            LoadedEvents {
                events,
                origin: EventOrigin::Live,
                notice: None,
            }
        }
        Err(EventError::InvalidPayload { message }) => {
            log::warn!(
                "{} returned an invalid payload ({message}), using fallback events instead",
                source.name()
            );
            LoadedEvents::fallback()
        }
        Err(e) => {
            log::error!("Error fetching events from {}: {e}", source.name());
            LoadedEvents {
                notice: Some(FALLBACK_NOTICE.to_string()),
                ..LoadedEvents::fallback()
            }
        }
    }
}
