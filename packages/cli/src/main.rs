#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for route proximity alerts.

mod config;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use config::RoadwatchConfig;
use roadwatch_event::{
    EventOrigin, EventSource, FileEventSource, HttpEventSource, LoadedEvents, load_with_fallback,
};
use roadwatch_event_models::{Event, EventKind};
use roadwatch_geometry::{GeoPoint, ProximityMode, distance_km, parse_wkt_point};
use roadwatch_route::{RouteConfig, assess_route, format_distance_km, load_route_file};

#[derive(Parser)]
#[command(name = "roadwatch", about = "Events near a driving route")]
struct Cli {
    /// TOML config file replacing the built-in defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Great-circle distance between two points
    Distance {
        /// Start point, as `lon,lat` or `POINT(lon lat)`
        #[arg(value_parser = parse_point_arg, allow_hyphen_values = true)]
        from: GeoPoint,
        /// End point, as `lon,lat` or `POINT(lon lat)`
        #[arg(value_parser = parse_point_arg, allow_hyphen_values = true)]
        to: GeoPoint,
    },
    /// Distance, travel time, and alerts for a route file
    Route {
        /// `GeoJSON` line, directions response, or `[lon, lat]` array
        route_file: PathBuf,
        #[command(flatten)]
        alerts: AlertArgs,
    },
    /// List events near a path given as points, as JSON
    Nearby {
        /// Path vertices in traversal order
        #[arg(
            required = true,
            value_parser = parse_point_arg,
            allow_hyphen_values = true
        )]
        points: Vec<GeoPoint>,
        #[command(flatten)]
        alerts: AlertArgs,
    },
    /// List every loaded event, including ones without a location
    Events {
        /// Read events from a JSON file instead of the live feed
        #[arg(long)]
        events: Option<PathBuf>,
    },
    /// Parse a WKT point
    Locate {
        /// e.g. "POINT(-99.1332 19.4326)"
        wkt: String,
    },
}

#[derive(clap::Args)]
struct AlertArgs {
    /// Read events from a JSON file instead of the live feed
    #[arg(long)]
    events: Option<PathBuf>,
    /// Alert radius in kilometers (default from config)
    #[arg(long)]
    radius: Option<f64>,
    /// `vertex` or `segment` (default from config)
    #[arg(long)]
    proximity: Option<ProximityMode>,
}

impl AlertArgs {
    fn route_config(&self, config: &RoadwatchConfig) -> RouteConfig {
        RouteConfig {
            radius_km: self.radius.unwrap_or(config.route.radius_km),
            proximity: self.proximity.unwrap_or(config.route.proximity),
            ..config.route.clone()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let config = RoadwatchConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Distance { from, to } => {
            println!("{}", format_distance_km(distance_km(from, to)));
        }
        Commands::Route { route_file, alerts } => {
            let path = load_route_file(&route_file)?;
            let loaded = load_events(&config, alerts.events.as_deref()).await?;
            let assessment = assess_route(&loaded.events, &path, &alerts.route_config(&config));

            println!("Distance: {}", format_distance_km(assessment.length_km));
            println!("Estimated time: {}", assessment.estimate);
            println!();
            println!("Alerts along route ({})", assessment.alerts.total());
            for kind in EventKind::alert_kinds() {
                println!("  {:<16} {}", kind.label(), assessment.alerts.count(*kind));
            }
            if assessment.alerts.other > 0 {
                println!("  {:<16} {}", EventKind::Unknown.label(), assessment.alerts.other);
            }
            if !assessment.nearby.is_empty() {
                println!();
                for event in &assessment.nearby {
                    println!("{}", event_line(event));
                }
            }
        }
        Commands::Nearby { points, alerts } => {
            let loaded = load_events(&config, alerts.events.as_deref()).await?;
            let assessment = assess_route(&loaded.events, &points, &alerts.route_config(&config));
            println!("{}", serde_json::to_string_pretty(&assessment.nearby)?);
        }
        Commands::Events { events } => {
            let loaded = load_events(&config, events.as_deref()).await?;
            if loaded.origin == EventOrigin::Fallback {
                println!("Showing {} bundled events", loaded.events.len());
            }
            for event in &loaded.events {
                println!("{}", event_line(event));
            }
        }
        Commands::Locate { wkt } => {
            let point = parse_wkt_point(&wkt).ok_or_else(|| format!("Not a WKT point: {wkt}"))?;
            println!("lon: {}", point.lon());
            println!("lat: {}", point.lat());
        }
    }

    Ok(())
}

/// Loads events from `file` when given, otherwise from the configured feed,
/// otherwise the bundled dataset.
async fn load_events(
    config: &RoadwatchConfig,
    file: Option<&Path>,
) -> Result<LoadedEvents, Box<dyn std::error::Error>> {
    let source: Box<dyn EventSource> = match file {
        Some(path) => Box::new(FileEventSource::new(path)),
        None => match HttpEventSource::from_config(&config.events)? {
            Some(source) => Box::new(source),
            None => {
                log::info!("No events URL configured, using bundled events");
                return Ok(LoadedEvents::fallback());
            }
        },
    };

    let loaded = load_with_fallback(source.as_ref()).await;
    if let Some(notice) = &loaded.notice {
        eprintln!("{notice}");
    }
    Ok(loaded)
}

fn event_line(event: &Event) -> String {
    let location = event
        .location
        .map_or_else(|| "unlocatable".to_string(), |point| point.to_string());
    format!(
        "[{:<14}] {:<24} {}",
        event.kind.label(),
        location,
        event.title
    )
}

/// Parses `lon,lat` or a WKT point, rejecting out-of-range coordinates.
fn parse_point_arg(value: &str) -> Result<GeoPoint, String> {
    let point = match parse_wkt_point(value) {
        Some(point) => point,
        None => {
            let (lon, lat) = value
                .split_once(',')
                .ok_or_else(|| format!("expected `lon,lat` or `POINT(lon lat)`, got `{value}`"))?;
            let lon: f64 = lon.trim().parse().map_err(|e| format!("bad longitude: {e}"))?;
            let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude: {e}"))?;
            GeoPoint::new(lon, lat)
        }
    };

    GeoPoint::try_new(point.lon(), point.lat()).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_point_arguments() {
        assert_eq!(
            parse_point_arg("-99.1332,19.4326").unwrap(),
            GeoPoint::new(-99.1332, 19.4326)
        );
        assert_eq!(
            parse_point_arg(" -103.3496 , 20.6597 ").unwrap(),
            GeoPoint::new(-103.3496, 20.6597)
        );
        assert_eq!(
            parse_point_arg("POINT(-100.3161 25.6866)").unwrap(),
            GeoPoint::new(-100.3161, 25.6866)
        );
        assert!(parse_point_arg("19.4").is_err());
        assert!(parse_point_arg("east,north").is_err());
        assert!(parse_point_arg("181,0").is_err());
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from([
            "roadwatch",
            "nearby",
            "--radius",
            "5",
            "--proximity",
            "segment",
            "100,25",
            "100,26",
        ])
        .unwrap();

        let Commands::Nearby { points, alerts } = cli.command else {
            panic!("expected nearby");
        };
        assert_eq!(points.len(), 2);

        let route = alerts.route_config(&RoadwatchConfig::default());
        assert!((route.radius_km - 5.0).abs() < f64::EPSILON);
        assert_eq!(route.proximity, ProximityMode::Segment);
        assert_eq!(route.index_threshold, 512);
    }

    #[test]
    fn proximity_flag_rejects_unknown_modes() {
        let cli =
            Cli::try_parse_from(["roadwatch", "route", "trip.json", "--proximity", "vertex"]).unwrap();
        let Commands::Route { alerts, .. } = cli.command else {
            panic!("expected route");
        };
        assert_eq!(alerts.proximity, Some(ProximityMode::Vertex));

        assert!(
            Cli::try_parse_from(["roadwatch", "route", "trip.json", "--proximity", "nearest"])
                .is_err()
        );
    }

    #[test]
    fn event_line_marks_unlocatable() {
        let event: Event = serde_json::from_value(serde_json::json!({
            "id": 3,
            "title": "Storm warning",
            "type": "hazard",
            "coordinates": "somewhere"
        }))
        .unwrap();

        let line = event_line(&event);
        assert!(line.contains("Hazard"));
        assert!(line.contains("unlocatable"));
        assert!(line.ends_with("Storm warning"));
    }
}
