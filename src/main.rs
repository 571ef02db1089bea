//! CLI entry point for the bike traffic map pipeline.
//!
//! Provides subcommands for a single aggregation pass over station/trip
//! sources and for sweeping the time-of-day filter the way the UI slider
//! would, with debounced filter application.

use anyhow::Result;
use bike_traffic_map::render::{FixedViewport, LoggingSink};
use bike_traffic_map::session::{Debouncer, Session};
use bike_traffic_map::traffic::TrafficSnapshot;
use bike_traffic_map::{fetch, stations, trips};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Quiet interval before a pending slider value is applied.
const DEBOUNCE_MS: u64 = 100;

#[derive(Parser)]
#[command(name = "bike_traffic_map")]
#[command(about = "Aggregate and render bike-share station traffic", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one aggregation pass and log the marker summary
    Render {
        /// Station JSON source (path or URL)
        #[arg(long, value_name = "FILE_OR_URL")]
        stations: String,

        /// Trip CSV source (path or URL)
        #[arg(long, value_name = "FILE_OR_URL")]
        trips: String,

        /// Filter center as minute-of-day, or -1 for all day
        #[arg(short, long, default_value_t = -1)]
        filter: i32,

        /// Optional file to write the snapshot JSON to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Sweep the time filter across the day with debounced application
    Sweep {
        /// Station JSON source (path or URL)
        #[arg(long, value_name = "FILE_OR_URL")]
        stations: String,

        /// Trip CSV source (path or URL)
        #[arg(long, value_name = "FILE_OR_URL")]
        trips: String,

        /// Minutes between successive slider positions
        #[arg(short = 's', long, default_value_t = 120)]
        step: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bike_traffic_map.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bike_traffic_map.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            stations,
            trips,
            filter,
            output,
        } => {
            let mut session = load_session(&stations, &trips).await;

            let projector = metro_viewport();
            let mut sink = LoggingSink;
            if let Some(snapshot) = session.apply_slider(filter, &projector, &mut sink) {
                log_top_stations(&session, &snapshot);
                info!(label = %session.filter_label(), "render pass complete");

                if let Some(path) = output {
                    std::fs::write(&path, serde_json::to_string_pretty(&snapshot)?)?;
                    info!(path, "snapshot written");
                }
            }
        }
        Commands::Sweep {
            stations,
            trips,
            step,
        } => {
            let mut session = load_session(&stations, &trips).await;
            sweep(&mut session, step).await;
        }
    }

    Ok(())
}

/// Loads both data sources into a fresh session. A source that fails to load
/// or parse degrades to an empty collection; the pipeline still runs.
async fn load_session(station_source: &str, trip_source: &str) -> Session {
    let mut session = Session::new();

    match fetch::load_source(station_source).await {
        Ok(bytes) => match stations::from_json_bytes(&bytes) {
            Ok(list) => session.load_stations(list),
            Err(e) => {
                error!(source = station_source, error = %e, "station document unusable");
                session.load_stations(Vec::new());
            }
        },
        Err(e) => {
            error!(source = station_source, error = %e, "station source fetch failed");
            session.load_stations(Vec::new());
        }
    }

    match fetch::load_source(trip_source).await {
        Ok(bytes) => session.load_trips(trips::from_csv_bytes(&bytes)),
        Err(e) => {
            error!(source = trip_source, error = %e, "trip source fetch failed");
            session.load_trips(Vec::new());
        }
    }

    session
}

/// Drives the slider across the day: each position supersedes the previous
/// pending one, and aggregation runs only after the quiet interval.
async fn sweep(session: &mut Session, step: u32) {
    let projector = metro_viewport();
    let mut sink = LoggingSink;
    let mut debouncer = Debouncer::new();

    let mut positions: Vec<i32> = vec![-1];
    positions.extend((0..1440).step_by(step.max(1) as usize).map(|m| m as i32));

    for value in positions {
        debouncer.submit(value);
        tokio::time::sleep(Duration::from_millis(DEBOUNCE_MS)).await;

        let Some(settled) = debouncer.settle() else {
            continue;
        };
        match session.apply_slider(settled, &projector, &mut sink) {
            Some(snapshot) => {
                info!(
                    label = %session.filter_label(),
                    with_traffic = snapshot.stations_with_traffic(),
                    max_total = snapshot.max_total,
                    synthetic = snapshot.synthetic,
                    "sweep step"
                );
            }
            None => warn!(value = settled, "filter unchanged, skipped"),
        }
    }
}

fn log_top_stations(session: &Session, snapshot: &TrafficSnapshot) {
    let mut ranked: Vec<usize> = (0..snapshot.per_station.len()).collect();
    ranked.sort_by(|&a, &b| snapshot.per_station[b].total.cmp(&snapshot.per_station[a].total));

    for (rank, &i) in ranked.iter().take(5).enumerate() {
        let station = &session.stations()[i];
        let traffic = &snapshot.per_station[i];
        info!(
            rank = rank + 1,
            station = %station.name,
            station_id = %station.primary_id,
            total = traffic.total,
            departures = traffic.departures,
            arrivals = traffic.arrivals,
            pattern = traffic.pattern.label(),
            "top station"
        );
    }
}

/// Screen rectangle standing in for the interactive map viewport.
fn metro_viewport() -> FixedViewport {
    FixedViewport {
        width: 1280.0,
        height: 960.0,
        min_longitude: -71.2,
        max_longitude: -70.9,
        min_latitude: 42.27,
        max_latitude: 42.45,
    }
}
