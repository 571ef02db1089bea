//! Distance-weighted synthetic traffic for the no-match fallback.
//!
//! When identifier reconciliation fails completely, the map would render
//! every station at the minimum radius. Instead, stations get expected
//! traffic proportional to their proximity to the metro-area centroid with
//! bounded randomness on top. The numbers are not reproducible; callers see
//! the `synthetic` flag and treat them as display-only.

use rand::Rng;
use tracing::warn;

use crate::stations::Station;
use crate::traffic::types::{StationTraffic, TrafficPattern, TrafficSnapshot};

/// Metro-area centroid the inverse-distance weighting is anchored to.
pub const CENTER_LATITUDE: f64 = 42.36027;
pub const CENTER_LONGITUDE: f64 = -71.09415;

/// Generates a synthetic snapshot over the station slice.
pub fn generate(stations: &[Station]) -> TrafficSnapshot {
    let mut rng = rand::rng();
    let mut per_station = Vec::with_capacity(stations.len());
    let mut max_total = 0u32;

    for station in stations {
        let lat_diff = (station.latitude - CENTER_LATITUDE).abs();
        let lon_diff = (station.longitude - CENTER_LONGITUDE).abs();
        let distance = (lat_diff * lat_diff + lon_diff * lon_diff).sqrt();

        // Central stations get more traffic.
        let distance_factor = 1.0 / (1.0 + distance * 500.0);
        let total = (rng.random::<f64>() * 300.0 * distance_factor * 3.0) as u32 + 5;

        let departure_share = 0.3 + rng.random::<f64>() * 0.4;
        let departures = (total as f64 * departure_share) as u32;

        max_total = max_total.max(total);
        per_station.push(StationTraffic {
            departures,
            arrivals: total - departures,
            total,
            flow_ratio: departure_share,
            pattern: TrafficPattern::classify(departure_share),
        });
    }

    warn!(
        stations = stations.len(),
        max_total, "synthetic traffic generated"
    );

    TrafficSnapshot {
        per_station,
        max_total,
        synthetic: true,
    }
}
