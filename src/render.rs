//! Marker synchronization against the external rendering surface.
//!
//! The map surface and the drawing layer are collaborators behind traits:
//! [`CoordinateProjector`] turns lon/lat into current screen coordinates and
//! [`GraphicsSink`] accepts keyed create/update/remove commands for circular
//! markers. [`RenderSync`] owns the diff between the aggregated station set
//! and what is currently displayed.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::diag::{self, Diagnostic};
use crate::scale::{self, RadiusScale};
use crate::stations::Station;
use crate::traffic::{StationTraffic, TrafficSnapshot};

pub const BASE_STROKE_WIDTH: f64 = 1.5;
pub const HOVER_STROKE_WIDTH: f64 = 3.0;
pub const BASE_OPACITY: f64 = 0.8;
pub const HOVER_OPACITY: f64 = 1.0;

/// Visual attributes of one circular station marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerAttrs {
    pub radius: f64,
    pub stroke_width: f64,
    pub opacity: f64,
    /// Quantized flow ratio driving the departure/arrival color blend.
    pub flow_style: f64,
    pub tooltip: String,
}

/// Projects geographic coordinates into the current viewport.
///
/// Returns `None` for input the surface cannot project; [`RenderSync`]
/// substitutes the `(0, 0)` sentinel.
pub trait CoordinateProjector {
    fn project(&self, longitude: f64, latitude: f64) -> Option<(f64, f64)>;
}

/// Drawing layer accepting keyed marker operations.
pub trait GraphicsSink {
    fn create_marker(&mut self, key: &str, attrs: &MarkerAttrs);
    fn update_marker(&mut self, key: &str, attrs: &MarkerAttrs);
    fn remove_marker(&mut self, key: &str);
    fn move_marker(&mut self, key: &str, x: f64, y: f64);
}

struct MarkerRecord {
    longitude: f64,
    latitude: f64,
    attrs: MarkerAttrs,
}

/// Keyed diff driver between aggregated stations and displayed markers.
#[derive(Default)]
pub struct RenderSync {
    markers: HashMap<String, MarkerRecord>,
}

impl RenderSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Synchronizes the displayed marker set with an aggregation snapshot.
    ///
    /// Enter: create the marker with hover wiring and tooltip. Update: push
    /// the new radius, flow style, and tooltip. Exit: remove markers whose
    /// station is gone. Afterwards every marker is repositioned, since screen
    /// position depends on the current viewport rather than station data.
    pub fn sync<F>(
        &mut self,
        stations: &[Station],
        snapshot: &TrafficSnapshot,
        radius_scale: &RadiusScale,
        id_selector: F,
        projector: &dyn CoordinateProjector,
        sink: &mut dyn GraphicsSink,
    ) where
        F: Fn(&Station) -> &str,
    {
        let mut seen: HashSet<String> = HashSet::with_capacity(stations.len());
        let mut created = 0usize;
        let mut updated = 0usize;

        for (station, traffic) in stations.iter().zip(&snapshot.per_station) {
            let key = id_selector(station).to_string();
            let attrs = MarkerAttrs {
                radius: radius_scale.radius(traffic.total),
                stroke_width: BASE_STROKE_WIDTH,
                opacity: BASE_OPACITY,
                flow_style: scale::flow_step(traffic.flow_ratio),
                tooltip: tooltip_text(station, traffic),
            };

            match self.markers.entry(key.clone()) {
                Entry::Occupied(mut entry) => {
                    let record = entry.get_mut();
                    if record.attrs != attrs {
                        sink.update_marker(&key, &attrs);
                    }
                    record.attrs = attrs;
                    record.longitude = station.longitude;
                    record.latitude = station.latitude;
                    updated += 1;
                }
                Entry::Vacant(entry) => {
                    sink.create_marker(&key, &attrs);
                    entry.insert(MarkerRecord {
                        longitude: station.longitude,
                        latitude: station.latitude,
                        attrs,
                    });
                    created += 1;
                }
            }
            seen.insert(key);
        }

        let stale: Vec<String> = self
            .markers
            .keys()
            .filter(|k| !seen.contains(*k))
            .cloned()
            .collect();
        for key in &stale {
            sink.remove_marker(key);
            self.markers.remove(key);
        }

        debug!(created, updated, removed = stale.len(), "marker sync complete");

        self.reposition_all(projector, sink);
    }

    /// Recomputes every marker's screen position from the projector.
    ///
    /// Called after each sync and whenever the external map signals a
    /// viewport change (pan, zoom, resize, move-end).
    pub fn reposition_all(
        &self,
        projector: &dyn CoordinateProjector,
        sink: &mut dyn GraphicsSink,
    ) {
        for (key, record) in &self.markers {
            let (x, y) = match projector.project(record.longitude, record.latitude) {
                Some(point) => point,
                None => {
                    diag::emit(&Diagnostic::ProjectionFailure);
                    (0.0, 0.0)
                }
            };
            sink.move_marker(key, x, y);
        }
    }

    /// Hover highlight: thicker stroke, full opacity.
    pub fn hover_enter(&mut self, key: &str, sink: &mut dyn GraphicsSink) {
        if let Some(record) = self.markers.get_mut(key) {
            record.attrs.stroke_width = HOVER_STROKE_WIDTH;
            record.attrs.opacity = HOVER_OPACITY;
            sink.update_marker(key, &record.attrs);
        }
    }

    /// Hover end: restore the resting stroke and opacity.
    pub fn hover_leave(&mut self, key: &str, sink: &mut dyn GraphicsSink) {
        if let Some(record) = self.markers.get_mut(key) {
            record.attrs.stroke_width = BASE_STROKE_WIDTH;
            record.attrs.opacity = BASE_OPACITY;
            sink.update_marker(key, &record.attrs);
        }
    }
}

fn tooltip_text(station: &Station, traffic: &StationTraffic) -> String {
    format!(
        "{} ({})\nTotal: {} trips\nDepartures: {} trips\nArrivals: {} trips",
        station.name,
        traffic.pattern.label(),
        traffic.total,
        traffic.departures,
        traffic.arrivals
    )
}

/// Sink that logs every marker operation; the CLI's stand-in drawing layer.
#[derive(Default)]
pub struct LoggingSink;

impl GraphicsSink for LoggingSink {
    fn create_marker(&mut self, key: &str, attrs: &MarkerAttrs) {
        debug!(key, radius = attrs.radius, flow = attrs.flow_style, "create marker");
    }

    fn update_marker(&mut self, key: &str, attrs: &MarkerAttrs) {
        debug!(key, radius = attrs.radius, flow = attrs.flow_style, "update marker");
    }

    fn remove_marker(&mut self, key: &str) {
        debug!(key, "remove marker");
    }

    fn move_marker(&mut self, key: &str, x: f64, y: f64) {
        debug!(key, x, y, "move marker");
    }
}

/// Projector for a plain equirectangular viewport; the CLI has no real map,
/// so it scales lon/lat into a fixed-size screen rectangle.
pub struct FixedViewport {
    pub width: f64,
    pub height: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
    pub min_latitude: f64,
    pub max_latitude: f64,
}

impl CoordinateProjector for FixedViewport {
    fn project(&self, longitude: f64, latitude: f64) -> Option<(f64, f64)> {
        if !longitude.is_finite() || !latitude.is_finite() {
            return None;
        }
        let lon_span = self.max_longitude - self.min_longitude;
        let lat_span = self.max_latitude - self.min_latitude;
        if lon_span <= 0.0 || lat_span <= 0.0 {
            return None;
        }

        let x = (longitude - self.min_longitude) / lon_span * self.width;
        // Screen y grows downward.
        let y = (self.max_latitude - latitude) / lat_span * self.height;
        Some((x, y))
    }
}
