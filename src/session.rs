//! The session context owning all mutable visualization state.
//!
//! One [`Session`] per map page: stations, trips, the bucket map, the radius
//! scale, and the marker sync state all live here and are passed into each
//! component call. The bucket map is rebuilt when trips reload, not on every
//! filter change.

use tracing::info;

use crate::bucket::{self, BucketMap, DEFAULT_BUCKET_WIDTH};
use crate::render::{CoordinateProjector, GraphicsSink, RenderSync};
use crate::scale::RadiusScale;
use crate::stations::Station;
use crate::timecodec;
use crate::traffic::{self, TimeFilter, TrafficSnapshot};
use crate::trips::Trip;

pub struct Session {
    stations: Vec<Station>,
    trips: Vec<Trip>,
    buckets: Option<BucketMap>,
    radius_scale: RadiusScale,
    render: RenderSync,
    applied_filter: Option<TimeFilter>,
    last_snapshot: Option<TrafficSnapshot>,
}

impl Session {
    pub fn new() -> Self {
        Session {
            stations: Vec::new(),
            trips: Vec::new(),
            buckets: None,
            radius_scale: RadiusScale::new(),
            render: RenderSync::new(),
            applied_filter: None,
            last_snapshot: None,
        }
    }

    /// Replaces the station list. Derived marker state refreshes on the next
    /// filter application.
    pub fn load_stations(&mut self, stations: Vec<Station>) {
        info!(count = stations.len(), "stations loaded");
        self.stations = stations;
        self.applied_filter = None;
    }

    /// Replaces the trip list and rebuilds the time-of-day bucket map.
    pub fn load_trips(&mut self, trips: Vec<Trip>) {
        info!(count = trips.len(), "trips loaded");
        self.buckets = Some(bucket::bucket(&trips, DEFAULT_BUCKET_WIDTH));
        self.trips = trips;
        self.applied_filter = None;
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn last_snapshot(&self) -> Option<&TrafficSnapshot> {
        self.last_snapshot.as_ref()
    }

    /// Applies a slider value (−1 = all day): aggregates under the filter,
    /// retunes the radius scale, and syncs the marker set.
    ///
    /// Returns `None` without re-aggregating when the filter is unchanged.
    pub fn apply_slider(
        &mut self,
        slider_value: i32,
        projector: &dyn CoordinateProjector,
        sink: &mut dyn GraphicsSink,
    ) -> Option<TrafficSnapshot> {
        let filter = TimeFilter::from_slider(slider_value);
        if self.applied_filter == Some(filter) {
            return None;
        }

        let snapshot = match &self.buckets {
            Some(buckets) => {
                traffic::aggregate_bucketed(&self.stations, &self.trips, buckets, filter)
            }
            None => traffic::aggregate(&self.stations, &self.trips, filter),
        };

        self.radius_scale.set_domain(snapshot.max_total);
        self.radius_scale.set_filtered(filter.is_active());

        self.render.sync(
            &self.stations,
            &snapshot,
            &self.radius_scale,
            |s| s.primary_id.as_str(),
            projector,
            sink,
        );

        info!(
            filter = %filter_label(filter),
            with_traffic = snapshot.stations_with_traffic(),
            synthetic = snapshot.synthetic,
            "filter applied"
        );

        self.applied_filter = Some(filter);
        self.last_snapshot = Some(snapshot.clone());
        Some(snapshot)
    }

    /// Label for the active filter window, e.g. `around 8:10 AM` or `all day`.
    pub fn filter_label(&self) -> String {
        filter_label(self.applied_filter.unwrap_or(TimeFilter::AllDay))
    }

    /// Viewport change notification (pan, zoom, resize, move-end): marker
    /// data is untouched, only positions are recomputed.
    pub fn viewport_changed(
        &self,
        projector: &dyn CoordinateProjector,
        sink: &mut dyn GraphicsSink,
    ) {
        self.render.reposition_all(projector, sink);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

fn filter_label(filter: TimeFilter) -> String {
    match filter {
        TimeFilter::AllDay => "all day".to_string(),
        TimeFilter::Around(center) => {
            format!("around {}", timecodec::format_minutes(center as i64))
        }
    }
}

/// Supersede-pending-request debouncing for slider input.
///
/// Submitting a new value replaces any pending one; only the latest value is
/// ever handed out. The quiet-interval timing lives with the caller, since
/// aggregation itself is synchronous and non-preemptible.
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Option<i32>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a filter request, superseding any pending one.
    pub fn submit(&mut self, slider_value: i32) {
        self.pending = Some(slider_value);
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the latest pending request, if any. Each request is handed out
    /// at most once.
    pub fn settle(&mut self) -> Option<i32> {
        self.pending.take()
    }
}
