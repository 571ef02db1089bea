//! The central aggregation pass: trips in, per-station traffic out.
//!
//! Select candidate trips under the filter, count departures and arrivals
//! through the station index, then derive flow ratios and patterns. Malformed
//! or unmatched records contribute nothing; they never abort the pass.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::bucket::BucketMap;
use crate::diag::{self, Diagnostic};
use crate::index::StationIndex;
use crate::stations::Station;
use crate::traffic::synthetic;
use crate::traffic::types::{StationTraffic, TimeFilter, TrafficSnapshot, WINDOW_RADIUS_MINUTES};
use crate::trips::Trip;

/// Aggregates per-station traffic over the full trip list.
///
/// Every aggregation pass recomputes all derived statistics from scratch;
/// given the same inputs the result is identical (except on the synthetic
/// fallback path, which is random by design).
pub fn aggregate(stations: &[Station], trips: &[Trip], filter: TimeFilter) -> TrafficSnapshot {
    let candidates: Vec<usize> = (0..trips.len())
        .filter(|&i| filter.includes(trips[i].start_minute(), trips[i].end_minute()))
        .collect();

    count_candidates(stations, trips, &candidates, filter)
}

/// Same aggregation, but pulling candidates from a pre-built bucket map.
///
/// Produces results identical to [`aggregate`]: buckets only narrow the scan,
/// the exact window test still runs on every candidate.
pub fn aggregate_bucketed(
    stations: &[Station],
    trips: &[Trip],
    buckets: &BucketMap,
    filter: TimeFilter,
) -> TrafficSnapshot {
    let candidates: Vec<usize> = match filter {
        TimeFilter::AllDay => (0..trips.len()).collect(),
        TimeFilter::Around(center) => buckets
            .candidates_around(center, WINDOW_RADIUS_MINUTES as u32)
            .into_iter()
            .filter(|&i| filter.includes(trips[i].start_minute(), trips[i].end_minute()))
            .collect(),
    };

    count_candidates(stations, trips, &candidates, filter)
}

fn count_candidates(
    stations: &[Station],
    trips: &[Trip],
    candidates: &[usize],
    filter: TimeFilter,
) -> TrafficSnapshot {
    let index = StationIndex::build(stations);

    let mut per_station = vec![StationTraffic::no_traffic(); stations.len()];
    let mut start_matches = 0usize;
    let mut end_matches = 0usize;
    let mut unresolved: HashSet<String> = HashSet::new();

    for &i in candidates {
        let trip = &trips[i];

        match index.lookup(&trip.start_station_id) {
            Some(slot) => {
                per_station[slot].departures += 1;
                per_station[slot].total += 1;
                start_matches += 1;
            }
            None => report_unresolved(&mut unresolved, &trip.start_station_id),
        }

        match index.lookup(&trip.end_station_id) {
            Some(slot) => {
                per_station[slot].arrivals += 1;
                per_station[slot].total += 1;
                end_matches += 1;
            }
            None => report_unresolved(&mut unresolved, &trip.end_station_id),
        }
    }

    for traffic in &mut per_station {
        traffic.finalize();
    }

    let with_traffic = per_station.iter().filter(|t| t.total > 0).count();
    let max_total = per_station.iter().map(|t| t.total).max().unwrap_or(0);

    debug!(
        candidates = candidates.len(),
        start_matches,
        end_matches,
        with_traffic,
        max_total,
        filter = ?filter,
        "aggregation pass complete"
    );

    // Identifier schemes between sources are unreliable; if nothing matched
    // at all, synthesize proximity-weighted traffic so the map is never
    // fully blank. The snapshot's flag keeps the paths distinguishable.
    if with_traffic == 0 && !stations.is_empty() && !trips.is_empty() {
        diag::emit(&Diagnostic::NoIdentifierMatches);
        return synthetic::generate(stations);
    }

    info!(with_traffic, max_total, "station traffic computed");

    TrafficSnapshot {
        per_station,
        max_total,
        synthetic: false,
    }
}

fn report_unresolved(seen: &mut HashSet<String>, raw_id: &str) {
    if !raw_id.is_empty() && seen.insert(raw_id.to_string()) {
        // One warning per distinct identifier per pass.
        diag::emit(&Diagnostic::UnresolvedIdentifier(raw_id.to_string()));
    }
}
