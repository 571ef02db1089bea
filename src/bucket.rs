//! Fixed-width time-of-day bucketing of trips.
//!
//! An optimization for windowed filtering: instead of scanning every trip on
//! each slider move, the aggregator can pull candidates from the buckets
//! overlapping the window. Aggregation results must be identical either way;
//! the exact ±60-minute inclusion test still runs on every candidate.

use std::collections::BTreeMap;

use tracing::debug;

use crate::timecodec::MINUTES_PER_DAY;
use crate::trips::Trip;

/// Default bucket width in minutes.
pub const DEFAULT_BUCKET_WIDTH: u32 = 15;

/// Trips partitioned into fixed-width time-of-day buckets.
///
/// Buckets hold indices into the trip slice they were built from, keyed by
/// bucket start minute. A trip appears in its start-minute bucket and, when
/// different, also in its end-minute bucket. Every multiple of the width in
/// `[0, 1440)` is pre-created, so range scans never need existence checks.
#[derive(Debug)]
pub struct BucketMap {
    width: u32,
    buckets: BTreeMap<u32, Vec<usize>>,
}

/// Partitions trips into buckets of the given width.
pub fn bucket(trips: &[Trip], width: u32) -> BucketMap {
    let mut buckets: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for start in (0..MINUTES_PER_DAY as u32).step_by(width as usize) {
        buckets.insert(start, Vec::new());
    }

    for (i, trip) in trips.iter().enumerate() {
        let start_bucket = (trip.start_minute() / width) * width;
        let end_bucket = (trip.end_minute() / width) * width;

        if let Some(entries) = buckets.get_mut(&start_bucket) {
            entries.push(i);
        }
        if end_bucket != start_bucket {
            if let Some(entries) = buckets.get_mut(&end_bucket) {
                entries.push(i);
            }
        }
    }

    debug!(trips = trips.len(), width, "trips bucketed");
    BucketMap { width, buckets }
}

impl BucketMap {
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Trip indices assigned to the bucket starting at `start`.
    pub fn entries(&self, start: u32) -> &[usize] {
        self.buckets.get(&start).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Deduplicated trip indices from all buckets overlapping
    /// `[center - radius, center + radius]` (linear clock distance, no
    /// midnight wrap). Candidates still need the exact window test.
    pub fn candidates_around(&self, center: u32, radius: u32) -> Vec<usize> {
        let lo = (center.saturating_sub(radius) / self.width) * self.width;
        let hi_minute = (center + radius).min(MINUTES_PER_DAY as u32 - 1);
        let hi = (hi_minute / self.width) * self.width;

        let mut candidates: Vec<usize> = self
            .buckets
            .range(lo..=hi)
            .flat_map(|(_, entries)| entries.iter().copied())
            .collect();

        // A trip sits in two buckets when start and end differ; drop doubles.
        candidates.sort_unstable();
        candidates.dedup();
        candidates
    }
}
