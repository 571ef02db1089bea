//! Trip records and the CSV trip-source loader.
//!
//! The trip table is a text table with a header row. Station identifiers in
//! it are opaque strings that do not necessarily share a schema with the
//! station source; matching happens later in [`crate::index`].

use chrono::NaiveDateTime;
use csv::ReaderBuilder;
use tracing::{debug, warn};

use crate::diag::{self, Diagnostic};
use crate::timecodec;

const START_STATION_COLUMN: &str = "start_station_id";
const END_STATION_COLUMN: &str = "end_station_id";
const STARTED_AT_COLUMN: &str = "started_at";
const ENDED_AT_COLUMN: &str = "ended_at";

/// A single rental event.
#[derive(Debug, Clone)]
pub struct Trip {
    pub start_station_id: String,
    pub end_station_id: String,
    pub started_at: NaiveDateTime,
    pub ended_at: NaiveDateTime,
}

impl Trip {
    /// Minute-of-day the trip started.
    pub fn start_minute(&self) -> u32 {
        timecodec::minutes_since_midnight(Some(self.started_at))
    }

    /// Minute-of-day the trip ended.
    pub fn end_minute(&self) -> u32 {
        timecodec::minutes_since_midnight(Some(self.ended_at))
    }
}

/// Parses the trip table from raw CSV bytes.
///
/// A missing required column aborts loading and yields an empty trip set
/// with a [`Diagnostic::MissingRequiredColumn`] warning; rows shorter than
/// required are skipped individually. This loader never fails the caller.
pub fn from_csv_bytes(bytes: &[u8]) -> Vec<Trip> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(bytes);

    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(e) => {
            warn!(error = %e, "trip table has no readable header row");
            return Vec::new();
        }
    };

    let required = [
        START_STATION_COLUMN,
        END_STATION_COLUMN,
        STARTED_AT_COLUMN,
        ENDED_AT_COLUMN,
    ];

    let mut indices = [0usize; 4];
    for (slot, column) in indices.iter_mut().zip(required) {
        match headers.iter().position(|h| h == column) {
            Some(i) => *slot = i,
            None => {
                diag::emit(&Diagnostic::MissingRequiredColumn(column));
                return Vec::new();
            }
        }
    }
    let [start_id_idx, end_id_idx, started_idx, ended_idx] = indices;

    let mut trips = Vec::new();
    let mut skipped = 0usize;

    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(line = line + 2, error = %e, "skipping unreadable trip row");
                skipped += 1;
                continue;
            }
        };

        let fields = (
            record.get(start_id_idx),
            record.get(end_id_idx),
            record.get(started_idx),
            record.get(ended_idx),
        );
        let (Some(start_id), Some(end_id), Some(started), Some(ended)) = fields else {
            warn!(line = line + 2, "skipping short trip row");
            skipped += 1;
            continue;
        };

        trips.push(Trip {
            start_station_id: start_id.trim().to_string(),
            end_station_id: end_id.trim().to_string(),
            started_at: timecodec::parse(started),
            ended_at: timecodec::parse(ended),
        });
    }

    debug!(trips = trips.len(), skipped, "trip table parsed");
    trips
}
