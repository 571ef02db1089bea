//! Identifier reconciliation between trip records and station records.
//!
//! Station and trip sources have never agreed on an identifier scheme: the
//! same dock shows up as a primary id, a legacy numeric id, an external uuid,
//! or a short name, with or without zero padding. The index registers every
//! known variant so trips can resolve against any of them.

use std::collections::HashMap;

use tracing::debug;

use crate::stations::Station;

/// Mapping from normalized identifier string to station slot.
///
/// Many-to-one: several identifier variants may resolve to the same station.
/// Rebuilt whenever the station list changes; read-only during aggregation.
#[derive(Debug, Default)]
pub struct StationIndex {
    by_id: HashMap<String, usize>,
}

impl StationIndex {
    /// Builds the index over a station slice.
    ///
    /// Registers the primary and legacy identifiers (each additionally under
    /// a zero-stripped form, since trip and station sources disagree on
    /// padding), plus the external id and short name where present. Does not
    /// touch the station records themselves.
    pub fn build(stations: &[Station]) -> Self {
        let mut by_id = HashMap::new();

        for (slot, station) in stations.iter().enumerate() {
            register_padded(&mut by_id, &station.primary_id, slot);
            if let Some(legacy) = &station.legacy_id {
                register_padded(&mut by_id, legacy, slot);
            }
            if let Some(external) = &station.external_id {
                by_id.insert(external.clone(), slot);
            }
            if let Some(short) = &station.short_name {
                by_id.insert(short.clone(), slot);
            }
        }

        debug!(
            stations = stations.len(),
            entries = by_id.len(),
            "station index built"
        );

        StationIndex { by_id }
    }

    /// Resolves a raw trip identifier to a station slot.
    ///
    /// Resolution order: exact match, zero-stripped match, then integer
    /// re-rendering (`"007"` → `"7"`). Returns `None` for empty, unknown, or
    /// non-matching input; never panics.
    pub fn lookup(&self, raw_id: &str) -> Option<usize> {
        if raw_id.is_empty() {
            return None;
        }

        if let Some(&slot) = self.by_id.get(raw_id) {
            return Some(slot);
        }

        if let Some(&slot) = self.by_id.get(strip_leading_zeros(raw_id)) {
            return Some(slot);
        }

        if let Ok(numeric) = raw_id.trim().parse::<i64>() {
            if let Some(&slot) = self.by_id.get(numeric.to_string().as_str()) {
                return Some(slot);
            }
        }

        None
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Registers an identifier under both its exact and zero-stripped forms.
fn register_padded(by_id: &mut HashMap<String, usize>, id: &str, slot: usize) {
    by_id.insert(id.to_string(), slot);
    let stripped = strip_leading_zeros(id);
    if stripped != id {
        by_id.insert(stripped.to_string(), slot);
    }
}

fn strip_leading_zeros(id: &str) -> &str {
    let stripped = id.trim_start_matches('0');
    // An all-zero id still has to resolve to something.
    if stripped.is_empty() && !id.is_empty() {
        "0"
    } else {
        stripped
    }
}
