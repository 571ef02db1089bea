//! Station records and the JSON station-source loader.
//!
//! Station feeds disagree on field names across exports: longitude alone has
//! shipped as `Long`, `lon`, `longitude`, `lng`, `x`, and `lon_`. Rather than
//! reflect over the document, each semantic field carries an ordered list of
//! accepted spellings tried in priority order; the first well-typed hit wins.

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Accepted spellings for the longitude field, in priority order.
const LONGITUDE_FIELDS: &[&str] = &["Long", "lon", "longitude", "lng", "x", "lon_"];

/// Accepted spellings for the latitude field, in priority order.
const LATITUDE_FIELDS: &[&str] = &["Lat", "lat", "latitude", "y", "lat_"];

/// Accepted spellings for the primary identifier, in priority order.
const PRIMARY_ID_FIELDS: &[&str] = &["station_id", "id"];

/// Accepted spellings for the display name, in priority order.
const NAME_FIELDS: &[&str] = &["name", "station_name", "Name"];

/// A fixed dock location with one or more historically-assigned identifiers.
///
/// Identity data only; per-pass traffic statistics live in
/// [`crate::traffic::StationTraffic`], produced fresh on every aggregation.
#[derive(Debug, Clone, Serialize)]
pub struct Station {
    pub primary_id: String,
    pub legacy_id: Option<String>,
    pub external_id: Option<String>,
    pub short_name: Option<String>,
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// Parses a station source document from raw JSON bytes.
///
/// # Errors
///
/// Returns an error only if the bytes are not valid JSON at all; individual
/// records that cannot be used are skipped with a warning.
pub fn from_json_bytes(bytes: &[u8]) -> Result<Vec<Station>> {
    let doc: Value = serde_json::from_slice(bytes)?;
    Ok(parse_document(&doc))
}

/// Extracts stations from a parsed document.
///
/// Accepts either a bare array of records or the GBFS-style
/// `{"data": {"stations": [...]}}` wrapper. An unrecognized shape yields an
/// empty list, not an error.
pub fn parse_document(doc: &Value) -> Vec<Station> {
    let records = if let Some(arr) = doc["data"]["stations"].as_array() {
        arr
    } else if let Some(arr) = doc.as_array() {
        arr
    } else {
        warn!("station document has no recognizable stations array");
        return Vec::new();
    };

    let stations: Vec<Station> = records.iter().filter_map(parse_record).collect();

    debug!(
        total = records.len(),
        usable = stations.len(),
        "station document parsed"
    );

    stations
}

fn parse_record(record: &Value) -> Option<Station> {
    let primary_id = string_field(record, PRIMARY_ID_FIELDS)?;

    let longitude = number_field(record, LONGITUDE_FIELDS);
    let latitude = number_field(record, LATITUDE_FIELDS);
    let (longitude, latitude) = match (longitude, latitude) {
        (Some(lon), Some(lat)) => (lon, lat),
        _ => {
            warn!(station_id = %primary_id, "station has no usable coordinates, skipping");
            return None;
        }
    };

    let name = string_field(record, NAME_FIELDS)
        .unwrap_or_else(|| format!("Station {}", primary_id));

    Some(Station {
        legacy_id: string_field(record, &["legacy_id"]),
        external_id: string_field(record, &["external_id"]),
        short_name: string_field(record, &["short_name"]),
        primary_id,
        name,
        longitude,
        latitude,
    })
}

/// Returns the first candidate field holding a number or a numeric string.
fn number_field(record: &Value, candidates: &[&str]) -> Option<f64> {
    for key in candidates {
        match &record[*key] {
            Value::Number(n) => {
                if let Some(v) = n.as_f64() {
                    return Some(v);
                }
            }
            Value::String(s) => {
                if let Ok(v) = s.trim().parse::<f64>() {
                    return Some(v);
                }
            }
            _ => {}
        }
    }
    None
}

/// Returns the first candidate field holding a string or a number, as a string.
fn string_field(record: &Value, candidates: &[&str]) -> Option<String> {
    for key in candidates {
        match &record[*key] {
            Value::String(s) if !s.is_empty() => return Some(s.clone()),
            Value::Number(n) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_bare_array() {
        let doc = json!([
            {"station_id": "1", "name": "Central Sq", "lat": 42.36, "lon": -71.09}
        ]);
        let stations = parse_document(&doc);
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].primary_id, "1");
        assert_eq!(stations[0].name, "Central Sq");
        assert_eq!(stations[0].latitude, 42.36);
        assert_eq!(stations[0].longitude, -71.09);
    }

    #[test]
    fn test_parse_nested_wrapper() {
        let doc = json!({"data": {"stations": [
            {"station_id": "7", "name": "Kendall", "Lat": 42.37, "Long": -71.10}
        ]}});
        let stations = parse_document(&doc);
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].primary_id, "7");
    }

    #[test]
    fn test_coordinate_spelling_priority() {
        // "Long" outranks "lon" when both are present.
        let doc = json!([
            {"station_id": "1", "Long": -71.05, "lon": -99.0, "Lat": 42.0}
        ]);
        let stations = parse_document(&doc);
        assert_eq!(stations[0].longitude, -71.05);
    }

    #[test]
    fn test_numeric_string_coordinates_accepted() {
        let doc = json!([
            {"station_id": "1", "lat": "42.36", "lon": "-71.09"}
        ]);
        let stations = parse_document(&doc);
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].latitude, 42.36);
    }

    #[test]
    fn test_station_without_coordinates_is_skipped() {
        let doc = json!([
            {"station_id": "1", "lat": 42.36, "lon": -71.09},
            {"station_id": "2", "name": "no coords"}
        ]);
        let stations = parse_document(&doc);
        assert_eq!(stations.len(), 1);
    }

    #[test]
    fn test_numeric_primary_id_coerced_to_string() {
        let doc = json!([
            {"station_id": 42, "lat": 42.36, "lon": -71.09}
        ]);
        let stations = parse_document(&doc);
        assert_eq!(stations[0].primary_id, "42");
    }

    #[test]
    fn test_identifier_variants_captured() {
        let doc = json!([
            {"station_id": "A32000", "legacy_id": "67", "external_id": "e-67",
             "short_name": "M32006", "lat": 42.36, "lon": -71.09}
        ]);
        let stations = parse_document(&doc);
        let s = &stations[0];
        assert_eq!(s.legacy_id.as_deref(), Some("67"));
        assert_eq!(s.external_id.as_deref(), Some("e-67"));
        assert_eq!(s.short_name.as_deref(), Some("M32006"));
    }

    #[test]
    fn test_unrecognized_shape_yields_empty() {
        let doc = json!({"stations": "nope"});
        assert!(parse_document(&doc).is_empty());
    }

    #[test]
    fn test_missing_name_gets_placeholder() {
        let doc = json!([
            {"station_id": "9", "lat": 42.0, "lon": -71.0}
        ]);
        let stations = parse_document(&doc);
        assert_eq!(stations[0].name, "Station 9");
    }

    #[test]
    fn test_from_json_bytes_rejects_invalid_json() {
        assert!(from_json_bytes(b"not json").is_err());
    }
}
