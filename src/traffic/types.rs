//! Data types used by the aggregation pipeline.

use serde::Serialize;

/// Half-width of the time filter window, in minutes. A trip is included if
/// its start or end minute lies within this distance of the filter center.
pub const WINDOW_RADIUS_MINUTES: i64 = 60;

/// Optional time-of-day window restricting which trips contribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFilter {
    AllDay,
    /// Center minute-of-day in `[0, 1440)`; the window spans ±60 minutes of
    /// linear clock distance. No midnight wrap: a center near 0 or 1439 does
    /// not match trips near the opposite boundary.
    Around(u32),
}

impl TimeFilter {
    /// Maps the UI slider value to a filter; `-1` means all day.
    pub fn from_slider(value: i32) -> Self {
        if value < 0 {
            TimeFilter::AllDay
        } else {
            TimeFilter::Around(value as u32)
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, TimeFilter::Around(_))
    }

    /// Whether a trip with these start/end minutes falls inside the window.
    /// The 60-minute boundary is inclusive.
    pub fn includes(&self, start_minute: u32, end_minute: u32) -> bool {
        match self {
            TimeFilter::AllDay => true,
            TimeFilter::Around(center) => {
                let c = *center as i64;
                (start_minute as i64 - c).abs() <= WINDOW_RADIUS_MINUTES
                    || (end_minute as i64 - c).abs() <= WINDOW_RADIUS_MINUTES
            }
        }
    }
}

/// Departure/arrival balance classification for a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrafficPattern {
    MostlyDepartures,
    MostlyArrivals,
    Balanced,
    NoTraffic,
}

impl TrafficPattern {
    /// Classifies a positive-traffic flow ratio.
    pub fn classify(flow_ratio: f64) -> Self {
        if flow_ratio > 0.7 {
            TrafficPattern::MostlyDepartures
        } else if flow_ratio < 0.3 {
            TrafficPattern::MostlyArrivals
        } else {
            TrafficPattern::Balanced
        }
    }

    /// Human-readable label used in tooltips.
    pub fn label(&self) -> &'static str {
        match self {
            TrafficPattern::MostlyDepartures => "mostly departures",
            TrafficPattern::MostlyArrivals => "mostly arrivals",
            TrafficPattern::Balanced => "balanced",
            TrafficPattern::NoTraffic => "no traffic",
        }
    }
}

/// Per-station derived statistics for one aggregation pass.
///
/// Produced fresh on every pass, keyed positionally to the station slice the
/// pass ran over; the aggregator is the sole producer.
#[derive(Debug, Clone, Serialize)]
pub struct StationTraffic {
    pub departures: u32,
    pub arrivals: u32,
    pub total: u32,
    pub flow_ratio: f64,
    pub pattern: TrafficPattern,
}

impl StationTraffic {
    /// The zero-traffic default: neutral flow, no-traffic pattern.
    pub fn no_traffic() -> Self {
        StationTraffic {
            departures: 0,
            arrivals: 0,
            total: 0,
            flow_ratio: 0.5,
            pattern: TrafficPattern::NoTraffic,
        }
    }

    /// Derives flow ratio and pattern from the accumulated counters.
    pub fn finalize(&mut self) {
        if self.total > 0 {
            self.flow_ratio = self.departures as f64 / self.total as f64;
            self.pattern = TrafficPattern::classify(self.flow_ratio);
        } else {
            self.flow_ratio = 0.5;
            self.pattern = TrafficPattern::NoTraffic;
        }
    }
}

/// The complete result of one aggregation pass.
#[derive(Debug, Clone, Serialize)]
pub struct TrafficSnapshot {
    /// One entry per station, same order as the input station slice.
    pub per_station: Vec<StationTraffic>,
    /// Highest total across all stations in this pass.
    pub max_total: u32,
    /// True when the identifier-match fallback generated these numbers;
    /// synthetic output is non-deterministic and not reproducible.
    pub synthetic: bool,
}

impl TrafficSnapshot {
    pub fn stations_with_traffic(&self) -> usize {
        self.per_station.iter().filter(|s| s.total > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_slider() {
        assert_eq!(TimeFilter::from_slider(-1), TimeFilter::AllDay);
        assert_eq!(TimeFilter::from_slider(500), TimeFilter::Around(500));
        assert!(!TimeFilter::AllDay.is_active());
        assert!(TimeFilter::Around(0).is_active());
    }

    #[test]
    fn test_window_boundary_inclusive_at_60() {
        let filter = TimeFilter::Around(500);
        // Start minute exactly 60 away: included.
        assert!(filter.includes(440, 445));
        // 62 away on both ends: excluded.
        assert!(!filter.includes(438, 430));
        // End minute qualifies even when start does not.
        assert!(filter.includes(300, 560));
    }

    #[test]
    fn test_window_does_not_wrap_midnight() {
        let filter = TimeFilter::Around(10);
        // 23:50 is 10 minutes before midnight but 1420 linear minutes away.
        assert!(!filter.includes(1430, 1435));
        assert!(filter.includes(0, 5));
    }

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(TrafficPattern::classify(0.71), TrafficPattern::MostlyDepartures);
        assert_eq!(TrafficPattern::classify(0.7), TrafficPattern::Balanced);
        assert_eq!(TrafficPattern::classify(0.3), TrafficPattern::Balanced);
        assert_eq!(TrafficPattern::classify(0.29), TrafficPattern::MostlyArrivals);
    }

    #[test]
    fn test_finalize_zero_traffic_defaults() {
        let mut t = StationTraffic::no_traffic();
        t.finalize();
        assert_eq!(t.flow_ratio, 0.5);
        assert_eq!(t.pattern, TrafficPattern::NoTraffic);
    }

    #[test]
    fn test_finalize_flow_ratio() {
        let mut t = StationTraffic::no_traffic();
        t.departures = 3;
        t.arrivals = 1;
        t.total = 4;
        t.finalize();
        assert_eq!(t.flow_ratio, 0.75);
        assert_eq!(t.pattern, TrafficPattern::MostlyDepartures);
    }
}
