use bike_traffic_map::bucket::{self, DEFAULT_BUCKET_WIDTH};
use bike_traffic_map::render::{FixedViewport, LoggingSink};
use bike_traffic_map::session::Session;
use bike_traffic_map::stations;
use bike_traffic_map::traffic::{self, TimeFilter, TrafficPattern};
use bike_traffic_map::trips;

fn load_fixture_stations() -> Vec<stations::Station> {
    stations::from_json_bytes(include_bytes!("fixtures/stations.json"))
        .expect("fixture stations should parse")
}

fn load_fixture_trips() -> Vec<trips::Trip> {
    trips::from_csv_bytes(include_bytes!("fixtures/trips.csv"))
}

fn viewport() -> FixedViewport {
    FixedViewport {
        width: 1280.0,
        height: 960.0,
        min_longitude: -71.2,
        max_longitude: -70.9,
        min_latitude: 42.27,
        max_latitude: 42.45,
    }
}

#[test]
fn test_fixture_loading() {
    let stations = load_fixture_stations();
    // The fourth record has no coordinates and is skipped.
    assert_eq!(stations.len(), 3);
    assert_eq!(stations[0].primary_id, "A32000");
    assert_eq!(stations[1].latitude, 42.3656);

    let trips = load_fixture_trips();
    // Seven data rows, one short row skipped.
    assert_eq!(trips.len(), 6);
}

#[test]
fn test_all_day_aggregation_over_fixtures() {
    let stations = load_fixture_stations();
    let trips = load_fixture_trips();

    let snap = traffic::aggregate(&stations, &trips, TimeFilter::AllDay);
    assert!(!snap.synthetic);

    // Station A32000 is reached as "67" (zero-stripped legacy), "M32006"
    // (short name), and "A32000" (primary).
    let mit = &snap.per_station[0];
    assert_eq!(mit.departures, 3);
    assert_eq!(mit.arrivals, 2);
    assert_eq!(mit.total, 5);

    let central = &snap.per_station[1];
    assert_eq!(central.departures, 0);
    assert_eq!(central.arrivals, 1);
    assert_eq!(central.pattern, TrafficPattern::MostlyArrivals);

    let kendall = &snap.per_station[2];
    assert_eq!(kendall.departures, 2);
    assert_eq!(kendall.arrivals, 2);
    assert_eq!(kendall.flow_ratio, 0.5);
    assert_eq!(kendall.pattern, TrafficPattern::Balanced);

    for t in &snap.per_station {
        assert_eq!(t.departures + t.arrivals, t.total);
    }
    assert_eq!(snap.max_total, 5);
}

#[test]
fn test_filtered_aggregation_window_boundary() {
    let stations = load_fixture_stations();
    let trips = load_fixture_trips();

    // Center 8:20 AM. Trip r6 starts at 7:20, exactly 60 minutes out:
    // included. Trip r7 (6:00-6:30) and r3 (5 PM) are out of the window.
    let snap = traffic::aggregate(&stations, &trips, TimeFilter::Around(500));
    let mit = &snap.per_station[0];
    assert_eq!(mit.departures, 3);
    assert_eq!(mit.arrivals, 1);

    let kendall = &snap.per_station[2];
    assert_eq!(kendall.departures, 0);
    assert_eq!(kendall.arrivals, 1);
}

#[test]
fn test_bucketed_equivalence_over_fixtures() {
    let stations = load_fixture_stations();
    let trips = load_fixture_trips();
    let buckets = bucket::bucket(&trips, DEFAULT_BUCKET_WIDTH);

    for slider in [-1i32, 0, 440, 500, 1020, 1439] {
        let filter = TimeFilter::from_slider(slider);
        let linear = traffic::aggregate(&stations, &trips, filter);
        let bucketed = traffic::aggregate_bucketed(&stations, &trips, &buckets, filter);

        assert_eq!(linear.synthetic, bucketed.synthetic, "slider {}", slider);
        for (a, b) in linear.per_station.iter().zip(&bucketed.per_station) {
            assert_eq!(a.departures, b.departures, "slider {}", slider);
            assert_eq!(a.arrivals, b.arrivals, "slider {}", slider);
        }
    }
}

#[test]
fn test_full_session_pipeline() {
    let mut session = Session::new();
    session.load_stations(load_fixture_stations());
    session.load_trips(load_fixture_trips());

    let projector = viewport();
    let mut sink = LoggingSink;

    let all_day = session
        .apply_slider(-1, &projector, &mut sink)
        .expect("first pass aggregates");
    assert_eq!(session.filter_label(), "all day");
    assert_eq!(all_day.stations_with_traffic(), 3);

    let filtered = session
        .apply_slider(500, &projector, &mut sink)
        .expect("filter change aggregates");
    assert_eq!(session.filter_label(), "around 8:20 AM");
    assert!(filtered.stations_with_traffic() <= all_day.stations_with_traffic());

    // Same slider value again: superseded by the no-change check.
    assert!(session.apply_slider(500, &projector, &mut sink).is_none());

    // Viewport notifications never disturb aggregation state.
    session.viewport_changed(&projector, &mut sink);
    assert!(session.last_snapshot().is_some());
}

#[test]
fn test_synthetic_fallback_when_sources_disagree() {
    let stations = load_fixture_stations();
    // Trip table referencing a completely different identifier universe.
    let csv = "start_station_id,end_station_id,started_at,ended_at\n\
               dock-9001,dock-9002,3/20/2024 8:00:00 AM,3/20/2024 8:10:00 AM\n\
               dock-9002,dock-9003,3/20/2024 9:00:00 AM,3/20/2024 9:10:00 AM\n";
    let trips = trips::from_csv_bytes(csv.as_bytes());

    let snap = traffic::aggregate(&stations, &trips, TimeFilter::AllDay);
    assert!(snap.synthetic);
    assert_eq!(snap.stations_with_traffic(), stations.len());
    for t in &snap.per_station {
        assert_eq!(t.departures + t.arrivals, t.total);
        assert!(t.total >= 5);
        assert!(t.flow_ratio >= 0.3 && t.flow_ratio <= 0.7);
    }
}

#[test]
fn test_missing_column_degrades_to_empty_pipeline() {
    let mut session = Session::new();
    session.load_stations(load_fixture_stations());
    // No ended_at column: the loader yields an empty trip set.
    let csv = "start_station_id,end_station_id,started_at\n1,2,3/20/2024 8:00:00 AM\n";
    session.load_trips(trips::from_csv_bytes(csv.as_bytes()));

    let mut sink = LoggingSink;
    let snap = session
        .apply_slider(-1, &viewport(), &mut sink)
        .expect("pass still runs");
    // No trips means no traffic and no fallback.
    assert!(!snap.synthetic);
    assert_eq!(snap.stations_with_traffic(), 0);
    for t in &snap.per_station {
        assert_eq!(t.flow_ratio, 0.5);
        assert_eq!(t.pattern, TrafficPattern::NoTraffic);
    }
}
