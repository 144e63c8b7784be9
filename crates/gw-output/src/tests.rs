//! Unit tests for gw-output.

use gw_sim::{City, CityConfig};
use gw_trip::CommutePlanner;

use crate::{Tabulator, write_csv};

/// Column city with one commuter, as in the gw-sim scenarios.
fn commuter_city() -> City {
    let mut city = City::new(CityConfig::new(5, 5).with_seed(42)).unwrap();
    city.pave_many((0..5).map(|y| (2, y))).unwrap();
    city.add_entry_parcel(2, 2).unwrap();
    let home = city.make_location([(1, 4)], "home").unwrap();
    let work = city.make_location([(3, 0)], "work").unwrap();
    city.connect_location(home, 2, 4).unwrap();
    city.connect_location(work, 2, 0).unwrap();
    city.add_resident(home, Some(work), Box::new(CommutePlanner::new())).unwrap();
    city
}

fn run_one_day(city: &mut City, tabulator: &mut Tabulator) {
    for _ in 0..24 {
        city.advance_period().unwrap();
        tabulator.record(city).unwrap();
    }
}

#[test]
fn rows_accumulate_per_tick() {
    let mut city = commuter_city();
    let mut tab = Tabulator::new();
    run_one_day(&mut city, &mut tab);

    assert_eq!(tab.trip_counts().len(), 24);
    assert_eq!(tab.balances().len(), 24);
    // 5 vertices + 8 edges per tick.
    let nodes_per_tick = city.graph().vertex_count() + city.graph().edge_count();
    assert_eq!(tab.node_counts().len(), 24 * nodes_per_tick);
    // One row per location per tick.
    assert_eq!(tab.location_counts().len(), 24 * 2);
}

#[test]
fn balance_error_is_zero_across_a_full_day() {
    let mut city = commuter_city();
    let mut tab = Tabulator::new();
    run_one_day(&mut city, &mut tab);

    assert!(!tab.has_imbalance());
    for row in tab.balances() {
        assert_eq!(row.population, 1);
        assert_eq!(row.error, 0);
    }
}

#[test]
fn finished_trips_are_counted_exactly_once() {
    let mut city = commuter_city();
    let mut tab = Tabulator::new();
    run_one_day(&mut city, &mut tab);

    // The commuter's two legs both finished and were recorded once each.
    let total: usize = tab.trip_counts().iter().map(|r| r.finished).sum();
    assert_eq!(total, 2);

    // Draining means a second record sees nothing new.
    tab.record(&mut city).unwrap();
    assert_eq!(tab.trip_counts().last().unwrap().finished, 0);
}

#[test]
fn finished_trips_report_a_positive_mean_duration() {
    let mut city = commuter_city();
    let mut tab = Tabulator::new();
    run_one_day(&mut city, &mut tab);

    let with_trips: Vec<_> = tab
        .location_counts()
        .iter()
        .filter(|r| r.finished_trips > 0)
        .collect();
    assert_eq!(with_trips.len(), 2); // one arrival at work, one back home
    for row in with_trips {
        assert!(row.mean_trip_secs > 0.0, "mean duration missing in {row:?}");
    }
}

#[test]
fn csv_export_writes_all_four_files() {
    let mut city = commuter_city();
    let mut tab = Tabulator::new();
    run_one_day(&mut city, &mut tab);

    let dir = tempfile::tempdir().unwrap();
    write_csv(&tab, dir.path(), "-test").unwrap();

    for stem in ["finished_drives", "nodes", "locations", "balance"] {
        let path = dir.path().join(format!("{stem}-test.csv"));
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert!(lines.len() > 1, "{stem} has no data rows");
        assert!(lines[0].starts_with("time_secs,"), "{stem} missing header");
    }

    let balance = std::fs::read_to_string(dir.path().join("balance-test.csv")).unwrap();
    // 24 data rows, every error column zero.
    let rows: Vec<&str> = balance.lines().skip(1).collect();
    assert_eq!(rows.len(), 24);
    assert!(rows.iter().all(|r| r.ends_with(",0")));
}
