//! CSV export backend.
//!
//! Writes four files into the given directory, one per row stream:
//! `finished_drives<label>.csv`, `nodes<label>.csv`, `locations<label>.csv`,
//! and `balance<label>.csv`.

use std::path::Path;

use csv::Writer;

use crate::{OutputResult, Tabulator};

/// Write everything the tabulator collected to `dir`.
///
/// `label` is appended to each file stem so several runs can share a
/// directory (e.g. `balance-run3.csv` for label `-run3`).
pub fn write_csv(tabulator: &Tabulator, dir: &Path, label: &str) -> OutputResult<()> {
    let mut finished = Writer::from_path(dir.join(format!("finished_drives{label}.csv")))?;
    finished.write_record(["time_secs", "clock", "finished"])?;
    for row in tabulator.trip_counts() {
        finished.write_record(&[
            row.time_secs.to_string(),
            row.clock.clone(),
            row.finished.to_string(),
        ])?;
    }
    finished.flush()?;

    let mut nodes = Writer::from_path(dir.join(format!("nodes{label}.csv")))?;
    nodes.write_record(["time_secs", "clock", "node", "drives"])?;
    for row in tabulator.node_counts() {
        nodes.write_record(&[
            row.time_secs.to_string(),
            row.clock.clone(),
            row.node.clone(),
            row.drives.to_string(),
        ])?;
    }
    nodes.flush()?;

    let mut locations = Writer::from_path(dir.join(format!("locations{label}.csv")))?;
    locations.write_record([
        "time_secs",
        "clock",
        "location",
        "residents",
        "finished_trips",
        "mean_trip_secs",
    ])?;
    for row in tabulator.location_counts() {
        locations.write_record(&[
            row.time_secs.to_string(),
            row.clock.clone(),
            row.location.clone(),
            row.residents.to_string(),
            row.finished_trips.to_string(),
            format!("{:.1}", row.mean_trip_secs),
        ])?;
    }
    locations.flush()?;

    let mut balance = Writer::from_path(dir.join(format!("balance{label}.csv")))?;
    balance.write_record([
        "time_secs",
        "clock",
        "population",
        "drives_at_vertices",
        "drives_at_edges",
        "residents_at_locations",
        "error",
    ])?;
    for row in tabulator.balances() {
        balance.write_record(&[
            row.time_secs.to_string(),
            row.clock.clone(),
            row.population.to_string(),
            row.drives_at_vertices.to_string(),
            row.drives_at_edges.to_string(),
            row.residents_at_locations.to_string(),
            row.error.to_string(),
        ])?;
    }
    balance.flush()?;

    Ok(())
}
