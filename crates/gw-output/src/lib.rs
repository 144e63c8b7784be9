//! `gw-output` — statistics tabulation and CSV export.
//!
//! A [`Tabulator`] is fed the city once per tick and accumulates four row
//! streams:
//!
//! | Rows                 | Contents                                         |
//! |----------------------|--------------------------------------------------|
//! | [`TripCountRow`]     | Finished trips per tick                          |
//! | [`NodeCountRow`]     | Per-vertex and per-segment drive occupancy       |
//! | [`LocationCountRow`] | Per-location residents, finished trips, mean duration |
//! | [`BalanceRow`]       | Population vs. everyone accounted for somewhere  |
//!
//! The balance row's `error` column should always be zero: every resident is
//! either at a location or represented by a drive on exactly one node.  A
//! nonzero value is a defect signal in the data, not a runtime error.
//!
//! Recording drains each location's recently-finished set, so every finished
//! trip is counted exactly once.  [`write_csv`] exports all four streams as
//! one CSV file each.

pub mod csv_export;
pub mod row;
pub mod tabulator;

mod error;

#[cfg(test)]
mod tests;

pub use csv_export::write_csv;
pub use error::{OutputError, OutputResult};
pub use row::{BalanceRow, LocationCountRow, NodeCountRow, TripCountRow};
pub use tabulator::Tabulator;
