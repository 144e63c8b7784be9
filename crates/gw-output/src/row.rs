//! Plain data row types accumulated by the tabulator.

/// Finished-trip count for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TripCountRow {
    pub time_secs: i64,
    pub clock: String,
    /// Trips that reached their destination during this tick.
    pub finished: usize,
}

/// Drive occupancy of one vertex or segment at one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeCountRow {
    pub time_secs: i64,
    pub clock: String,
    pub node: String,
    pub drives: usize,
}

/// Per-location summary for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationCountRow {
    pub time_secs: i64,
    pub clock: String,
    pub location: String,
    pub residents: usize,
    /// Trips that finished here during this tick.
    pub finished_trips: usize,
    /// Mean duration of those trips in seconds; 0 when none finished.
    pub mean_trip_secs: f64,
}

/// Population/occupancy consistency check for one tick.
///
/// `error` = population − drives at vertices − drives at edges − residents
/// at locations.  Anything but zero means someone is lost or duplicated.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceRow {
    pub time_secs: i64,
    pub clock: String,
    pub population: usize,
    pub drives_at_vertices: usize,
    pub drives_at_edges: usize,
    pub residents_at_locations: usize,
    pub error: i64,
}
