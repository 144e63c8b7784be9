//! Ongoing per-tick statistics collection.

use gw_network::NodeRef;
use gw_sim::City;

use crate::row::{BalanceRow, LocationCountRow, NodeCountRow, TripCountRow};
use crate::OutputResult;

/// Keeps ongoing counts for the standard statistics of a run.
///
/// Call [`record`](Self::record) once after every tick.  Recording drains
/// each location's recently-finished drives, so back-to-back records never
/// double-count a trip.
#[derive(Default)]
pub struct Tabulator {
    trip_counts: Vec<TripCountRow>,
    node_counts: Vec<NodeCountRow>,
    location_counts: Vec<LocationCountRow>,
    balances: Vec<BalanceRow>,
}

impl Tabulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the city's current occupancy and drain finished trips.
    pub fn record(&mut self, city: &mut City) -> OutputResult<()> {
        let time_secs = city.clock().now.0;
        let clock = city.clock().now.to_string();

        // ── Balance first: nothing has been drained yet ───────────────────
        let engine = city.engine();
        let population = city.roster().population();
        let drives_at_vertices = engine.drives_on_vertices();
        let drives_at_edges = engine.drives_on_edges();
        let residents_at_locations = engine.residents_at_locations();
        self.balances.push(BalanceRow {
            time_secs,
            clock: clock.clone(),
            population,
            drives_at_vertices,
            drives_at_edges,
            residents_at_locations,
            error: population as i64
                - drives_at_vertices as i64
                - drives_at_edges as i64
                - residents_at_locations as i64,
        });

        // ── Per-node occupancy ────────────────────────────────────────────
        let graph = city.graph();
        for v in graph.vertex_ids() {
            self.node_counts.push(NodeCountRow {
                time_secs,
                clock: clock.clone(),
                node: graph.key(v).to_string(),
                drives: city.engine().drives_at(NodeRef::Vertex(v)).len(),
            });
        }
        for e in graph.edge_ids() {
            let seg = graph.segment(e);
            self.node_counts.push(NodeCountRow {
                time_secs,
                clock: clock.clone(),
                node: format!("segment {} -> {}", graph.key(seg.source), graph.key(seg.target)),
                drives: city.engine().drives_at(NodeRef::Edge(e)).len(),
            });
        }

        // ── Per-location summaries, then drain ────────────────────────────
        let location_ids: Vec<_> = city.registry().iter().map(|l| l.id).collect();
        let mut total_finished = 0;
        for id in location_ids {
            let label = city
                .registry()
                .get(id)
                .map(|l| l.to_string())
                .unwrap_or_else(|| format!("location {}", id.0));
            let residents = city.occupants(id)?.len();
            let finished = city.dump_finished(id)?;
            total_finished += finished.len();

            let mut duration_sum = 0i64;
            for &drive in &finished {
                duration_sum += city.drives().get(drive)?.duration_secs().unwrap_or(0);
            }
            let mean_trip_secs = if finished.is_empty() {
                0.0
            } else {
                duration_sum as f64 / finished.len() as f64
            };

            self.location_counts.push(LocationCountRow {
                time_secs,
                clock: clock.clone(),
                location: label,
                residents,
                finished_trips: finished.len(),
                mean_trip_secs,
            });
        }

        self.trip_counts.push(TripCountRow { time_secs, clock, finished: total_finished });
        Ok(())
    }

    // ── Row access ────────────────────────────────────────────────────────

    pub fn trip_counts(&self) -> &[TripCountRow] {
        &self.trip_counts
    }

    pub fn node_counts(&self) -> &[NodeCountRow] {
        &self.node_counts
    }

    pub fn location_counts(&self) -> &[LocationCountRow] {
        &self.location_counts
    }

    pub fn balances(&self) -> &[BalanceRow] {
        &self.balances
    }

    /// `true` if any balance row recorded so far has a nonzero error.
    pub fn has_imbalance(&self) -> bool {
        self.balances.iter().any(|b| b.error != 0)
    }
}
