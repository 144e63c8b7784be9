//! The two cooperating scheduler managers.
//!
//! [`ResidentManager`] owns the planning policies and the set of upcoming
//! drives: it collects plans each tick and decides which become real trips
//! (release) and which are abandoned.  [`TrafficManager`] owns nothing: it
//! turns released trips on and drives the randomized flow sweep.

use gw_core::{DriveId, SimRng, Timestamp};
use gw_network::RoadGraph;
use gw_traffic::{Disposition, DriveStore, FlowCtx, ResidentRoster, TrafficEngine, TrafficResult};
use gw_trip::{PlanCtx, TripPlanner};

use crate::SimResult;

// ── ResidentManager ───────────────────────────────────────────────────────────

/// Outcome of one release phase.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReleaseOutcome {
    /// Drives marked `Begun` this tick, in attempted-start order.
    pub released: Vec<DriveId>,
    /// Drives marked `Dropped` this tick.
    pub dropped: usize,
    /// Due drives left for re-evaluation on a later tick.
    pub deferred: usize,
}

/// Collects planned trips and decides when each starts or is abandoned.
#[derive(Default)]
pub struct ResidentManager {
    planners: Vec<Box<dyn TripPlanner>>,
    upcoming: Vec<DriveId>,
}

impl ResidentManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the policy of the most recently created resident.  Planners
    /// are indexed by `ResidentId`, so registration order must match the
    /// roster's creation order.
    pub fn add_planner(&mut self, planner: Box<dyn TripPlanner>) {
        self.planners.push(planner);
    }

    /// Drives planned but neither released nor dropped yet.
    pub fn upcoming(&self) -> &[DriveId] {
        &self.upcoming
    }

    /// Planning phase: invoke every resident's policy for the window
    /// `[now, window_end)` and collect the returned plans, unvalidated.
    ///
    /// Returns how many drives were planned this tick.
    pub fn plan(
        &mut self,
        roster: &ResidentRoster,
        graph: &RoadGraph,
        now: Timestamp,
        window_end: Timestamp,
        drives: &mut DriveStore,
        rng: &mut SimRng,
    ) -> usize {
        let ctx = PlanCtx { now, graph, window_start: now, window_end };
        let mut planned = 0;
        for resident in roster.iter() {
            let plans = self.planners[resident.id.index()].plan_trips(resident, &ctx, rng);
            for plan in plans {
                let id = drives.insert(plan, resident.id, graph.generation);
                self.upcoming.push(id);
                planned += 1;
            }
        }
        planned
    }

    /// Release phase: scan upcoming drives in attempted-start order and stop
    /// at the first one not yet due.
    ///
    /// A due drive whose resident stands at its declared origin (and whose
    /// route is for the current graph) begins.  A due drive whose resident is
    /// elsewhere is a scheduling miss: dropped once its deadline has passed,
    /// deferred otherwise — a drive never silently vanishes before its
    /// deadline.
    pub fn release(
        &mut self,
        roster: &ResidentRoster,
        graph: &RoadGraph,
        now: Timestamp,
        drives: &mut DriveStore,
    ) -> SimResult<ReleaseOutcome> {
        let mut keyed: Vec<(Timestamp, DriveId)> = Vec::with_capacity(self.upcoming.len());
        for &id in &self.upcoming {
            keyed.push((drives.get(id)?.attempt_start, id));
        }
        keyed.sort_unstable();

        let mut outcome = ReleaseOutcome::default();
        let mut kept = Vec::with_capacity(keyed.len());
        let mut rest_not_due = false;

        for (start, id) in keyed {
            // Sorted order: once one drive is not due, nothing later can be.
            if rest_not_due || start > now {
                rest_not_due = true;
                kept.push(id);
                continue;
            }

            let drive = drives.get_mut(id)?;
            if drive.disposition() != Disposition::Waiting {
                log::warn!("{drive} left the waiting state outside the scheduler; discarding");
                continue;
            }

            let at_origin = roster.get(drive.resident)?.at == Some(drive.origin);
            let current_graph = drive.graph_generation == graph.generation;
            if at_origin && current_graph {
                drive.begin(now);
                log::debug!("{drive} released at {now}");
                outcome.released.push(id);
            } else if drive.drop_deadline < now {
                drive.mark_dropped();
                log::info!("{drive} dropped: resident not at origin by {}", drive.drop_deadline);
                outcome.dropped += 1;
            } else {
                outcome.deferred += 1;
                kept.push(id);
            }
        }

        self.upcoming = kept;
        Ok(outcome)
    }
}

// ── TrafficManager ────────────────────────────────────────────────────────────

/// Drives one forward phase: turn-ons followed by the shuffled flow sweep.
pub struct TrafficManager;

impl TrafficManager {
    /// Turn every released drive on at its origin, then flow every vertex
    /// and edge of the graph in randomized order.
    ///
    /// The shuffle prevents a fixed sweep order from systematically favoring
    /// one path; it is the run's only source of randomness besides planner
    /// jitter, and both draw from the same seeded RNG.
    pub fn forward(
        graph: &RoadGraph,
        engine: &mut TrafficEngine,
        released: &[DriveId],
        now: Timestamp,
        drives: &mut DriveStore,
        roster: &mut ResidentRoster,
        rng: &mut SimRng,
    ) -> TrafficResult<()> {
        let mut ctx = FlowCtx { now, drives, roster };
        for &id in released {
            engine.turn_on(graph, id, &mut ctx)?;
        }

        let mut nodes = graph.node_refs();
        rng.shuffle(&mut nodes);
        for node in nodes {
            engine.flow(graph, node, &mut ctx)?;
        }
        Ok(())
    }
}
