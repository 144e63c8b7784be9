//! The `TripPlanner` trait — the main extension point for user code.

use gw_core::{SimRng, Timestamp};
use gw_network::RoadGraph;
use gw_traffic::{Resident, TripPlan};

/// Read-only state handed to every planning call.
pub struct PlanCtx<'a> {
    /// Current simulation time.
    pub now: Timestamp,
    /// The graph snapshot plans must be routed against.
    pub graph: &'a RoadGraph,
    /// Start of the planning window (inclusive).
    pub window_start: Timestamp,
    /// End of the planning window (exclusive).
    pub window_end: Timestamp,
}

/// Pluggable per-resident trip planning.
///
/// Called at most once per planning window per resident.  Returned plans
/// must reference the resident's origin and destination consistently with
/// where it actually is; an empty `Vec` is always valid.
///
/// Policies hold their own state (`&mut self`): the tick loop is sequential
/// and each resident owns exactly one policy instance, so no synchronisation
/// is involved.  Randomness comes from the injected [`SimRng`] to keep runs
/// reproducible from one seed.
pub trait TripPlanner {
    fn plan_trips(
        &mut self,
        resident: &Resident,
        ctx: &PlanCtx<'_>,
        rng: &mut SimRng,
    ) -> Vec<TripPlan>;
}

/// A [`TripPlanner`] that never plans a trip.
///
/// Useful as a placeholder in tests or for "passive" populations that simply
/// occupy their location without acting.
pub struct NoopPlanner;

impl TripPlanner for NoopPlanner {
    fn plan_trips(
        &mut self,
        _resident: &Resident,
        _ctx: &PlanCtx<'_>,
        _rng: &mut SimRng,
    ) -> Vec<TripPlan> {
        vec![]
    }
}
