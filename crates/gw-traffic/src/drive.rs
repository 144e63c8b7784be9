//! The `Drive` entity: one planned trip with a fixed route and a lifecycle.

use gw_core::{DriveId, ResidentId, Timestamp};
use gw_network::{Route, VertexIx, VertexKey};

use crate::{TrafficError, TrafficResult};

/// Default drop deadline: one hour after the attempted start.
pub const DEFAULT_DROP_SECS: i64 = 3_600;

// ── Disposition ───────────────────────────────────────────────────────────────

/// Lifecycle state of a drive.
///
/// Advances monotonically `Waiting → Begun → Finished`, or
/// `Waiting → Dropped`.  `Finished` and `Dropped` are terminal.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Disposition {
    /// Planned but not yet released by the scheduler.
    Waiting,
    /// Released onto the network, currently underway.
    Begun,
    /// Arrived at its destination.  Terminal.
    Finished,
    /// Abandoned by the scheduler before it ever began.  Terminal.
    Dropped,
}

impl Disposition {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Disposition::Finished | Disposition::Dropped)
    }
}

// ── TripPlan ──────────────────────────────────────────────────────────────────

/// A planner's blueprint for one drive, before it is given an id and owner.
#[derive(Debug, Clone)]
pub struct TripPlan {
    pub route: Route,
    pub origin: VertexKey,
    pub destination: VertexKey,
    pub attempt_start: Timestamp,
    pub drop_deadline: Timestamp,
}

impl TripPlan {
    /// A plan with the default drop deadline.
    pub fn new(
        route: Route,
        origin: VertexKey,
        destination: VertexKey,
        attempt_start: Timestamp,
    ) -> Self {
        Self {
            route,
            origin,
            destination,
            attempt_start,
            drop_deadline: attempt_start.offset(DEFAULT_DROP_SECS),
        }
    }
}

// ── Drive ─────────────────────────────────────────────────────────────────────

/// One planned trip: immutable route and schedule, mutable lifecycle.
///
/// Transitions are owned by the scheduler (`begin`, `mark_dropped`) and by
/// the destination location (`finish`); nothing else writes a drive.
#[derive(Debug)]
pub struct Drive {
    pub id: DriveId,
    pub resident: ResidentId,
    /// The graph generation the route was planned against.  Handles in the
    /// route are meaningless for any other generation.
    pub graph_generation: u64,
    pub origin: VertexKey,
    pub destination: VertexKey,
    pub attempt_start: Timestamp,
    pub drop_deadline: Timestamp,

    route: Route,
    disposition: Disposition,
    actual_start: Option<Timestamp>,
    actual_end: Option<Timestamp>,
    /// Index into the route of the element currently holding this drive.
    pub(crate) pos: usize,
}

impl Drive {
    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn disposition(&self) -> Disposition {
        self.disposition
    }

    pub fn actual_start(&self) -> Option<Timestamp> {
        self.actual_start
    }

    pub fn actual_end(&self) -> Option<Timestamp> {
        self.actual_end
    }

    /// Trip duration in seconds, once finished.
    pub fn duration_secs(&self) -> Option<i64> {
        match (self.actual_start, self.actual_end) {
            (Some(s), Some(e)) => Some(e.since(s)),
            _ => None,
        }
    }

    // ── Lifecycle transitions ─────────────────────────────────────────────
    //
    // Each returns whether it actually changed state; terminal states never
    // transition again, and no recorded field is ever reassigned.

    /// `Waiting → Begun`, recording the actual start time.
    pub fn begin(&mut self, time: Timestamp) -> bool {
        if self.disposition == Disposition::Waiting && self.actual_start.is_none() {
            self.actual_start = Some(time);
            self.disposition = Disposition::Begun;
            return true;
        }
        false
    }

    /// `Begun → Finished`, recording the actual end time.
    pub fn finish(&mut self, time: Timestamp) -> bool {
        if self.disposition == Disposition::Begun && self.actual_end.is_none() {
            self.actual_end = Some(time);
            self.disposition = Disposition::Finished;
            return true;
        }
        false
    }

    /// `Waiting → Dropped`.
    pub fn mark_dropped(&mut self) -> bool {
        if self.disposition == Disposition::Waiting {
            self.disposition = Disposition::Dropped;
            return true;
        }
        false
    }

    // ── Route position ────────────────────────────────────────────────────
    //
    // `pos` indexes the element currently holding the drive.  A node being
    // offered the drive locates itself at `pos` (re-offer by the holder) or
    // just ahead of it; anything else means the drive is not on a route
    // through that node.

    pub(crate) fn position_of_vertex(&self, v: VertexIx) -> Option<usize> {
        use gw_network::NodeRef;
        let els = self.route.elements();
        for p in [self.pos, self.pos + 1] {
            if els.get(p) == Some(&NodeRef::Vertex(v)) {
                return Some(p);
            }
        }
        None
    }

    pub(crate) fn position_of_edge(&self, e: gw_network::EdgeIx) -> Option<usize> {
        use gw_network::NodeRef;
        let els = self.route.elements();
        for p in [self.pos + 1, self.pos + 2] {
            if els.get(p) == Some(&NodeRef::Edge(e)) {
                return Some(p);
            }
        }
        None
    }
}

impl std::fmt::Display for Drive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "drive {} ({} from {} to {})",
            self.id.0, self.resident, self.origin, self.destination
        )
    }
}

// ── DriveStore ────────────────────────────────────────────────────────────────

/// Arena of all drives of one simulation run.  Owns the id counter.
///
/// Drives are never removed; finished and dropped trips stay for statistics
/// until the store itself is discarded.
#[derive(Default)]
pub struct DriveStore {
    drives: Vec<Drive>,
}

impl DriveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Materialize a plan into a stored drive owned by `resident`.
    pub fn insert(&mut self, plan: TripPlan, resident: ResidentId, graph_generation: u64) -> DriveId {
        let id = DriveId(self.drives.len() as u32);
        self.drives.push(Drive {
            id,
            resident,
            graph_generation,
            origin: plan.origin,
            destination: plan.destination,
            attempt_start: plan.attempt_start,
            drop_deadline: plan.drop_deadline,
            route: plan.route,
            disposition: Disposition::Waiting,
            actual_start: None,
            actual_end: None,
            pos: 0,
        });
        id
    }

    pub fn get(&self, id: DriveId) -> TrafficResult<&Drive> {
        self.drives.get(id.index()).ok_or(TrafficError::UnknownDrive(id))
    }

    pub fn get_mut(&mut self, id: DriveId) -> TrafficResult<&mut Drive> {
        self.drives.get_mut(id.index()).ok_or(TrafficError::UnknownDrive(id))
    }

    pub fn len(&self) -> usize {
        self.drives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drives.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Drive> {
        self.drives.iter()
    }
}
