//! The traffic engine: per-node queues and the take/flow protocol.
//!
//! # Data layout
//!
//! Node state lives in two arrays parallel to the graph's vertex and edge
//! arenas, so one engine instance is valid for exactly one graph generation.
//! Rebuilding the graph means rebuilding the engine and re-seeding location
//! occupancy from the roster.
//!
//! # Protocol recap
//!
//! - `take` offers a queue of drives to a node.  Segments admit from the
//!   front until the spacing bound fails and return the rest untouched;
//!   crossings and locations demultiplex by next route edge and forward
//!   within the same call, so their rejections are really edge rejections.
//! - `flow` advances a node's internal queue: due segment ETAs are offered
//!   to the segment's target, location and crossing departure queues are
//!   re-offered to their first edges.  Whatever is rejected stays queued.
//! - `turn_on` starts a released drive at its origin vertex, removing the
//!   resident from the location's occupants.

use std::collections::{BTreeMap, VecDeque};

use rustc_hash::{FxHashMap, FxHashSet};

use gw_core::{DriveId, LocationId, ResidentId, Timestamp};
use gw_network::{EdgeIx, NodeRef, RoadGraph, VertexIx, VertexKey};

use crate::resident::ResidentRoster;
use crate::{DriveStore, TrafficError, TrafficResult};

// ── FlowCtx ───────────────────────────────────────────────────────────────────

/// Mutable simulation state threaded through every protocol call.
pub struct FlowCtx<'a> {
    /// The current tick time.
    pub now: Timestamp,
    pub drives: &'a mut DriveStore,
    pub roster: &'a mut ResidentRoster,
}

// ── Node state ────────────────────────────────────────────────────────────────

/// One segment occupant: the drive and its frozen estimated arrival time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Eta {
    pub drive: DriveId,
    pub at: Timestamp,
}

enum VertexState {
    Crossing {
        /// Drives turned on here but not yet forwarded to their first edge.
        departures: Vec<DriveId>,
    },
    Location {
        occupants: FxHashSet<ResidentId>,
        /// Departure queues keyed by each drive's first route edge.
        turn_ons: FxHashMap<EdgeIx, Vec<DriveId>>,
        /// Drives finished here since the last statistics drain.
        finished: Vec<DriveId>,
    },
}

struct EdgeState {
    etas: Vec<Eta>,
}

// ── TrafficEngine ─────────────────────────────────────────────────────────────

/// All mutable traffic state for one graph generation.
pub struct TrafficEngine {
    generation: u64,
    vertex_state: Vec<VertexState>,
    edge_state: Vec<EdgeState>,
}

impl TrafficEngine {
    /// Fresh, empty state for every vertex and edge of `graph`.
    pub fn new(graph: &RoadGraph) -> Self {
        let vertex_state = graph
            .vertex_ids()
            .map(|v| match graph.key(v) {
                VertexKey::Crossing(_) => VertexState::Crossing { departures: Vec::new() },
                VertexKey::Location(_) => VertexState::Location {
                    occupants: FxHashSet::default(),
                    turn_ons: FxHashMap::default(),
                    finished: Vec::new(),
                },
            })
            .collect();
        let edge_state = graph.edge_ids().map(|_| EdgeState { etas: Vec::new() }).collect();
        Self {
            generation: graph.generation,
            vertex_state,
            edge_state,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ── Occupancy ─────────────────────────────────────────────────────────

    /// Register `resident` as present at location `loc`.
    ///
    /// Used to seed a fresh engine from the roster after a rebuild.
    pub fn add_occupant(
        &mut self,
        graph: &RoadGraph,
        loc: LocationId,
        resident: ResidentId,
    ) -> TrafficResult<()> {
        let v = self.location_vertex(graph, loc)?;
        match &mut self.vertex_state[v.index()] {
            VertexState::Location { occupants, .. } => {
                occupants.insert(resident);
                Ok(())
            }
            VertexState::Crossing { .. } => unreachable!("location key resolved to crossing state"),
        }
    }

    /// Residents currently present at `loc`.
    pub fn occupants(&self, graph: &RoadGraph, loc: LocationId) -> TrafficResult<Vec<ResidentId>> {
        let v = self.location_vertex(graph, loc)?;
        match &self.vertex_state[v.index()] {
            VertexState::Location { occupants, .. } => {
                let mut out: Vec<ResidentId> = occupants.iter().copied().collect();
                out.sort_unstable();
                Ok(out)
            }
            VertexState::Crossing { .. } => unreachable!("location key resolved to crossing state"),
        }
    }

    /// Drives finished at `loc` since the last [`dump_finished`](Self::dump_finished).
    pub fn finished_at(&self, graph: &RoadGraph, loc: LocationId) -> TrafficResult<Vec<DriveId>> {
        let v = self.location_vertex(graph, loc)?;
        match &self.vertex_state[v.index()] {
            VertexState::Location { finished, .. } => Ok(finished.clone()),
            VertexState::Crossing { .. } => unreachable!("location key resolved to crossing state"),
        }
    }

    /// Drain the recently-finished set of `loc`.
    pub fn dump_finished(&mut self, graph: &RoadGraph, loc: LocationId) -> TrafficResult<Vec<DriveId>> {
        let v = self.location_vertex(graph, loc)?;
        match &mut self.vertex_state[v.index()] {
            VertexState::Location { finished, .. } => Ok(std::mem::take(finished)),
            VertexState::Crossing { .. } => unreachable!("location key resolved to crossing state"),
        }
    }

    fn location_vertex(&self, graph: &RoadGraph, loc: LocationId) -> TrafficResult<VertexIx> {
        graph
            .vertex(VertexKey::Location(loc))
            .ok_or_else(|| TrafficError::Contract(format!("location {} is not in the graph", loc.0)))
    }

    // ── take ──────────────────────────────────────────────────────────────

    /// Offer `queue` to `node` for admission.
    ///
    /// Returns the rejected drives in offered order, untouched.
    pub fn take(
        &mut self,
        graph: &RoadGraph,
        node: NodeRef,
        queue: VecDeque<DriveId>,
        ctx: &mut FlowCtx<'_>,
    ) -> TrafficResult<Vec<DriveId>> {
        match node {
            NodeRef::Edge(e) => self.take_edge(graph, e, queue, ctx),
            NodeRef::Vertex(v) => self.take_vertex(graph, v, queue, ctx),
        }
    }

    /// Order-preserving partial admission against the spacing bound.
    fn take_edge(
        &mut self,
        graph: &RoadGraph,
        edge: EdgeIx,
        mut queue: VecDeque<DriveId>,
        ctx: &mut FlowCtx<'_>,
    ) -> TrafficResult<Vec<DriveId>> {
        let cfg = graph.config();
        let seg = graph.segment(edge);

        while let Some(&id) = queue.front() {
            let occupants = self.edge_state[edge.index()].etas.len();
            if !seg.admits(occupants, cfg) {
                break;
            }
            queue.pop_front();

            let drive = ctx.drives.get_mut(id)?;
            let pos = drive.position_of_edge(edge).ok_or(TrafficError::NotOnRoute { drive: id })?;
            let secs = seg.travel_secs(occupants + 1, cfg);
            let at = ctx.now.offset(secs);
            drive.pos = pos;
            self.edge_state[edge.index()].etas.push(Eta { drive: id, at });
            log::debug!("{drive} admitted to segment, eta {at}");
        }

        Ok(queue.into_iter().collect())
    }

    /// Demultiplex by next route edge and forward within the same call.
    ///
    /// Drives whose route ends at this vertex finish here if it is a
    /// location; a route ending at a crossing is a corrupted model.
    fn take_vertex(
        &mut self,
        graph: &RoadGraph,
        vertex: VertexIx,
        mut queue: VecDeque<DriveId>,
        ctx: &mut FlowCtx<'_>,
    ) -> TrafficResult<Vec<DriveId>> {
        let key = graph.key(vertex);
        // BTreeMap: forwarding order independent of hash state.
        let mut demux: BTreeMap<EdgeIx, VecDeque<DriveId>> = BTreeMap::new();

        while let Some(id) = queue.pop_front() {
            let drive = ctx.drives.get_mut(id)?;
            let pos = drive
                .position_of_vertex(vertex)
                .ok_or(TrafficError::NotOnRoute { drive: id })?;

            if pos == drive.route().len() - 1 {
                let VertexKey::Location(_) = key else {
                    return Err(TrafficError::NoNextRouteElement { drive: id, at: key });
                };
                drive.pos = pos;
                if !drive.finish(ctx.now) {
                    return Err(TrafficError::Contract(format!(
                        "{drive} reached its destination with disposition {:?}",
                        drive.disposition()
                    )));
                }
                let resident = drive.resident;
                log::info!("{drive} finishes at {key}");
                ctx.roster.get_mut(resident)?.at = Some(key);
                match &mut self.vertex_state[vertex.index()] {
                    VertexState::Location { occupants, finished, .. } => {
                        occupants.insert(resident);
                        finished.push(id);
                    }
                    VertexState::Crossing { .. } => {
                        unreachable!("location key resolved to crossing state")
                    }
                }
                continue;
            }

            match drive.route().elements()[pos + 1] {
                NodeRef::Edge(next) => demux.entry(next).or_default().push_back(id),
                NodeRef::Vertex(_) => unreachable!("validated routes alternate vertex/edge"),
            }
        }

        let mut rejected = Vec::new();
        for (edge, q) in demux {
            rejected.extend(self.take_edge(graph, edge, q, ctx)?);
        }
        Ok(rejected)
    }

    // ── flow ──────────────────────────────────────────────────────────────

    /// Advance `node`'s internal queue by one tick.
    pub fn flow(
        &mut self,
        graph: &RoadGraph,
        node: NodeRef,
        ctx: &mut FlowCtx<'_>,
    ) -> TrafficResult<()> {
        match node {
            NodeRef::Edge(e) => self.flow_edge(graph, e, ctx),
            NodeRef::Vertex(v) => self.flow_vertex(graph, v, ctx),
        }
    }

    /// Offer every due ETA to the segment's target; rejected drives keep
    /// their slot and their ETA record.
    fn flow_edge(
        &mut self,
        graph: &RoadGraph,
        edge: EdgeIx,
        ctx: &mut FlowCtx<'_>,
    ) -> TrafficResult<()> {
        let state = &mut self.edge_state[edge.index()];
        // Earlier ETAs have precedence; drive id breaks ties deterministically.
        state.etas.sort_unstable_by_key(|eta| (eta.at, eta.drive));
        let due: VecDeque<DriveId> = state
            .etas
            .iter()
            .take_while(|eta| eta.at <= ctx.now)
            .map(|eta| eta.drive)
            .collect();
        if due.is_empty() {
            return Ok(());
        }

        let target = graph.segment(edge).target;
        let rejected: FxHashSet<DriveId> =
            self.take_vertex(graph, target, due, ctx)?.into_iter().collect();

        let now = ctx.now;
        self.edge_state[edge.index()]
            .etas
            .retain(|eta| eta.at > now || rejected.contains(&eta.drive));
        Ok(())
    }

    fn flow_vertex(
        &mut self,
        graph: &RoadGraph,
        vertex: VertexIx,
        ctx: &mut FlowCtx<'_>,
    ) -> TrafficResult<()> {
        // A crossing re-offers the drives turned on at it; a location retries
        // each departure queue against its edge.  Either way the queue is
        // detached first so `take` can borrow the engine again.
        if let VertexState::Crossing { departures } = &mut self.vertex_state[vertex.index()] {
            if departures.is_empty() {
                return Ok(());
            }
            let queue = sort_by_attempt_start(std::mem::take(departures), ctx.drives)?;
            let rejected = self.take_vertex(graph, vertex, queue, ctx)?;
            if let VertexState::Crossing { departures } = &mut self.vertex_state[vertex.index()] {
                *departures = rejected;
            }
            return Ok(());
        }

        let mut edges: Vec<EdgeIx> = match &self.vertex_state[vertex.index()] {
            VertexState::Location { turn_ons, .. } => turn_ons.keys().copied().collect(),
            VertexState::Crossing { .. } => unreachable!("handled above"),
        };
        edges.sort_unstable();

        for edge in edges {
            let waiting = match &mut self.vertex_state[vertex.index()] {
                VertexState::Location { turn_ons, .. } => turn_ons.remove(&edge),
                VertexState::Crossing { .. } => unreachable!("vertex kind changed mid-flow"),
            };
            let Some(waiting) = waiting else { continue };
            let queue = sort_by_attempt_start(waiting, ctx.drives)?;
            let rejected = self.take_edge(graph, edge, queue, ctx)?;
            if !rejected.is_empty() {
                if let VertexState::Location { turn_ons, .. } =
                    &mut self.vertex_state[vertex.index()]
                {
                    turn_ons.insert(edge, rejected);
                }
            }
        }
        Ok(())
    }

    // ── turn_on ───────────────────────────────────────────────────────────

    /// Start a released drive at its origin vertex.
    ///
    /// The departing resident leaves the location's occupant set and the
    /// drive joins the departure queue of its first route edge; it reaches
    /// the network on a subsequent `flow` of the origin.
    pub fn turn_on(
        &mut self,
        graph: &RoadGraph,
        id: DriveId,
        ctx: &mut FlowCtx<'_>,
    ) -> TrafficResult<()> {
        let drive = ctx.drives.get(id)?;
        if drive.graph_generation != self.generation {
            return Err(TrafficError::StaleGeneration {
                drive: id,
                drive_generation: drive.graph_generation,
                engine_generation: self.generation,
            });
        }
        let origin = drive.route().origin();
        let NodeRef::Edge(first_edge) = drive.route().elements()[1] else {
            unreachable!("validated routes alternate vertex/edge");
        };
        let resident = drive.resident;
        log::debug!("{drive} turns on at {}", graph.key(origin));

        match &mut self.vertex_state[origin.index()] {
            VertexState::Crossing { departures } => departures.push(id),
            VertexState::Location { occupants, turn_ons, .. } => {
                occupants.remove(&resident);
                turn_ons.entry(first_edge).or_default().push(id);
            }
        }
        ctx.roster.get_mut(resident)?.at = None;
        Ok(())
    }

    // ── Snapshots ─────────────────────────────────────────────────────────

    /// Defensive snapshot of the drives currently held by `node`, sorted by id.
    pub fn drives_at(&self, node: NodeRef) -> Vec<DriveId> {
        let mut out = match node {
            NodeRef::Edge(e) => self.edge_state[e.index()].etas.iter().map(|eta| eta.drive).collect(),
            NodeRef::Vertex(v) => match &self.vertex_state[v.index()] {
                VertexState::Crossing { departures } => departures.clone(),
                VertexState::Location { turn_ons, .. } => {
                    turn_ons.values().flatten().copied().collect()
                }
            },
        };
        out.sort_unstable();
        out
    }

    /// The frozen ETA of a drive on `edge`, if it is on it.
    pub fn eta_of(&self, edge: EdgeIx, drive: DriveId) -> Option<Timestamp> {
        self.edge_state[edge.index()]
            .etas
            .iter()
            .find(|eta| eta.drive == drive)
            .map(|eta| eta.at)
    }

    /// Total drives queued at vertices (crossing departures + location turn-ons).
    pub fn drives_on_vertices(&self) -> usize {
        self.vertex_state
            .iter()
            .map(|s| match s {
                VertexState::Crossing { departures } => departures.len(),
                VertexState::Location { turn_ons, .. } => turn_ons.values().map(Vec::len).sum(),
            })
            .sum()
    }

    /// Total drives in transit on segments.
    pub fn drives_on_edges(&self) -> usize {
        self.edge_state.iter().map(|s| s.etas.len()).sum()
    }

    /// Total residents present at locations.
    pub fn residents_at_locations(&self) -> usize {
        self.vertex_state
            .iter()
            .map(|s| match s {
                VertexState::Crossing { .. } => 0,
                VertexState::Location { occupants, .. } => occupants.len(),
            })
            .sum()
    }
}

/// Sort a departure queue by (attempted start, id) — earlier trips first,
/// deterministic ties.
fn sort_by_attempt_start(ids: Vec<DriveId>, drives: &DriveStore) -> TrafficResult<VecDeque<DriveId>> {
    let mut keyed: Vec<(Timestamp, DriveId)> = Vec::with_capacity(ids.len());
    for id in ids {
        keyed.push((drives.get(id)?.attempt_start, id));
    }
    keyed.sort_unstable();
    Ok(keyed.into_iter().map(|(_, id)| id).collect())
}
