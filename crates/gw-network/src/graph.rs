//! The routable graph: vertices, road segments, and arena handles.

use rustc_hash::FxHashMap;

use gw_core::LocationId;
use gw_grid::Coord;

use crate::TrafficConfig;

// ── Arena indexes ─────────────────────────────────────────────────────────────

/// Dense index of a vertex within one [`RoadGraph`] generation.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct VertexIx(pub u32);

impl VertexIx {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Dense index of an edge within one [`RoadGraph`] generation.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct EdgeIx(pub u32);

impl EdgeIx {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A handle to either a vertex or an edge of the graph.
///
/// Trip routes are stored as alternating `Vertex`/`Edge` sequences of these
/// handles.  A handle is only meaningful for the graph generation it was
/// issued by; the scheduler checks generations before acting on a route.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum NodeRef {
    Vertex(VertexIx),
    Edge(EdgeIx),
}

// ── VertexKey ─────────────────────────────────────────────────────────────────

/// Stable vertex identity, independent of arena index and graph generation.
///
/// Crossings are identified solely by their parcel's coordinates; two
/// crossings over the same parcel are interchangeable.  Locations are
/// identified by their registry id.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VertexKey {
    Crossing(Coord),
    Location(LocationId),
}

impl std::fmt::Display for VertexKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VertexKey::Crossing(c) => write!(f, "crossing {c}"),
            VertexKey::Location(id) => write!(f, "location {}", id.0),
        }
    }
}

// ── RoadSegment ───────────────────────────────────────────────────────────────

/// A directed, capacity-limited edge covering zero or more intermediate
/// paved parcels.
///
/// Identity includes the ordered parcel list: the two directed segments
/// around a closed loop share endpoints but are distinct edges, each the
/// reverse of the other.
#[derive(Clone, Debug)]
pub struct RoadSegment {
    pub source: VertexIx,
    pub target: VertexIx,
    /// Intermediate parcels, ordered from source to target.
    pub parcels: Vec<Coord>,
    /// Derived physical length in metres.
    pub length_m: f64,
    /// Speed ceiling in metres per second.
    pub speed_ceiling_mps: f64,
}

impl RoadSegment {
    /// Whether one more drive fits: an additional occupant must still leave
    /// every vehicle its minimum following gap.
    pub fn admits(&self, occupants: usize, cfg: &TrafficConfig) -> bool {
        (occupants as f64 + 1.0) * (cfg.min_follow_gap_m + cfg.vehicle_length_m)
            <= self.length_m
    }

    /// Estimated seconds to traverse the segment with `occupants` vehicles on
    /// it (including the one being admitted).
    ///
    /// A simplified car-following model: the available spacing per vehicle
    /// sets the speed, capped by the segment's ceiling.  The estimate is
    /// frozen at admission time and never recomputed as later drives board.
    pub fn travel_secs(&self, occupants: usize, cfg: &TrafficConfig) -> i64 {
        let n = occupants as f64;
        let spacing = if occupants <= 1 {
            self.length_m - cfg.vehicle_length_m
        } else {
            (self.length_m - n * cfg.vehicle_length_m) / (n - 1.0)
        };
        let speed = (spacing / cfg.follow_secs).min(self.speed_ceiling_mps);
        ((self.length_m / speed).round() as i64).max(1)
    }

    /// Traversal seconds on an empty segment — the routing cost.
    pub fn free_flow_secs(&self) -> i64 {
        ((self.length_m / self.speed_ceiling_mps).round() as i64).max(1)
    }
}

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Directed pseudograph of crossings, locations, and road segments.
///
/// Built wholesale by [`crate::build_graph`] whenever topology changes —
/// never patched incrementally.  `generation` distinguishes rebuilds so that
/// stale [`NodeRef`] handles can be detected.
#[derive(Debug)]
pub struct RoadGraph {
    /// Monotonic rebuild counter, assigned by the owner of the graph.
    pub generation: u64,

    pub(crate) config: TrafficConfig,
    pub(crate) vertices: Vec<VertexKey>,
    pub(crate) vertex_ix: FxHashMap<VertexKey, VertexIx>,
    pub(crate) out_edges: Vec<Vec<EdgeIx>>,
    pub(crate) edges: Vec<RoadSegment>,
}

impl RoadGraph {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn config(&self) -> &TrafficConfig {
        &self.config
    }

    /// The stable key of a vertex.
    #[inline]
    pub fn key(&self, v: VertexIx) -> VertexKey {
        self.vertices[v.index()]
    }

    /// Resolve a stable key to this generation's arena index.
    #[inline]
    pub fn vertex(&self, key: VertexKey) -> Option<VertexIx> {
        self.vertex_ix.get(&key).copied()
    }

    #[inline]
    pub fn segment(&self, e: EdgeIx) -> &RoadSegment {
        &self.edges[e.index()]
    }

    /// Outgoing edges of `v`.
    #[inline]
    pub fn out_edges(&self, v: VertexIx) -> &[EdgeIx] {
        &self.out_edges[v.index()]
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexIx> + '_ {
        (0..self.vertices.len() as u32).map(VertexIx)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeIx> + '_ {
        (0..self.edges.len() as u32).map(EdgeIx)
    }

    /// Every vertex and edge of the graph as [`NodeRef`]s — the flow sweep
    /// iterates (a shuffle of) this list once per tick.
    pub fn node_refs(&self) -> Vec<NodeRef> {
        self.vertex_ids()
            .map(NodeRef::Vertex)
            .chain(self.edge_ids().map(NodeRef::Edge))
            .collect()
    }

    /// Find the directed edge `source → target` with the given parcel list.
    pub fn find_edge(
        &self,
        source: VertexKey,
        target: VertexKey,
        parcels: &[Coord],
    ) -> Option<EdgeIx> {
        let s = self.vertex(source)?;
        let t = self.vertex(target)?;
        self.out_edges(s)
            .iter()
            .copied()
            .find(|&e| self.edges[e.index()].target == t && self.edges[e.index()].parcels == parcels)
    }

    /// All directed edges `source → target`, regardless of parcel list.
    pub fn edges_between(&self, source: VertexKey, target: VertexKey) -> Vec<EdgeIx> {
        match (self.vertex(source), self.vertex(target)) {
            (Some(s), Some(t)) => self
                .out_edges(s)
                .iter()
                .copied()
                .filter(|&e| self.edges[e.index()].target == t)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// In-degree of `v` (number of edges whose target is `v`).
    pub fn in_degree(&self, v: VertexIx) -> usize {
        self.edges.iter().filter(|s| s.target == v).count()
    }

    /// Out-degree of `v`.
    #[inline]
    pub fn out_degree(&self, v: VertexIx) -> usize {
        self.out_edges[v.index()].len()
    }
}
