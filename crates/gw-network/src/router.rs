//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! Planners request routes via the [`Router`] trait, so applications can swap
//! in custom implementations (congestion-aware costs, A*) without touching
//! the planners themselves.  The default [`DijkstraRouter`] costs every
//! segment at its free-flow traversal time.
//!
//! # Routes
//!
//! A [`Route`] is the fixed itinerary a drive follows: an alternating
//! sequence of vertex and edge handles from origin to destination with at
//! least one edge.  `Route::new` validates the alternation and that every
//! edge actually joins its flanking vertices, so a constructed route can be
//! followed without further checks.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::graph::{EdgeIx, NodeRef, RoadGraph, VertexIx};
use crate::{NetworkError, NetworkResult};

// ── Route ─────────────────────────────────────────────────────────────────────

/// A fixed trip itinerary: `[v0, e1, v1, …, ek, vk]` with `k >= 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    elements: Vec<NodeRef>,
    /// Cumulative free-flow traversal seconds — the routing cost.
    pub free_flow_secs: i64,
}

impl Route {
    /// Validate and wrap an alternating element sequence.
    pub fn new(graph: &RoadGraph, elements: Vec<NodeRef>) -> NetworkResult<Self> {
        validate(graph, &elements)?;
        let free_flow_secs = elements
            .iter()
            .filter_map(|n| match n {
                NodeRef::Edge(e) => Some(graph.segment(*e).free_flow_secs()),
                NodeRef::Vertex(_) => None,
            })
            .sum();
        Ok(Self { elements, free_flow_secs })
    }

    #[inline]
    pub fn elements(&self) -> &[NodeRef] {
        &self.elements
    }

    /// Number of elements (vertices + edges).
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of edges traversed.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.elements.len() / 2
    }

    #[inline]
    pub fn origin(&self) -> VertexIx {
        match self.elements[0] {
            NodeRef::Vertex(v) => v,
            NodeRef::Edge(_) => unreachable!("validated route starts with a vertex"),
        }
    }

    #[inline]
    pub fn destination(&self) -> VertexIx {
        match self.elements[self.elements.len() - 1] {
            NodeRef::Vertex(v) => v,
            NodeRef::Edge(_) => unreachable!("validated route ends with a vertex"),
        }
    }
}

/// A route must alternate vertex/edge, begin and end on vertices, contain at
/// least one edge, and every edge must join its flanking vertices.
fn validate(graph: &RoadGraph, elements: &[NodeRef]) -> NetworkResult<()> {
    let malformed = || NetworkError::MalformedRoute;

    if elements.len() < 3 || elements.len() % 2 == 0 {
        return Err(malformed());
    }
    for (i, node) in elements.iter().enumerate() {
        match (i % 2 == 0, node) {
            (true, NodeRef::Vertex(_)) | (false, NodeRef::Edge(_)) => {}
            _ => return Err(malformed()),
        }
    }
    for i in (1..elements.len()).step_by(2) {
        let (NodeRef::Vertex(prev), NodeRef::Edge(e), NodeRef::Vertex(next)) =
            (elements[i - 1], elements[i], elements[i + 1])
        else {
            return Err(malformed());
        };
        let seg = graph.segment(e);
        if seg.source != prev || seg.target != next {
            return Err(malformed());
        }
    }
    Ok(())
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine over the current graph generation.
pub trait Router {
    /// Compute a route from `from` to `to`.
    ///
    /// `from == to` is only routable through a self-loop segment on that
    /// vertex; anything else unreachable is [`NetworkError::NoRoute`].
    fn route(&self, graph: &RoadGraph, from: VertexIx, to: VertexIx) -> NetworkResult<Route>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra's algorithm over the arena graph.
///
/// Edge cost is the segment's free-flow traversal time; ties resolve by
/// vertex index so results are deterministic.
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(&self, graph: &RoadGraph, from: VertexIx, to: VertexIx) -> NetworkResult<Route> {
        dijkstra(graph, from, to)
    }
}

fn no_route(graph: &RoadGraph, from: VertexIx, to: VertexIx) -> NetworkError {
    NetworkError::NoRoute {
        from: graph.key(from),
        to: graph.key(to),
    }
}

fn dijkstra(graph: &RoadGraph, from: VertexIx, to: VertexIx) -> NetworkResult<Route> {
    if from == to {
        // Only a self-loop segment can realize a same-vertex trip.
        let self_loop = graph
            .out_edges(from)
            .iter()
            .copied()
            .find(|&e| graph.segment(e).target == from)
            .ok_or_else(|| no_route(graph, from, to))?;
        let elements = vec![NodeRef::Vertex(from), NodeRef::Edge(self_loop), NodeRef::Vertex(from)];
        return Route::new(graph, elements);
    }

    let n = graph.vertex_count();
    // dist[v] = best known cost (seconds) to reach v.
    let mut dist: Vec<i64> = vec![i64::MAX; n];
    // prev_edge[v] = edge that reached v on the best path.
    let mut prev_edge: Vec<Option<EdgeIx>> = vec![None; n];

    dist[from.index()] = 0;

    // Min-heap: Reverse makes BinaryHeap (max) behave as min-heap.  Secondary
    // key VertexIx ensures deterministic tie-breaking.
    let mut heap: BinaryHeap<Reverse<(i64, VertexIx)>> = BinaryHeap::new();
    heap.push(Reverse((0, from)));

    while let Some(Reverse((cost, vertex))) = heap.pop() {
        if vertex == to {
            return reconstruct(graph, &prev_edge, from, to);
        }

        // Skip stale heap entries.
        if cost > dist[vertex.index()] {
            continue;
        }

        for &edge in graph.out_edges(vertex) {
            let seg = graph.segment(edge);
            let new_cost = cost.saturating_add(seg.free_flow_secs());
            if new_cost < dist[seg.target.index()] {
                dist[seg.target.index()] = new_cost;
                prev_edge[seg.target.index()] = Some(edge);
                heap.push(Reverse((new_cost, seg.target)));
            }
        }
    }

    Err(no_route(graph, from, to))
}

fn reconstruct(
    graph: &RoadGraph,
    prev_edge: &[Option<EdgeIx>],
    from: VertexIx,
    to: VertexIx,
) -> NetworkResult<Route> {
    let mut elements = vec![NodeRef::Vertex(to)];
    let mut current = to;
    while current != from {
        let edge = prev_edge[current.index()]
            .unwrap_or_else(|| unreachable!("reconstruct called only for reached vertices"));
        elements.push(NodeRef::Edge(edge));
        current = graph.segment(edge).source;
        elements.push(NodeRef::Vertex(current));
    }
    elements.reverse();
    Route::new(graph, elements)
}
