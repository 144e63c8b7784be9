//! The network builder: derives a [`RoadGraph`] from the parcel grid.
//!
//! # Algorithm
//!
//! 1. Classify crossings: every paved parcel whose paved orthogonal neighbor
//!    count is not exactly 2, plus every entry parcel (declared on the grid
//!    or implied by a location connection).
//! 2. From every crossing, trace each paved neighbor through plain paved
//!    parcels until another crossing is reached; the parcels visited become
//!    one directed segment.  Tracing from both ends of a road yields the two
//!    directions; tracing both ways around a single-connection loop yields
//!    the two parallel segments.
//! 3. Isolated entry crossings (no paved neighbors) get one self-loop
//!    segment so trips can still depart and arrive there.
//! 4. For every location connection parcel, emit one entrance segment
//!    (crossing → location) and one exit segment (location → crossing).
//!
//! The builder is pure: it reads the grid and registry and produces a fresh
//! graph.  Rebuild wholesale after any topology edit.

use rustc_hash::{FxHashMap, FxHashSet};

use gw_grid::{Coord, ParcelGrid};

use crate::graph::{EdgeIx, RoadGraph, RoadSegment, VertexIx, VertexKey};
use crate::{LocationRegistry, NetworkError, NetworkResult, TrafficConfig};

/// Build the routable graph for the current grid and locations.
///
/// `generation` is assigned by the caller (the city bumps it on every
/// rebuild) so stale route handles can be detected later.
pub fn build_graph(
    grid: &ParcelGrid,
    registry: &LocationRegistry,
    config: TrafficConfig,
    generation: u64,
) -> NetworkResult<RoadGraph> {
    if grid.width() < 3 || grid.height() < 3 {
        return Err(NetworkError::GridTooSmall {
            width: grid.width(),
            height: grid.height(),
        });
    }

    let crossings = find_crossings(grid, registry);

    // Deterministic vertex order: crossings by coordinate, then locations by id.
    let mut crossing_coords: Vec<Coord> = crossings.keys().copied().collect();
    crossing_coords.sort_unstable();

    let mut vertices: Vec<VertexKey> = Vec::with_capacity(crossing_coords.len() + registry.len());
    let mut vertex_ix: FxHashMap<VertexKey, VertexIx> = FxHashMap::default();
    for &c in &crossing_coords {
        let ix = VertexIx(vertices.len() as u32);
        vertices.push(VertexKey::Crossing(c));
        vertex_ix.insert(VertexKey::Crossing(c), ix);
    }
    for loc in registry.iter() {
        let ix = VertexIx(vertices.len() as u32);
        vertices.push(VertexKey::Location(loc.id));
        vertex_ix.insert(VertexKey::Location(loc.id), ix);
    }

    let mut graph = RoadGraph {
        generation,
        config,
        out_edges: vec![Vec::new(); vertices.len()],
        vertices,
        vertex_ix,
        edges: Vec::new(),
    };

    // Tracing from both ends of a road discovers each direction exactly once,
    // but segments are deduplicated by full identity to mirror the set
    // semantics of edge insertion.
    let mut seen: FxHashSet<(VertexIx, VertexIx, Vec<Coord>)> = FxHashSet::default();

    for &source in &crossing_coords {
        let source_ix = graph.vertex_ix[&VertexKey::Crossing(source)];
        let mut neighbors = crossings[&source].clone();
        neighbors.sort_unstable();

        if neighbors.is_empty() && grid.is_entry_parcel(source) {
            // Isolated entry crossing: one self-loop so trips can turn around.
            add_segment(&mut graph, &mut seen, source_ix, source_ix, Vec::new());
            continue;
        }

        for first in neighbors {
            let (target, parcels) = trace_segment(grid, &crossings, source, first)?;
            let target_ix = graph.vertex_ix[&VertexKey::Crossing(target)];
            add_segment(&mut graph, &mut seen, source_ix, target_ix, parcels);
        }
    }

    // Entrance and exit segments for every location connection.
    for loc in registry.iter() {
        let loc_ix = graph.vertex_ix[&VertexKey::Location(loc.id)];
        let mut connections: Vec<Coord> = loc.connections().iter().copied().collect();
        connections.sort_unstable();
        for parcel in connections {
            let xing_ix = graph
                .vertex_ix
                .get(&VertexKey::Crossing(parcel))
                .copied()
                .ok_or(NetworkError::NoCrossingAt(parcel))?;
            add_segment(&mut graph, &mut seen, xing_ix, loc_ix, Vec::new());
            add_segment(&mut graph, &mut seen, loc_ix, xing_ix, Vec::new());
        }
    }

    log::debug!(
        "built road graph generation {}: {} vertices, {} edges",
        graph.generation,
        graph.vertex_count(),
        graph.edge_count()
    );

    Ok(graph)
}

/// Map of every crossing parcel to its paved orthogonal neighbors.
///
/// A paved parcel is a crossing iff its paved-neighbor count is not exactly
/// 2, or it is an entry parcel (declared on the grid or used as a location
/// connection).
fn find_crossings(grid: &ParcelGrid, registry: &LocationRegistry) -> FxHashMap<Coord, Vec<Coord>> {
    let mut crossings: FxHashMap<Coord, Vec<Coord>> = FxHashMap::default();

    for c in grid.coords() {
        if !grid.is_paved(c) {
            continue;
        }
        let pn = grid.paved_neighbors(c);
        if pn.len() != 2 {
            crossings.insert(c, pn);
        }
    }

    let mut entries = registry.connection_parcels();
    entries.extend(grid.entry_parcels());
    for c in entries {
        if grid.is_paved(c) {
            crossings.entry(c).or_insert_with(|| grid.paved_neighbors(c));
        }
    }

    crossings
}

/// Walk from `source` through `first` along plain paved parcels until the
/// next crossing; returns the crossing reached and the parcels visited.
///
/// Every intermediate parcel has exactly 2 paved neighbors — one is where we
/// came from, the other is the way forward.  Finding no way forward means
/// the classification and the grid disagree: a fatal model defect.
fn trace_segment(
    grid: &ParcelGrid,
    crossings: &FxHashMap<Coord, Vec<Coord>>,
    source: Coord,
    first: Coord,
) -> NetworkResult<(Coord, Vec<Coord>)> {
    let mut prev = source;
    let mut current = first;
    let mut parcels = Vec::new();

    loop {
        if crossings.contains_key(&current) {
            return Ok((current, parcels));
        }
        parcels.push(current);
        let next = grid
            .paved_neighbors(current)
            .into_iter()
            .find(|&n| n != prev)
            .ok_or(NetworkError::BrokenTrace { at: current })?;
        prev = current;
        current = next;
    }
}

fn add_segment(
    graph: &mut RoadGraph,
    seen: &mut FxHashSet<(VertexIx, VertexIx, Vec<Coord>)>,
    source: VertexIx,
    target: VertexIx,
    parcels: Vec<Coord>,
) {
    if !seen.insert((source, target, parcels.clone())) {
        return;
    }
    let length_m = (parcels.len() as f64 + 1.0) * graph.config.parcel_length_m;
    let segment = RoadSegment {
        source,
        target,
        parcels,
        length_m,
        speed_ceiling_mps: graph.config.speed_ceiling_mps,
    };
    let ix = EdgeIx(graph.edges.len() as u32);
    graph.edges.push(segment);
    graph.out_edges[source.index()].push(ix);
}
