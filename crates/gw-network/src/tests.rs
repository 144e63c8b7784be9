//! Unit tests for gw-network.
//!
//! All tests build small grids by hand; expectations for crossing counts and
//! segment sets are worked out in the comments.

use gw_grid::{Coord, ParcelGrid};

use crate::graph::NodeRef;
use crate::{
    DijkstraRouter, LocationRegistry, NetworkError, RoadGraph, Route, Router, TrafficConfig,
    VertexKey, build_graph,
};

fn c(x: u16, y: u16) -> Coord {
    Coord::new(x, y)
}

fn build(grid: &ParcelGrid, registry: &LocationRegistry) -> RoadGraph {
    build_graph(grid, registry, TrafficConfig::default(), 0).unwrap()
}

/// 5×5 grid with a single paved column x = 2, entry parcel at (2, 2).
///
/// Crossings: (2,0) and (2,4) (one paved neighbor each) plus (2,2) (entry).
/// Segments: (2,0)↔(2,2) via (2,1) and (2,2)↔(2,4) via (2,3), both directions.
fn straight_column() -> ParcelGrid {
    let mut grid = ParcelGrid::new(5, 5);
    for y in 0..5 {
        grid.pave(c(2, y)).unwrap();
    }
    grid.add_entry_parcel(c(2, 2)).unwrap();
    grid
}

/// 5×5 grid with a cross centered at (1, 1): arms to (4,1), (0,1), (1,4), (1,0).
fn cross() -> ParcelGrid {
    let mut grid = ParcelGrid::new(5, 5);
    for x in 0..5 {
        grid.pave(c(x, 1)).unwrap();
    }
    for y in 0..5 {
        grid.pave(c(1, y)).unwrap();
    }
    grid
}

// ── Builder: crossing classification ──────────────────────────────────────────

mod classification {
    use super::*;

    #[test]
    fn grid_below_minimum_rejected() {
        for (w, h) in [(2, 5), (5, 2), (1, 1)] {
            let grid = ParcelGrid::new(w, h);
            let registry = LocationRegistry::new();
            match build_graph(&grid, &registry, TrafficConfig::default(), 0) {
                Err(NetworkError::GridTooSmall { width, height }) => {
                    assert_eq!((width, height), (w, h));
                }
                other => panic!("expected GridTooSmall, got {other:?}"),
            }
        }
    }

    #[test]
    fn two_neighbor_parcel_is_never_a_crossing() {
        let grid = straight_column();
        let graph = build(&grid, &LocationRegistry::new());
        // (2,1) and (2,3) have exactly 2 paved neighbors and are not entries.
        assert!(graph.vertex(VertexKey::Crossing(c(2, 1))).is_none());
        assert!(graph.vertex(VertexKey::Crossing(c(2, 3))).is_none());
    }

    #[test]
    fn entry_parcel_forces_a_crossing() {
        let grid = straight_column();
        let graph = build(&grid, &LocationRegistry::new());
        // (2,2) also has 2 paved neighbors, but is a declared entry parcel.
        assert!(graph.vertex(VertexKey::Crossing(c(2, 2))).is_some());
        assert_eq!(graph.vertex_count(), 3);
    }

    #[test]
    fn dead_ends_are_crossings() {
        let grid = straight_column();
        let graph = build(&grid, &LocationRegistry::new());
        assert!(graph.vertex(VertexKey::Crossing(c(2, 0))).is_some());
        assert!(graph.vertex(VertexKey::Crossing(c(2, 4))).is_some());
    }

    #[test]
    fn isolated_paved_parcel_is_a_crossing_without_edges() {
        let mut grid = ParcelGrid::new(5, 5);
        grid.pave(c(3, 3)).unwrap();
        let graph = build(&grid, &LocationRegistry::new());
        assert_eq!(graph.vertex_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }
}

// ── Builder: segment tracing ──────────────────────────────────────────────────

mod tracing {
    use super::*;

    #[test]
    fn straight_column_yields_four_directed_segments() {
        let grid = straight_column();
        let graph = build(&grid, &LocationRegistry::new());
        assert_eq!(graph.edge_count(), 4);

        let south = VertexKey::Crossing(c(2, 0));
        let mid = VertexKey::Crossing(c(2, 2));
        let north = VertexKey::Crossing(c(2, 4));

        let up = graph.find_edge(south, mid, &[c(2, 1)]).unwrap();
        let down = graph.find_edge(mid, south, &[c(2, 1)]).unwrap();
        assert_ne!(up, down);
        assert!(graph.find_edge(mid, north, &[c(2, 3)]).is_some());
        assert!(graph.find_edge(north, mid, &[c(2, 3)]).is_some());

        // Two intermediate parcels never connect endpoints directly.
        assert!(graph.edges_between(south, north).is_empty());
    }

    #[test]
    fn segment_length_counts_parcels_plus_one() {
        let grid = straight_column();
        let graph = build(&grid, &LocationRegistry::new());
        let e = graph
            .find_edge(VertexKey::Crossing(c(2, 0)), VertexKey::Crossing(c(2, 2)), &[c(2, 1)])
            .unwrap();
        // 1 intermediate parcel → 2 parcel-lengths.
        assert_eq!(graph.segment(e).length_m, 200.0);
    }

    #[test]
    fn fork_yields_k_outbound_and_k_inbound() {
        let grid = cross();
        let graph = build(&grid, &LocationRegistry::new());
        // Center plus four arm tips.
        assert_eq!(graph.vertex_count(), 5);
        assert_eq!(graph.edge_count(), 8);

        let center = graph.vertex(VertexKey::Crossing(c(1, 1))).unwrap();
        assert_eq!(graph.out_degree(center), 4);
        assert_eq!(graph.in_degree(center), 4);
    }

    #[test]
    fn adjacent_crossings_join_with_empty_parcel_list() {
        // A plus-shape with arms of length one: every arm tip is adjacent to
        // the center crossing.
        let mut grid = ParcelGrid::new(3, 3);
        grid.pave(c(1, 1)).unwrap();
        grid.pave(c(0, 1)).unwrap();
        grid.pave(c(2, 1)).unwrap();
        grid.pave(c(1, 0)).unwrap();
        grid.pave(c(1, 2)).unwrap();
        let graph = build(&grid, &LocationRegistry::new());
        let e = graph
            .find_edge(VertexKey::Crossing(c(1, 1)), VertexKey::Crossing(c(0, 1)), &[])
            .unwrap();
        assert!(graph.segment(e).parcels.is_empty());
        assert_eq!(graph.segment(e).length_m, 100.0);
    }

    #[test]
    fn single_connection_loop_yields_two_reversed_parallel_segments() {
        // 2×2 block loop at (1,1)-(2,2); (1,1) is the loop's only connection,
        // declared an entry parcel (it has exactly 2 paved neighbors).
        let mut grid = ParcelGrid::new(5, 5);
        for p in [c(1, 1), c(1, 2), c(2, 2), c(2, 1)] {
            grid.pave(p).unwrap();
        }
        grid.add_entry_parcel(c(1, 1)).unwrap();
        let graph = build(&grid, &LocationRegistry::new());

        assert_eq!(graph.vertex_count(), 1);
        let key = VertexKey::Crossing(c(1, 1));
        let loops = graph.edges_between(key, key);
        assert_eq!(loops.len(), 2);

        let a = &graph.segment(loops[0]).parcels;
        let b = &graph.segment(loops[1]).parcels;
        assert_eq!(a.len(), 3);
        let reversed: Vec<_> = b.iter().rev().copied().collect();
        assert_eq!(*a, reversed);
    }

    #[test]
    fn isolated_entry_parcel_gets_one_self_loop() {
        let mut grid = ParcelGrid::new(5, 5);
        grid.pave(c(3, 3)).unwrap();
        grid.add_entry_parcel(c(3, 3)).unwrap();
        let graph = build(&grid, &LocationRegistry::new());

        assert_eq!(graph.vertex_count(), 1);
        assert_eq!(graph.edge_count(), 1);
        let key = VertexKey::Crossing(c(3, 3));
        let e = graph.edges_between(key, key)[0];
        assert!(graph.segment(e).parcels.is_empty());
    }

    #[test]
    fn rebuilds_produce_equal_vertex_keys() {
        let grid = straight_column();
        let registry = LocationRegistry::new();
        let g1 = build_graph(&grid, &registry, TrafficConfig::default(), 1).unwrap();
        let g2 = build_graph(&grid, &registry, TrafficConfig::default(), 2).unwrap();
        for v in g1.vertex_ids() {
            assert!(g2.vertex(g1.key(v)).is_some());
        }
        assert_eq!(g1.vertex_count(), g2.vertex_count());
        assert_ne!(g1.generation, g2.generation);
    }
}

// ── Builder: locations ────────────────────────────────────────────────────────

mod locations {
    use super::*;

    fn column_with_locations() -> (ParcelGrid, LocationRegistry) {
        let mut grid = straight_column();
        grid.build(c(1, 4)).unwrap();
        grid.build(c(3, 0)).unwrap();
        let mut registry = LocationRegistry::new();
        let north = registry.create(&grid, [c(1, 4)], "north").unwrap();
        let south = registry.create(&grid, [c(3, 0)], "south").unwrap();
        registry.add_connection(&grid, north, c(2, 4)).unwrap();
        registry.add_connection(&grid, south, c(2, 0)).unwrap();
        (grid, registry)
    }

    #[test]
    fn connection_parcels_get_entrance_and_exit_segments() {
        let (grid, registry) = column_with_locations();
        let graph = build(&grid, &registry);

        // 3 crossings + 2 locations; 4 road segments + 2×2 location segments.
        assert_eq!(graph.vertex_count(), 5);
        assert_eq!(graph.edge_count(), 8);

        let north = registry.iter().next().unwrap().id;
        let xing = VertexKey::Crossing(c(2, 4));
        let loc = VertexKey::Location(north);
        assert_eq!(graph.edges_between(xing, loc).len(), 1);
        assert_eq!(graph.edges_between(loc, xing).len(), 1);
    }

    #[test]
    fn location_parcels_must_be_built() {
        let grid = straight_column();
        let mut registry = LocationRegistry::new();
        assert!(matches!(
            registry.create(&grid, [c(1, 4)], "x"),
            Err(NetworkError::LocationParcelNotBuilt(_))
        ));
    }

    #[test]
    fn location_parcels_cannot_overlap() {
        let mut grid = ParcelGrid::new(3, 3);
        grid.build(c(0, 0)).unwrap();
        let mut registry = LocationRegistry::new();
        registry.create(&grid, [c(0, 0)], "a").unwrap();
        assert!(matches!(
            registry.create(&grid, [c(0, 0)], "b"),
            Err(NetworkError::LocationParcelTaken(_))
        ));
    }

    #[test]
    fn connection_must_be_paved_and_adjacent() {
        let mut grid = straight_column();
        grid.build(c(1, 4)).unwrap();
        let mut registry = LocationRegistry::new();
        let id = registry.create(&grid, [c(1, 4)], "north").unwrap();
        // (0,0) is unpaved; (2,0) is paved but not adjacent to (1,4).
        assert!(registry.add_connection(&grid, id, c(0, 0)).is_err());
        assert!(matches!(
            registry.add_connection(&grid, id, c(2, 0)),
            Err(NetworkError::ConnectionNotAdjacent { .. })
        ));
        registry.add_connection(&grid, id, c(2, 4)).unwrap();
    }
}

// ── Road segment physics ──────────────────────────────────────────────────────

mod physics {
    use super::*;

    fn hundred_metre_segment() -> (RoadGraph, crate::graph::EdgeIx) {
        let mut grid = ParcelGrid::new(3, 3);
        grid.pave(c(0, 1)).unwrap();
        grid.pave(c(1, 1)).unwrap();
        grid.pave(c(2, 1)).unwrap();
        // (1,1) has 2 paved neighbors; entry promotion makes all three
        // parcels crossings, so each segment is zero-parcel and 100 m long.
        grid.add_entry_parcel(c(1, 1)).unwrap();
        let graph = build(&grid, &LocationRegistry::new());
        let e = graph
            .find_edge(VertexKey::Crossing(c(0, 1)), VertexKey::Crossing(c(1, 1)), &[])
            .unwrap();
        (graph, e)
    }

    #[test]
    fn capacity_bound() {
        let (graph, e) = hundred_metre_segment();
        let cfg = graph.config().clone();
        let seg = graph.segment(e);
        // (n + 1) * (2.0 + 4.5) <= 100 → last admissible occupant count is 15.
        assert!(seg.admits(0, &cfg));
        assert!(seg.admits(14, &cfg));
        assert!(!seg.admits(15, &cfg));
    }

    #[test]
    fn travel_time_free_flow() {
        let (graph, e) = hundred_metre_segment();
        let cfg = graph.config().clone();
        let seg = graph.segment(e);
        // Alone on the segment: spacing 95.5 m → speed capped at 16.7 m/s;
        // 100 / 16.7 = 5.99 → 6 s.
        assert_eq!(seg.travel_secs(1, &cfg), 6);
        assert_eq!(seg.free_flow_secs(), 6);
    }

    #[test]
    fn travel_time_degrades_with_density() {
        let (graph, e) = hundred_metre_segment();
        let cfg = graph.config().clone();
        let seg = graph.segment(e);
        // n = 10: spacing (100 − 45) / 9 ≈ 6.11 m → speed ≈ 3.06 m/s →
        // 100 / 3.06 ≈ 32.7 → 33 s.
        assert_eq!(seg.travel_secs(10, &cfg), 33);
        // Monotone: more occupants, never faster.
        let mut last = 0;
        for n in 1..=15 {
            let t = seg.travel_secs(n, &cfg);
            assert!(t >= last, "travel time decreased at n = {n}");
            last = t;
        }
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

mod routing {
    use super::*;

    #[test]
    fn shortest_path_down_the_column() {
        let grid = straight_column();
        let graph = build(&grid, &LocationRegistry::new());
        let north = graph.vertex(VertexKey::Crossing(c(2, 4))).unwrap();
        let south = graph.vertex(VertexKey::Crossing(c(2, 0))).unwrap();

        let route = DijkstraRouter.route(&graph, north, south).unwrap();
        assert_eq!(route.edge_count(), 2);
        assert_eq!(route.origin(), north);
        assert_eq!(route.destination(), south);
        // Two 200 m segments at 6.7... → 12 s each at the ceiling.
        assert_eq!(route.free_flow_secs, 24);
    }

    #[test]
    fn disconnected_vertices_have_no_route() {
        let mut grid = straight_column();
        grid.pave(c(0, 0)).unwrap(); // isolated corner parcel
        let graph = build(&grid, &LocationRegistry::new());
        let corner = graph.vertex(VertexKey::Crossing(c(0, 0))).unwrap();
        let north = graph.vertex(VertexKey::Crossing(c(2, 4))).unwrap();
        assert!(matches!(
            DijkstraRouter.route(&graph, corner, north),
            Err(NetworkError::NoRoute { .. })
        ));
    }

    #[test]
    fn same_vertex_routes_only_through_a_self_loop() {
        let mut grid = ParcelGrid::new(5, 5);
        grid.pave(c(3, 3)).unwrap();
        grid.add_entry_parcel(c(3, 3)).unwrap();
        let graph = build(&grid, &LocationRegistry::new());
        let v = graph.vertex(VertexKey::Crossing(c(3, 3))).unwrap();

        let route = DijkstraRouter.route(&graph, v, v).unwrap();
        assert_eq!(route.edge_count(), 1);
        assert_eq!(route.origin(), route.destination());

        // A vertex without a self-loop cannot route to itself.
        let grid2 = straight_column();
        let graph2 = build(&grid2, &LocationRegistry::new());
        let n = graph2.vertex(VertexKey::Crossing(c(2, 4))).unwrap();
        assert!(DijkstraRouter.route(&graph2, n, n).is_err());
    }

    #[test]
    fn malformed_routes_rejected() {
        let grid = straight_column();
        let graph = build(&grid, &LocationRegistry::new());
        let north = graph.vertex(VertexKey::Crossing(c(2, 4))).unwrap();
        let south = graph.vertex(VertexKey::Crossing(c(2, 0))).unwrap();

        // Too short.
        assert!(Route::new(&graph, vec![NodeRef::Vertex(north)]).is_err());
        // Edge that does not join the flanking vertices.
        let e = graph.out_edges(north)[0];
        assert!(
            Route::new(
                &graph,
                vec![NodeRef::Vertex(south), NodeRef::Edge(e), NodeRef::Vertex(north)]
            )
            .is_err()
        );
    }
}
