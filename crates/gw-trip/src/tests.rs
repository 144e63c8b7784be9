//! Unit tests for gw-trip.

use gw_core::{SimRng, Timestamp};
use gw_grid::{Coord, ParcelGrid};
use gw_network::{LocationRegistry, RoadGraph, TrafficConfig, VertexKey, build_graph};
use gw_traffic::ResidentRoster;

use crate::{CommutePlanner, NoopPlanner, PlanCtx, TripPlanner};

fn c(x: u16, y: u16) -> Coord {
    Coord::new(x, y)
}

/// Paved column with home at the north end, work at the south end.
fn commuter_world() -> (RoadGraph, ResidentRoster) {
    let mut grid = ParcelGrid::new(5, 5);
    for y in 0..5 {
        grid.pave(c(2, y)).unwrap();
    }
    grid.build(c(1, 4)).unwrap();
    grid.build(c(3, 0)).unwrap();

    let mut registry = LocationRegistry::new();
    let home = registry.create(&grid, [c(1, 4)], "home").unwrap();
    let work = registry.create(&grid, [c(3, 0)], "work").unwrap();
    registry.add_connection(&grid, home, c(2, 4)).unwrap();
    registry.add_connection(&grid, work, c(2, 0)).unwrap();

    let graph = build_graph(&grid, &registry, TrafficConfig::default(), 1).unwrap();
    let mut roster = ResidentRoster::new();
    roster.create(home, Some(work));
    (graph, roster)
}

fn ctx_at(graph: &RoadGraph, t: Timestamp) -> PlanCtx<'_> {
    PlanCtx {
        now: t,
        graph,
        window_start: t,
        window_end: t.offset(3_600),
    }
}

fn monday_at(hour: u32) -> Timestamp {
    Timestamp::ZERO.at_time_of_day(hour, 0)
}

#[test]
fn noop_never_plans() {
    let (graph, roster) = commuter_world();
    let resident = roster.iter().next().unwrap();
    let mut rng = SimRng::new(0);
    let plans = NoopPlanner.plan_trips(resident, &ctx_at(&graph, monday_at(7)), &mut rng);
    assert!(plans.is_empty());
}

#[test]
fn morning_window_plans_one_trip_to_work() {
    let (graph, roster) = commuter_world();
    let resident = roster.iter().next().unwrap();
    let mut planner = CommutePlanner::new();
    let mut rng = SimRng::new(42);

    let plans = planner.plan_trips(resident, &ctx_at(&graph, monday_at(7)), &mut rng);
    assert_eq!(plans.len(), 1);
    let plan = &plans[0];
    assert_eq!(plan.origin, VertexKey::Location(resident.home));
    assert_eq!(plan.destination, VertexKey::Location(resident.work.unwrap()));
    // Departure within 07:00..=09:00, dropped at 09:00.
    assert!(plan.attempt_start >= monday_at(7));
    assert!(plan.attempt_start <= monday_at(9));
    assert_eq!(plan.drop_deadline, monday_at(9));
    // Entrance + two column legs + exit.
    assert_eq!(plan.route.edge_count(), 4);
}

#[test]
fn one_morning_trip_per_day() {
    let (graph, roster) = commuter_world();
    let resident = roster.iter().next().unwrap();
    let mut planner = CommutePlanner::new();
    let mut rng = SimRng::new(42);

    assert_eq!(planner.plan_trips(resident, &ctx_at(&graph, monday_at(7)), &mut rng).len(), 1);
    // The 08:00 window must not produce a second leg.
    assert!(planner.plan_trips(resident, &ctx_at(&graph, monday_at(8)), &mut rng).is_empty());
}

#[test]
fn evening_leg_only_after_the_morning_leg() {
    let (graph, roster) = commuter_world();
    let resident = roster.iter().next().unwrap();
    let mut planner = CommutePlanner::new();
    let mut rng = SimRng::new(42);

    // No evening commute before ever going to work.
    assert!(planner.plan_trips(resident, &ctx_at(&graph, monday_at(16)), &mut rng).is_empty());

    planner.plan_trips(resident, &ctx_at(&graph, monday_at(7)), &mut rng);
    let plans = planner.plan_trips(resident, &ctx_at(&graph, monday_at(16)), &mut rng);
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].origin, VertexKey::Location(resident.work.unwrap()));
    assert_eq!(plans[0].destination, VertexKey::Location(resident.home));
    assert_eq!(plans[0].drop_deadline, monday_at(23));
}

#[test]
fn weekends_are_free() {
    let (graph, roster) = commuter_world();
    let resident = roster.iter().next().unwrap();
    let mut planner = CommutePlanner::new();
    let mut rng = SimRng::new(42);

    // Day 5 is Saturday.
    let saturday = Timestamp(5 * 86_400).at_time_of_day(7, 0);
    assert!(planner.plan_trips(resident, &ctx_at(&graph, saturday), &mut rng).is_empty());
}

#[test]
fn resident_without_work_never_commutes() {
    let (graph, _) = commuter_world();
    let mut roster = ResidentRoster::new();
    let home = gw_core::LocationId(0);
    roster.create(home, None);
    let resident = roster.iter().next().unwrap();

    let mut planner = CommutePlanner::new();
    let mut rng = SimRng::new(42);
    assert!(planner.plan_trips(resident, &ctx_at(&graph, monday_at(7)), &mut rng).is_empty());
}

#[test]
fn jitter_is_deterministic_per_seed() {
    let (graph, roster) = commuter_world();
    let resident = roster.iter().next().unwrap();

    let mut a = CommutePlanner::new();
    let mut b = CommutePlanner::new();
    let start_a = a
        .plan_trips(resident, &ctx_at(&graph, monday_at(7)), &mut SimRng::new(9))[0]
        .attempt_start;
    let start_b = b
        .plan_trips(resident, &ctx_at(&graph, monday_at(7)), &mut SimRng::new(9))[0]
        .attempt_start;
    assert_eq!(start_a, start_b);
}
