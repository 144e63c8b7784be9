//! The built-in commuter policy: weekday home→work→home trips.

use gw_core::{LocationId, SimRng};
use gw_network::{DijkstraRouter, NetworkError, RoadGraph, Route, Router, VertexKey};
use gw_traffic::{Resident, TripPlan};

use crate::{PlanCtx, TripPlanner};

/// Morning departures are drawn from 07:00 plus 0..=120 minutes; the trip is
/// abandoned if it cannot start by 09:00.
const MORNING_HOURS: std::ops::RangeInclusive<u32> = 7..=8;
/// Evening departures from 16:00 plus 0..=120 minutes, abandoned at 23:00.
const EVENING_HOURS: std::ops::RangeInclusive<u32> = 16..=23;
const JITTER_MINUTES: i64 = 120;

/// Plans one commute to work and one back per weekday.
///
/// Routes are computed with [`DijkstraRouter`] and cached per direction until
/// the graph generation changes.  A resident without a workplace, or whose
/// home and work are not connected, never commutes.
pub struct CommutePlanner {
    gone_to_work: bool,
    to_work: Option<(u64, Route)>,
    to_home: Option<(u64, Route)>,
}

impl CommutePlanner {
    pub fn new() -> Self {
        Self {
            gone_to_work: false,
            to_work: None,
            to_home: None,
        }
    }

    /// Cached route lookup, recomputed when `graph.generation` moves on.
    fn route_between(
        cache: &mut Option<(u64, Route)>,
        graph: &RoadGraph,
        from: LocationId,
        to: LocationId,
    ) -> Option<Route> {
        if let Some((generation, route)) = cache {
            if *generation == graph.generation {
                return Some(route.clone());
            }
        }
        let route = find_route(graph, from, to)?;
        *cache = Some((graph.generation, route.clone()));
        Some(route)
    }
}

impl Default for CommutePlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl TripPlanner for CommutePlanner {
    fn plan_trips(
        &mut self,
        resident: &Resident,
        ctx: &PlanCtx<'_>,
        rng: &mut SimRng,
    ) -> Vec<TripPlan> {
        if ctx.window_start.is_weekend() {
            return vec![];
        }
        let Some(work) = resident.work else {
            return vec![];
        };
        let hour = ctx.window_start.hour_of_day();

        if MORNING_HOURS.contains(&hour) && !self.gone_to_work {
            let Some(route) = Self::route_between(&mut self.to_work, ctx.graph, resident.home, work)
            else {
                return vec![];
            };
            let start = ctx
                .window_start
                .at_time_of_day(7, 0)
                .offset(60 * rng.gen_range(0..=JITTER_MINUTES));
            self.gone_to_work = true;
            log::debug!("{resident} plans a commute to work at {start}");
            vec![TripPlan {
                route,
                origin: VertexKey::Location(resident.home),
                destination: VertexKey::Location(work),
                attempt_start: start,
                drop_deadline: ctx.window_start.at_time_of_day(9, 0),
            }]
        } else if EVENING_HOURS.contains(&hour) && self.gone_to_work {
            let Some(route) = Self::route_between(&mut self.to_home, ctx.graph, work, resident.home)
            else {
                return vec![];
            };
            let start = ctx
                .window_start
                .at_time_of_day(16, 0)
                .offset(60 * rng.gen_range(0..=JITTER_MINUTES));
            self.gone_to_work = false;
            log::debug!("{resident} plans a commute home at {start}");
            vec![TripPlan {
                route,
                origin: VertexKey::Location(work),
                destination: VertexKey::Location(resident.home),
                attempt_start: start,
                drop_deadline: ctx.window_start.at_time_of_day(23, 0),
            }]
        } else {
            vec![]
        }
    }
}

fn find_route(graph: &RoadGraph, from: LocationId, to: LocationId) -> Option<Route> {
    let from_ix = graph.vertex(VertexKey::Location(from))?;
    let to_ix = graph.vertex(VertexKey::Location(to))?;
    match DijkstraRouter.route(graph, from_ix, to_ix) {
        Ok(route) => Some(route),
        Err(NetworkError::NoRoute { from, to }) => {
            log::warn!("no commute route from {from} to {to}");
            None
        }
        Err(e) => {
            log::warn!("commute routing failed: {e}");
            None
        }
    }
}
