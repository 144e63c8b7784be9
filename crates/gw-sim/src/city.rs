//! The `City`: grid, locations, graph, population, and the tick entry point.

use gw_core::{LocationId, ResidentId, SimClock, SimRng, Timestamp};
use gw_grid::{Coord, ParcelGrid};
use gw_network::{LocationRegistry, RoadGraph, VertexKey, build_graph};
use gw_traffic::{DriveStore, ResidentRoster, TrafficEngine};
use gw_trip::TripPlanner;

use crate::managers::{ResidentManager, TrafficManager};
use crate::{CityConfig, SimError, SimResult};

/// Counts from one completed tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Simulation time at the end of the tick.
    pub now: Timestamp,
    /// Drives planned this tick.
    pub planned: usize,
    /// Drives released onto the network this tick.
    pub released: usize,
    /// Drives dropped this tick.
    pub dropped: usize,
    /// Due drives deferred to a later tick.
    pub deferred: usize,
}

/// One simulated city: the single owner of all simulation state.
///
/// Topology edits (paving, building, connecting locations) rebuild the road
/// graph wholesale; [`advance`](Self::advance) runs one tick against
/// whatever graph is current at that moment.
pub struct City {
    config: CityConfig,
    clock: SimClock,
    rng: SimRng,

    grid: ParcelGrid,
    registry: LocationRegistry,
    graph: RoadGraph,
    engine: TrafficEngine,

    drives: DriveStore,
    roster: ResidentRoster,
    residents: ResidentManager,

    generation: u64,
}

impl City {
    /// Construct a city.  Fails for grids below 3×3 — crossing
    /// classification is undefined there, so the city cannot exist.
    pub fn new(config: CityConfig) -> SimResult<Self> {
        let grid = ParcelGrid::new(config.width, config.height);
        let registry = LocationRegistry::new();
        let generation = 1;
        let graph = build_graph(&grid, &registry, config.traffic.clone(), generation)?;
        let engine = TrafficEngine::new(&graph);
        Ok(Self {
            clock: SimClock::new(config.period_secs),
            rng: SimRng::new(config.seed),
            grid,
            registry,
            graph,
            engine,
            drives: DriveStore::new(),
            roster: ResidentRoster::new(),
            residents: ResidentManager::new(),
            generation,
            config,
        })
    }

    // ── Topology edits (each rebuilds the graph) ──────────────────────────

    /// Pave one parcel.
    pub fn pave(&mut self, x: u16, y: u16) -> SimResult<()> {
        self.grid.pave(Coord::new(x, y))?;
        self.rebuild_network()
    }

    /// Pave several parcels with a single rebuild at the end.
    pub fn pave_many<I>(&mut self, coords: I) -> SimResult<()>
    where
        I: IntoIterator<Item = (u16, u16)>,
    {
        for (x, y) in coords {
            self.grid.pave(Coord::new(x, y))?;
        }
        self.rebuild_network()
    }

    /// Declare a paved parcel as a network entry point.
    pub fn add_entry_parcel(&mut self, x: u16, y: u16) -> SimResult<()> {
        self.grid.add_entry_parcel(Coord::new(x, y))?;
        self.rebuild_network()
    }

    /// Build the given parcels and aggregate them into a new location.
    pub fn make_location<I>(&mut self, parcels: I, label: &str) -> SimResult<LocationId>
    where
        I: IntoIterator<Item = (u16, u16)>,
    {
        let coords: Vec<Coord> = parcels.into_iter().map(|(x, y)| Coord::new(x, y)).collect();
        for &c in &coords {
            self.grid.build(c)?;
        }
        let id = self.registry.create(&self.grid, coords, label)?;
        self.rebuild_network()?;
        Ok(id)
    }

    /// Connect `location` to the road network at `(x, y)`.
    ///
    /// The parcel becomes an entry parcel (and therefore a crossing), and the
    /// rebuilt graph carries an entrance and an exit segment for it.
    pub fn connect_location(&mut self, location: LocationId, x: u16, y: u16) -> SimResult<()> {
        let parcel = Coord::new(x, y);
        self.grid.add_entry_parcel(parcel)?;
        self.registry.add_connection(&self.grid, location, parcel)?;
        self.rebuild_network()
    }

    /// Rebuild the graph and traffic state from the current grid and
    /// registry.  Residents present at locations are re-seeded; drives in
    /// transit on the old graph do not survive a rebuild.
    pub fn rebuild_network(&mut self) -> SimResult<()> {
        let in_transit = self.engine.drives_on_vertices() + self.engine.drives_on_edges();
        if in_transit > 0 {
            log::warn!("rebuilding the network discards {in_transit} drives in transit");
        }
        self.generation += 1;
        self.graph = build_graph(
            &self.grid,
            &self.registry,
            self.config.traffic.clone(),
            self.generation,
        )?;
        self.engine = TrafficEngine::new(&self.graph);
        for resident in self.roster.iter() {
            if let Some(VertexKey::Location(loc)) = resident.at {
                self.engine.add_occupant(&self.graph, loc, resident.id)?;
            }
        }
        Ok(())
    }

    // ── Population ────────────────────────────────────────────────────────

    /// Create a resident at `home` with the given planning policy.
    pub fn add_resident(
        &mut self,
        home: LocationId,
        work: Option<LocationId>,
        planner: Box<dyn TripPlanner>,
    ) -> SimResult<ResidentId> {
        let id = self.roster.create(home, work);
        self.engine.add_occupant(&self.graph, home, id)?;
        self.residents.add_planner(planner);
        Ok(id)
    }

    // ── Tick entry point ──────────────────────────────────────────────────

    /// Advance the simulation by exactly one period.
    ///
    /// `seconds` must equal the configured period; partial-period
    /// advancement is not supported.
    pub fn advance(&mut self, seconds: u32) -> SimResult<TickReport> {
        if seconds != self.clock.period_secs {
            return Err(SimError::PartialPeriod {
                requested: seconds,
                period: self.clock.period_secs,
            });
        }
        self.clock.advance_period();
        let now = self.clock.now;
        let window_end = self.clock.window_end();

        let planned = self.residents.plan(
            &self.roster,
            &self.graph,
            now,
            window_end,
            &mut self.drives,
            &mut self.rng,
        );

        let outcome = self
            .residents
            .release(&self.roster, &self.graph, now, &mut self.drives)?;

        TrafficManager::forward(
            &self.graph,
            &mut self.engine,
            &outcome.released,
            now,
            &mut self.drives,
            &mut self.roster,
            &mut self.rng,
        )?;

        Ok(TickReport {
            now,
            planned,
            released: outcome.released.len(),
            dropped: outcome.dropped,
            deferred: outcome.deferred,
        })
    }

    /// Advance by exactly one configured period.
    pub fn advance_period(&mut self) -> SimResult<TickReport> {
        self.advance(self.clock.period_secs)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &CityConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn grid(&self) -> &ParcelGrid {
        &self.grid
    }

    pub fn registry(&self) -> &LocationRegistry {
        &self.registry
    }

    pub fn graph(&self) -> &RoadGraph {
        &self.graph
    }

    pub fn engine(&self) -> &TrafficEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut TrafficEngine {
        &mut self.engine
    }

    pub fn drives(&self) -> &DriveStore {
        &self.drives
    }

    pub fn roster(&self) -> &ResidentRoster {
        &self.roster
    }

    /// Drives planned but not yet released or dropped.
    pub fn upcoming_drives(&self) -> &[gw_core::DriveId] {
        self.residents.upcoming()
    }

    // ── Statistics helpers ────────────────────────────────────────────────
    //
    // Thin pass-throughs pairing the engine with the graph it indexes, so
    // consumers don't need to borrow both separately.

    /// Residents currently present at `location`.
    pub fn occupants(&self, location: LocationId) -> SimResult<Vec<ResidentId>> {
        Ok(self.engine.occupants(&self.graph, location)?)
    }

    /// Drives finished at `location` since the last drain.
    pub fn finished_at(&self, location: LocationId) -> SimResult<Vec<gw_core::DriveId>> {
        Ok(self.engine.finished_at(&self.graph, location)?)
    }

    /// Drain the recently-finished drives of `location`.
    pub fn dump_finished(&mut self, location: LocationId) -> SimResult<Vec<gw_core::DriveId>> {
        Ok(self.engine.dump_finished(&self.graph, location)?)
    }
}
