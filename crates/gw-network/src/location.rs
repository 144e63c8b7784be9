//! Off-grid locations and their registry.
//!
//! A location is a named aggregation of built parcels — homes, workplaces,
//! anything that originates or absorbs trips.  It is not itself part of the
//! paved grid; it joins the network through **connection parcels**, paved
//! parcels adjacent to one of its own, which the builder promotes to entry
//! crossings and ties to the location with entrance and exit segments.

use rustc_hash::FxHashSet;

use gw_core::LocationId;
use gw_grid::{Coord, ParcelGrid};

use crate::{NetworkError, NetworkResult};

// ── Location ──────────────────────────────────────────────────────────────────

/// One off-grid location: its built parcels and its network connections.
#[derive(Clone, Debug)]
pub struct Location {
    pub id: LocationId,
    pub label: String,
    parcels: FxHashSet<Coord>,
    connections: FxHashSet<Coord>,
}

impl Location {
    pub fn parcels(&self) -> &FxHashSet<Coord> {
        &self.parcels
    }

    /// Paved parcels where this location connects to the road network.
    pub fn connections(&self) -> &FxHashSet<Coord> {
        &self.connections
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "location {} ({})", self.id.0, self.label)
    }
}

// ── LocationRegistry ──────────────────────────────────────────────────────────

/// Creates and owns all [`Location`]s of one city, including their ids.
///
/// Enforces the creation rules: every parcel of a location must be built,
/// and no parcel may belong to two locations.
#[derive(Default)]
pub struct LocationRegistry {
    locations: Vec<Location>,
}

impl LocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a location from `parcels`, which must all be built and free.
    pub fn create<I>(&mut self, grid: &ParcelGrid, parcels: I, label: &str) -> NetworkResult<LocationId>
    where
        I: IntoIterator<Item = Coord>,
    {
        let parcels: FxHashSet<Coord> = parcels.into_iter().collect();
        if parcels.is_empty() {
            return Err(NetworkError::EmptyLocation);
        }
        for &p in &parcels {
            if !grid.is_built(p) {
                return Err(NetworkError::LocationParcelNotBuilt(p));
            }
            if self.locations.iter().any(|l| l.parcels.contains(&p)) {
                return Err(NetworkError::LocationParcelTaken(p));
            }
        }
        let id = LocationId(self.locations.len() as u32);
        self.locations.push(Location {
            id,
            label: label.to_owned(),
            parcels,
            connections: FxHashSet::default(),
        });
        Ok(id)
    }

    /// Record that `location` connects to the road network at `parcel`.
    ///
    /// The parcel must be paved and orthogonally adjacent to one of the
    /// location's own parcels.  Re-adding an existing connection is a no-op.
    pub fn add_connection(
        &mut self,
        grid: &ParcelGrid,
        location: LocationId,
        parcel: Coord,
    ) -> NetworkResult<()> {
        let loc = self
            .locations
            .get_mut(location.index())
            .ok_or(NetworkError::UnknownLocation(location))?;
        if !grid.is_paved(parcel) {
            return Err(NetworkError::ConnectionNotPaved(parcel));
        }
        let adjacent = loc
            .parcels
            .iter()
            .any(|&own| grid.neighbors(own).contains(&parcel));
        if !adjacent {
            return Err(NetworkError::ConnectionNotAdjacent { location, parcel });
        }
        loc.connections.insert(parcel);
        Ok(())
    }

    pub fn get(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Locations in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    /// Every connection parcel of every location.
    pub fn connection_parcels(&self) -> FxHashSet<Coord> {
        self.locations
            .iter()
            .flat_map(|l| l.connections.iter().copied())
            .collect()
    }
}
