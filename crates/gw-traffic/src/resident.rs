//! Residents and the roster that owns them.

use gw_core::{LocationId, ResidentId};
use gw_network::VertexKey;

use crate::{TrafficError, TrafficResult};

/// One inhabitant of the city.
///
/// `at` is the on-off point the resident currently occupies, or `None`
/// while a drive is underway.
#[derive(Debug, Clone)]
pub struct Resident {
    pub id: ResidentId,
    pub home: LocationId,
    pub work: Option<LocationId>,
    pub at: Option<VertexKey>,
}

impl std::fmt::Display for Resident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "resident {}", self.id.0)
    }
}

/// Arena of all residents.  Owns the id counter.
#[derive(Default)]
pub struct ResidentRoster {
    residents: Vec<Resident>,
}

impl ResidentRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resident living at `home`, initially present there.
    pub fn create(&mut self, home: LocationId, work: Option<LocationId>) -> ResidentId {
        let id = ResidentId(self.residents.len() as u32);
        self.residents.push(Resident {
            id,
            home,
            work,
            at: Some(VertexKey::Location(home)),
        });
        id
    }

    pub fn get(&self, id: ResidentId) -> TrafficResult<&Resident> {
        self.residents.get(id.index()).ok_or(TrafficError::UnknownResident(id))
    }

    pub fn get_mut(&mut self, id: ResidentId) -> TrafficResult<&mut Resident> {
        self.residents.get_mut(id.index()).ok_or(TrafficError::UnknownResident(id))
    }

    /// Total population of the city.
    pub fn population(&self) -> usize {
        self.residents.len()
    }

    /// Residents in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Resident> {
        self.residents.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = ResidentId> + '_ {
        (0..self.residents.len() as u32).map(ResidentId)
    }
}
