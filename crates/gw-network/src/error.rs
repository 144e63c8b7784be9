use thiserror::Error;

use gw_core::LocationId;
use gw_grid::Coord;

use crate::VertexKey;

/// Network construction and routing errors.
///
/// Everything here signals a corrupted or unbuildable model: these are
/// fatal to the operation that raised them.  Capacity rejection is *not* an
/// error anywhere in the workspace — rejected drives are ordinary return
/// values of the admission protocol.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("cannot build a network on a {width}x{height} grid; both dimensions must be >= 3")]
    GridTooSmall { width: u16, height: u16 },

    #[error("segment trace stuck at {at}: no unvisited paved neighbor")]
    BrokenTrace { at: Coord },

    #[error("no crossing exists at connection parcel {0}")]
    NoCrossingAt(Coord),

    #[error("location {0} does not exist")]
    UnknownLocation(LocationId),

    #[error("location must aggregate at least one parcel")]
    EmptyLocation,

    #[error("location parcel {0} is not built")]
    LocationParcelNotBuilt(Coord),

    #[error("parcel {0} already belongs to another location")]
    LocationParcelTaken(Coord),

    #[error("connection parcel {0} is not paved")]
    ConnectionNotPaved(Coord),

    #[error("connection parcel {parcel} is not adjacent to location {location}")]
    ConnectionNotAdjacent { location: LocationId, parcel: Coord },

    #[error("no route from {from} to {to}")]
    NoRoute { from: VertexKey, to: VertexKey },

    #[error("route elements do not form an alternating vertex/edge path")]
    MalformedRoute,

    #[error("vertex {0} is not in the current graph")]
    UnknownVertex(VertexKey),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
