use thiserror::Error;

use gw_core::{DriveId, ResidentId};
use gw_network::VertexKey;

/// Protocol and model-integrity errors of the traffic engine.
///
/// Capacity rejection is not represented here: a node declining a drive is an
/// expected outcome returned as data.  These variants signal a corrupted
/// model or a violated calling contract and abort the operation.
#[derive(Debug, Error)]
pub enum TrafficError {
    #[error("drive {0} does not exist")]
    UnknownDrive(DriveId),

    #[error("resident {0} does not exist")]
    UnknownResident(ResidentId),

    #[error("drive {drive} is not routed through the node that was offered it")]
    NotOnRoute { drive: DriveId },

    #[error("drive {drive} has no next route element at {at}")]
    NoNextRouteElement { drive: DriveId, at: VertexKey },

    #[error(
        "drive {drive} was planned against graph generation {drive_generation}, engine is at {engine_generation}"
    )]
    StaleGeneration {
        drive: DriveId,
        drive_generation: u64,
        engine_generation: u64,
    },

    #[error("admission contract violated: {0}")]
    Contract(String),
}

pub type TrafficResult<T> = Result<T, TrafficError>;
