use thiserror::Error;

use crate::{Coord, Surface};

#[derive(Debug, Error)]
pub enum GridError {
    #[error("parcel {0} is outside the grid")]
    OutOfBounds(Coord),

    #[error("parcel {parcel} is already {surface:?} and cannot change kind")]
    SurfaceConflict { parcel: Coord, surface: Surface },

    #[error("entry parcel {0} must be paved")]
    EntryNotPaved(Coord),
}

pub type GridResult<T> = Result<T, GridError>;
