//! `gw-grid` — the parcel grid underneath the road network.
//!
//! A city is a fixed-size 2-D field of parcels.  Each parcel is identified by
//! its integer coordinates and carries a tri-state surface: unpaved, paved
//! (part of the road network), or built (part of an off-grid location).
//!
//! The grid also records **entry parcels**: paved parcels where an off-grid
//! location attaches to the network.  Entry parcels are always classified as
//! crossings by the network builder, whether or not their neighbor count
//! would qualify them.
//!
//! # Data layout
//!
//! Surfaces live in one flat `Vec<Surface>` in row-major order; `Coord` is a
//! plain value type, so parcel identity is coordinate equality and the grid
//! can be queried without handing out references.

pub mod error;
pub mod grid;


pub use error::{GridError, GridResult};
pub use grid::{Coord, ParcelGrid, Surface};
