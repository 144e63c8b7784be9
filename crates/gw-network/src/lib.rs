//! `gw-network` — the routable road graph derived from the parcel grid.
//!
//! # From parcels to a graph
//!
//! The network builder classifies every paved parcel whose count of paved
//! orthogonal neighbors is not exactly 2 — plus every declared entry parcel —
//! as a **crossing** (a graph vertex), then traces runs of plain paved
//! parcels between crossings into directed **road segments** (graph edges).
//! Off-grid **locations** become additional vertices joined to their entry
//! crossings by entrance and exit segments.
//!
//! The result is a directed pseudograph: parallel edges (the two directions
//! of every road, and the two ways around a closed loop) and self-loops
//! (isolated entry crossings) are both legal.
//!
//! # Data layout
//!
//! The graph is an arena.  Vertices are identified by [`VertexKey`] — value
//! identity derived from parcel coordinates or location id, so rebuilding the
//! graph after a topology edit yields vertices that compare equal to their
//! predecessors.  Edges and vertices are addressed by dense `u32` indexes;
//! trip routes hold [`NodeRef`] handles into this arena rather than owning
//! any node data.
//!
//! Mutable traffic state (queues, ETAs, occupants) deliberately lives
//! elsewhere (`gw-traffic`); this crate is topology only.

pub mod build;
pub mod config;
pub mod graph;
pub mod location;
pub mod router;

mod error;

#[cfg(test)]
mod tests;

pub use build::build_graph;
pub use config::TrafficConfig;
pub use error::{NetworkError, NetworkResult};
pub use graph::{EdgeIx, NodeRef, RoadGraph, RoadSegment, VertexIx, VertexKey};
pub use location::{Location, LocationRegistry};
pub use router::{DijkstraRouter, Route, Router};
