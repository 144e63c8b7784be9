//! `gw-traffic` — trip entities and the admission/flow protocol.
//!
//! `gw-network` is pure topology; this crate is everything that moves.
//!
//! # The admission protocol
//!
//! Every vertex and edge of the graph answers two operations:
//!
//! - **take**: a queue of drives is offered for admission.  The node admits
//!   what its capacity allows and returns the rest untouched, in offered
//!   order.  Admission never mutates a rejected drive.
//! - **flow**: the node advances its internally queued drives whose
//!   estimated departure is due, offering each to the next element of its
//!   route via that element's `take`.  Rejected drives simply stay queued.
//!
//! Road segments enforce a spacing-based capacity bound and freeze a
//! car-following travel estimate at admission.  Crossings have no capacity
//! and forward within the same `take` call.  Locations absorb drives that
//! arrive at their destination and retry queued departures each tick.
//!
//! All node state lives in [`TrafficEngine`], parallel to the graph's arenas;
//! drives themselves live in the [`DriveStore`] and are referenced by id, so
//! a drive occupies exactly one queue at any simulated instant.

pub mod drive;
pub mod engine;
pub mod resident;

mod error;


pub use drive::{DEFAULT_DROP_SECS, Disposition, Drive, DriveStore, TripPlan};
pub use engine::{Eta, FlowCtx, TrafficEngine};
pub use error::{TrafficError, TrafficResult};
pub use resident::{Resident, ResidentRoster};
