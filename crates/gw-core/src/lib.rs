//! `gw-core` — foundational types for the gridway traffic simulation.
//!
//! This crate is a dependency of every other `gw-*` crate.  It intentionally
//! has no `gw-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                         |
//! |-------------|--------------------------------------------------|
//! | [`ids`]     | `LocationId`, `ResidentId`, `DriveId`            |
//! | [`time`]    | `Timestamp`, `SimClock`                          |
//! | [`rng`]     | `SimRng` (seedable, injectable)                  |
//! | [`error`]   | `CoreError`, `CoreResult`                        |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod error;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use ids::{DriveId, LocationId, ResidentId};
pub use rng::SimRng;
pub use time::{SimClock, Timestamp};
