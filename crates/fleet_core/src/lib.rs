//! `fleet_core` — snapshot data model and geometric heuristics.
//!
//! No IO, no persisted state. Everything here is a pure function of the
//! current round's snapshot; the stateful controller lives in `fleet_control`.

mod classify;
pub mod constants;
pub mod geometry;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use classify::WorldView;
pub use types::*;
