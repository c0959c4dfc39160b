//! `fleet_control` — the stateful per-round decision engine.
//!
//! One [`CommandCenter`] instance owns all cross-round state: the unit
//! registry, the target-lock ledger, the round counter, and the early-hunter
//! quota. Each round it classifies the snapshot, reconciles units against the
//! live fleet, walks the priority rule chain once per unit, and dispatches
//! movement intents through the consumed [`Navigator`] contract. All state is
//! in-memory only and rebuilt empty at process start.

mod commander;
mod ledger;
mod navigate;
mod unit;

pub use commander::CommandCenter;
pub use ledger::TargetLedger;
pub use navigate::{DirectNavigator, Navigator};
pub use unit::{Target, Task, Unit, UnitRegistry};
