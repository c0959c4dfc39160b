//! Per-ship persistent controller records.

use ahash::AHashSet;
use fleet_core::{PlanetId, ShipId};
use serde::{Deserialize, Serialize};

use crate::TargetLedger;

/// Behavioral role of a unit. Closed set — the dispatcher matches
/// exhaustively, so a new task cannot silently do nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Task {
    #[default]
    Uninitialized,
    StayDocked,
    AvoidDanger,
    ColonizePlanet,
    Hunter,
    Defender,
    Fighter,
    OffensiveSwarm,
    CornerRat,
}

/// Explicitly tagged target reference, resolved through the snapshot's typed
/// lookups each round. Entities are never stored here, so a destroyed target
/// is just a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Planet(PlanetId),
    Ship(ShipId),
}

/// Controller state attached to one owned mobile entity. Survives across
/// rounds; dropped the round its ship is discovered dead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub ship_id: ShipId,
    pub task: Task,
    pub target: Option<Target>,
    /// Rounds since creation; 0 until the unit's first execution pass.
    pub age: u64,
}

impl Unit {
    pub fn new(ship_id: ShipId) -> Self {
        Self {
            ship_id,
            task: Task::Uninitialized,
            target: None,
            age: 0,
        }
    }
}

/// All live units, in insertion order of first appearance. That order is the
/// assignment engine's evaluation order; no other ordering is guaranteed.
#[derive(Debug, Default)]
pub struct UnitRegistry {
    units: Vec<Unit>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile against the round's live fleet: drop units whose ship is
    /// gone (releasing any colonization lock they held) and create fresh
    /// `Uninitialized` units for ships seen for the first time.
    pub fn reconcile(&mut self, live: &[ShipId], ledger: &mut TargetLedger) {
        let alive: AHashSet<ShipId> = live.iter().copied().collect();
        self.units.retain(|unit| {
            if alive.contains(&unit.ship_id) {
                true
            } else {
                ledger.release(unit.ship_id);
                false
            }
        });
        for &ship_id in live {
            if !self.contains(ship_id) {
                self.units.push(Unit::new(ship_id));
            }
        }
    }

    /// Append a pre-built unit, keeping the one-unit-per-ship invariant.
    /// Duplicate ship ids are ignored. Used to assemble drill scenarios.
    pub fn insert(&mut self, unit: Unit) {
        if !self.contains(unit.ship_id) {
            self.units.push(unit);
        }
    }

    pub fn contains(&self, ship_id: ShipId) -> bool {
        self.units.iter().any(|unit| unit.ship_id == ship_id)
    }

    pub fn get(&self, ship_id: ShipId) -> Option<&Unit> {
        self.units.iter().find(|unit| unit.ship_id == ship_id)
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub(crate) fn units_mut(&mut self) -> &mut [Unit] {
        &mut self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
