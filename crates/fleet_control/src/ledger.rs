//! Target-lock ledger: per-planet colonization commitments.

use ahash::AHashMap;
use fleet_core::{PlanetId, ShipId};

/// Planet id → number of units currently committed to colonizing it.
///
/// A soft demand counter, not a capacity cap: it informs assignment but never
/// forbids redundant targeting, so the assignment engine still checks planet
/// fullness and ownership itself. The invariant maintained here is that the
/// sum of all counts equals the number of units holding a colonization lock.
#[derive(Debug, Default)]
pub struct TargetLedger {
    counts: AHashMap<PlanetId, u32>,
    held: AHashMap<ShipId, PlanetId>,
}

impl TargetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `ship`'s commitment to `planet`. A different lock already held
    /// by the same ship is released first; re-locking the same planet is a
    /// no-op.
    pub fn lock(&mut self, ship: ShipId, planet: PlanetId) {
        if self.held.get(&ship) == Some(&planet) {
            return;
        }
        self.release(ship);
        *self.counts.entry(planet).or_insert(0) += 1;
        self.held.insert(ship, planet);
    }

    /// Drop `ship`'s commitment, if it holds one. Counts never go below zero.
    pub fn release(&mut self, ship: ShipId) {
        if let Some(planet) = self.held.remove(&ship) {
            if let Some(count) = self.counts.get_mut(&planet) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.counts.remove(&planet);
                }
            }
        }
    }

    /// Units currently committed to `planet`.
    pub fn commitments(&self, planet: PlanetId) -> u32 {
        self.counts.get(&planet).copied().unwrap_or(0)
    }

    /// Sum of all commitments across planets.
    pub fn total_commitments(&self) -> u32 {
        self.counts.values().sum()
    }

    /// The planet `ship` is committed to, if any.
    pub fn held_target(&self, ship: ShipId) -> Option<PlanetId> {
        self.held.get(&ship).copied()
    }
}
