//! Consumed path-planner contract.

use fleet_core::{GameSnapshot, Intent, Position, Ship};

/// The external obstacle-aware course planner.
///
/// `None` means the planner found no clear path within its own correction
/// budget; the unit simply emits no command this round. Callers must never
/// treat it as an error.
pub trait Navigator {
    fn navigate(
        &self,
        snapshot: &GameSnapshot,
        ship: &Ship,
        destination: Position,
        speed: f64,
        correction_attempts: u32,
        angular_step: f64,
    ) -> Option<Intent>;
}

/// Straight-line planner for offline drills and tests. No obstacle model —
/// the production collision-resolving planner lives outside this crate.
#[derive(Debug, Default)]
pub struct DirectNavigator;

impl Navigator for DirectNavigator {
    fn navigate(
        &self,
        _snapshot: &GameSnapshot,
        ship: &Ship,
        destination: Position,
        speed: f64,
        _correction_attempts: u32,
        _angular_step: f64,
    ) -> Option<Intent> {
        let distance = ship.position.distance_to(destination);
        if distance <= f64::EPSILON {
            return None;
        }
        Some(Intent::Move {
            ship: ship.id,
            destination,
            speed: speed.min(distance),
        })
    }
}
