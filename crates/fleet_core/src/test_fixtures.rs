//! Shared test fixtures for fleet_core and downstream crates.
//!
//! Entity builders plus `base_snapshot()`, a small two-player frame suitable
//! for classifier and controller tests. Downstream crates enable these via
//! the `test-support` feature.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use smallvec::SmallVec;

use crate::constants::SHIP_RADIUS;
use crate::{
    DockingStatus, GameSnapshot, Planet, PlanetId, PlayerId, Position, Ship, ShipId,
};

pub fn ship(id: i32, owner: i32, x: f64, y: f64) -> Ship {
    Ship {
        id: ShipId(id),
        owner: PlayerId(owner),
        position: Position::new(x, y),
        radius: SHIP_RADIUS,
        docking_status: DockingStatus::Undocked,
        docked_planet: None,
    }
}

pub fn docked_ship(id: i32, owner: i32, x: f64, y: f64, planet: i32) -> Ship {
    Ship {
        docking_status: DockingStatus::Docked,
        docked_planet: Some(PlanetId(planet)),
        ..ship(id, owner, x, y)
    }
}

pub fn planet(id: i32, x: f64, y: f64, radius: f64, dock_spots: u32) -> Planet {
    Planet {
        id: PlanetId(id),
        owner: None,
        position: Position::new(x, y),
        radius,
        dock_spots,
        docked_ships: SmallVec::new(),
    }
}

pub fn owned_planet(id: i32, owner: i32, x: f64, y: f64, radius: f64, dock_spots: u32) -> Planet {
    Planet {
        owner: Some(PlayerId(owner)),
        ..planet(id, x, y, radius, dock_spots)
    }
}

/// Two players on a 240×160 map: one unowned planet mid-field, one ship each.
pub fn base_snapshot() -> GameSnapshot {
    GameSnapshot {
        my_id: PlayerId(0),
        width: 240.0,
        height: 160.0,
        planets: vec![planet(1, 120.0, 80.0, 6.0, 3)],
        ships: vec![ship(1, 0, 30.0, 80.0), ship(100, 1, 210.0, 80.0)],
    }
}

/// Deterministic RNG seeded with 42.
pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}
