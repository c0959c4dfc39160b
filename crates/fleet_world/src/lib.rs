//! Snapshot loading, validation, and drill-map generation shared between the
//! CLI and integration tests.

use std::path::Path;

use anyhow::{Context, Result};
use rand::Rng;
use smallvec::SmallVec;

use fleet_core::constants::SHIP_RADIUS;
use fleet_core::{
    DockingStatus, GameSnapshot, Intent, Planet, PlanetId, PlayerId, Position, Ship, ShipId,
};

const MAP_WIDTH: f64 = 240.0;
const MAP_HEIGHT: f64 = 160.0;
const PLANET_COUNT: usize = 8;
const PLANET_EDGE_MARGIN: f64 = 20.0;
const PLANET_SEPARATION: f64 = 15.0;
const PLACEMENT_ATTEMPTS: usize = 200;
const SHIPS_PER_PLAYER: i32 = 3;

/// Load a single snapshot from a JSON file.
pub fn load_snapshot(path: &Path) -> Result<GameSnapshot> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot file: {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("parsing snapshot file: {}", path.display()))
}

/// Load a recorded game: a JSON array of per-round snapshots.
pub fn load_replay(path: &Path) -> Result<Vec<GameSnapshot>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading replay file: {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing replay file: {}", path.display()))
}

/// Validates a snapshot's referential integrity, panicking on any violation.
///
/// Catches authoring mistakes in hand-written scenario files: duplicate ids,
/// docked ships that don't exist, dock lists over capacity, entities outside
/// the map.
pub fn validate_snapshot(snapshot: &GameSnapshot) {
    let mut planet_ids = Vec::new();
    for planet in &snapshot.planets {
        assert!(
            !planet_ids.contains(&planet.id),
            "duplicate planet id '{}'",
            planet.id,
        );
        planet_ids.push(planet.id);

        assert!(
            planet.docked_ships.len() as u32 <= planet.dock_spots,
            "planet '{}' docks {} ships but has {} spots",
            planet.id,
            planet.docked_ships.len(),
            planet.dock_spots,
        );
        assert!(
            planet.docked_ships.is_empty() || planet.is_owned(),
            "planet '{}' has docked ships but no owner",
            planet.id,
        );
        assert!(
            in_bounds(planet.position, snapshot),
            "planet '{}' is outside the map",
            planet.id,
        );

        for &ship_id in &planet.docked_ships {
            let ship = snapshot
                .ship(ship_id)
                .unwrap_or_else(|| panic!("planet '{}' docks unknown ship '{ship_id}'", planet.id));
            assert!(
                ship.docked_planet == Some(planet.id),
                "ship '{}' is docked at planet '{}' but does not point back at it",
                ship_id,
                planet.id,
            );
            assert!(
                Some(ship.owner) == planet.owner,
                "ship '{}' docked at planet '{}' owned by another player",
                ship_id,
                planet.id,
            );
        }
    }

    let mut ship_ids = Vec::new();
    for ship in &snapshot.ships {
        assert!(
            !ship_ids.contains(&ship.id),
            "duplicate ship id '{}'",
            ship.id,
        );
        ship_ids.push(ship.id);
        assert!(
            in_bounds(ship.position, snapshot),
            "ship '{}' is outside the map",
            ship.id,
        );
    }
}

fn in_bounds(position: Position, snapshot: &GameSnapshot) -> bool {
    position.x >= 0.0
        && position.x <= snapshot.width
        && position.y >= 0.0
        && position.y <= snapshot.height
}

/// Procedural two-player drill map: a field of unowned planets plus the
/// standard three-ship starting column per player.
pub fn generate_map(rng: &mut impl Rng) -> GameSnapshot {
    let mut planets: Vec<Planet> = Vec::new();
    let mut attempts = 0;
    while planets.len() < PLANET_COUNT && attempts < PLACEMENT_ATTEMPTS {
        attempts += 1;
        let radius = rng.gen_range(4.0..8.0);
        let position = Position::new(
            rng.gen_range(PLANET_EDGE_MARGIN..MAP_WIDTH - PLANET_EDGE_MARGIN),
            rng.gen_range(PLANET_EDGE_MARGIN..MAP_HEIGHT - PLANET_EDGE_MARGIN),
        );
        let clear = planets.iter().all(|other| {
            position.distance_to(other.position) > radius + other.radius + PLANET_SEPARATION
        });
        if clear {
            planets.push(Planet {
                id: PlanetId(planets.len() as i32),
                owner: None,
                position,
                radius,
                dock_spots: rng.gen_range(2..=6),
                docked_ships: SmallVec::new(),
            });
        }
    }

    let mut ships = Vec::new();
    for player in 0..2 {
        let x = if player == 0 { 30.0 } else { MAP_WIDTH - 30.0 };
        for slot in 0..SHIPS_PER_PLAYER {
            ships.push(Ship {
                id: ShipId(player * SHIPS_PER_PLAYER + slot),
                owner: PlayerId(player),
                position: Position::new(x, MAP_HEIGHT / 2.0 + f64::from(slot - 1) * 5.0),
                radius: SHIP_RADIUS,
                docking_status: DockingStatus::Undocked,
                docked_planet: None,
            });
        }
    }

    GameSnapshot {
        my_id: PlayerId(0),
        width: MAP_WIDTH,
        height: MAP_HEIGHT,
        planets,
        ships,
    }
}

/// Minimal drill physics: straight-line motion and instant docking.
///
/// No combat, no collisions, no enemy behavior — just enough world response
/// for offline drills to exercise multi-round controller behavior. The real
/// referee is external.
pub fn advance_drill(snapshot: &mut GameSnapshot, intents: &[Intent]) {
    for intent in intents {
        match *intent {
            Intent::Move {
                ship,
                destination,
                speed,
            } => {
                if let Some(ship) = snapshot.ships.iter_mut().find(|s| s.id == ship) {
                    let distance = ship.position.distance_to(destination);
                    if distance > f64::EPSILON {
                        let angle = ship.position.angle_to(destination);
                        ship.position = ship.position.offset(angle, speed.min(distance));
                    }
                }
            }
            Intent::Dock { ship, planet } => {
                let Some(owner) = snapshot.ship(ship).map(|s| s.owner) else {
                    continue;
                };
                let accepted = {
                    let Some(planet_state) = snapshot.planets.iter_mut().find(|p| p.id == planet)
                    else {
                        continue;
                    };
                    if planet_state.is_full() || planet_state.owner.is_some_and(|o| o != owner) {
                        false
                    } else {
                        planet_state.owner = Some(owner);
                        planet_state.docked_ships.push(ship);
                        true
                    }
                };
                if accepted {
                    if let Some(ship_state) = snapshot.ships.iter_mut().find(|s| s.id == ship) {
                        ship_state.docking_status = DockingStatus::Docked;
                        ship_state.docked_planet = Some(planet);
                    }
                }
            }
        }
    }
}
