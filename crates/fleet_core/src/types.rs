//! Type definitions for `fleet_core`.
//!
//! The per-round world snapshot and its entities. Entities are never embedded
//! in controller state — they are resolved through the snapshot's typed
//! lookups every round, so a destroyed entity simply fails to resolve.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::DOCK_RADIUS;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! int_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub i32);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

int_id!(ShipId);
int_id!(PlanetId);
int_id!(PlayerId);

// ---------------------------------------------------------------------------
// Geometry primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Bearing from `self` to `other` in degrees, normalised to `[0, 360)`.
    pub fn angle_to(self, other: Self) -> f64 {
        (other.y - self.y)
            .atan2(other.x - self.x)
            .to_degrees()
            .rem_euclid(360.0)
    }

    /// Point `distance` away from `self` along `angle_degrees`.
    pub fn offset(self, angle_degrees: f64, distance: f64) -> Self {
        let radians = angle_degrees.to_radians();
        Self {
            x: self.x + distance * radians.cos(),
            y: self.y + distance * radians.sin(),
        }
    }
}

/// Anything with a location and a collision radius. Free-floating positions
/// participate with radius zero.
pub trait Entity {
    fn position(&self) -> Position;
    fn radius(&self) -> f64;
}

impl Entity for Position {
    fn position(&self) -> Position {
        *self
    }

    fn radius(&self) -> f64 {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Snapshot entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DockingStatus {
    Undocked,
    Docking,
    Docked,
    Undocking,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub id: ShipId,
    pub owner: PlayerId,
    pub position: Position,
    pub radius: f64,
    pub docking_status: DockingStatus,
    pub docked_planet: Option<PlanetId>,
}

impl Ship {
    pub fn is_docked(&self) -> bool {
        self.docking_status == DockingStatus::Docked
    }

    pub fn is_undocked(&self) -> bool {
        self.docking_status == DockingStatus::Undocked
    }
}

impl Entity for Ship {
    fn position(&self) -> Position {
        self.position
    }

    fn radius(&self) -> f64 {
        self.radius
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Planet {
    pub id: PlanetId,
    pub owner: Option<PlayerId>,
    pub position: Position,
    pub radius: f64,
    pub dock_spots: u32,
    pub docked_ships: SmallVec<[ShipId; 6]>,
}

impl Planet {
    pub fn is_owned(&self) -> bool {
        self.owner.is_some()
    }

    /// True when every docking spot is taken.
    pub fn is_full(&self) -> bool {
        self.docked_ships.len() as u32 >= self.dock_spots
    }
}

impl Entity for Planet {
    fn position(&self) -> Position {
        self.position
    }

    fn radius(&self) -> f64 {
        self.radius
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One referee frame: the complete observable world for a single round.
///
/// Vec order is the referee's emission order and is the deterministic
/// iteration order for every downstream component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub my_id: PlayerId,
    pub width: f64,
    pub height: f64,
    pub planets: Vec<Planet>,
    pub ships: Vec<Ship>,
}

impl GameSnapshot {
    /// Typed planet lookup; `None` means the planet no longer exists.
    pub fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.iter().find(|p| p.id == id)
    }

    /// Typed ship lookup; `None` means the ship was destroyed.
    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.iter().find(|s| s.id == id)
    }

    /// True when `ship` is close enough to begin docking at `planet`.
    pub fn can_dock(&self, ship: &Ship, planet: &Planet) -> bool {
        ship.position.distance_to(planet.position) <= ship.radius + planet.radius + DOCK_RADIUS
    }

    /// True when `planet` belongs to an opposing player.
    pub fn is_enemy_planet(&self, planet: &Planet) -> bool {
        planet.owner.is_some_and(|owner| owner != self.my_id)
    }
}

// ---------------------------------------------------------------------------
// Output intents
// ---------------------------------------------------------------------------

/// One per-unit command submitted to the referee at the end of a round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    Dock {
        ship: ShipId,
        planet: PlanetId,
    },
    Move {
        ship: ShipId,
        destination: Position,
        speed: f64,
    },
}

impl Intent {
    pub fn ship(&self) -> ShipId {
        match self {
            Self::Dock { ship, .. } | Self::Move { ship, .. } => *ship,
        }
    }
}
