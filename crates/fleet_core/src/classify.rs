//! World snapshot classifier.

use ahash::AHashSet;

use crate::{GameSnapshot, Planet, PlanetId, Ship};

/// Semantic partition of one round's entities, consumed read-only by the
/// assignment engine and the dispatcher.
///
/// Recomputed from scratch every round and never cached — the borrowed
/// entities die with the snapshot they came from. All Vecs preserve snapshot
/// order, which downstream components rely on for determinism.
#[derive(Debug)]
pub struct WorldView<'a> {
    pub owned_planets: Vec<&'a Planet>,
    pub enemy_planets: Vec<&'a Planet>,
    pub unowned_planets: Vec<&'a Planet>,
    /// Planets with every docking spot taken, regardless of owner.
    pub full_planets: AHashSet<PlanetId>,
    pub my_ships: Vec<&'a Ship>,
    pub enemy_ships: Vec<&'a Ship>,
}

impl<'a> WorldView<'a> {
    pub fn classify(snapshot: &'a GameSnapshot) -> Self {
        let mut view = Self {
            owned_planets: Vec::new(),
            enemy_planets: Vec::new(),
            unowned_planets: Vec::new(),
            full_planets: AHashSet::new(),
            my_ships: Vec::new(),
            enemy_ships: Vec::new(),
        };

        for planet in &snapshot.planets {
            match planet.owner {
                Some(owner) if owner == snapshot.my_id => view.owned_planets.push(planet),
                Some(_) => view.enemy_planets.push(planet),
                None => view.unowned_planets.push(planet),
            }
            if planet.is_full() {
                view.full_planets.insert(planet.id);
            }
        }

        for ship in &snapshot.ships {
            if ship.owner == snapshot.my_id {
                view.my_ships.push(ship);
            } else {
                view.enemy_ships.push(ship);
            }
        }

        view
    }
}
