//! The per-round command center: rule-chain task assignment and execution.

use std::panic::{catch_unwind, AssertUnwindSafe};

use rand::Rng;
use smallvec::SmallVec;
use tracing::{debug, error};

use fleet_core::constants::{
    APPROACH_DISTANCE, BIRTH_DOCK_PROBABILITY, CORNER_RAT_PROBABILITY, DEFAULT_SEARCH_RADIUS,
    DEFENDER_CANDIDATE_RADIUS, EARLY_GAME_CUTOFF_ROUND, EARLY_HUNTER_FLEET_FLOOR,
    EARLY_HUNTER_QUOTA, HUNT_SCAN_RADIUS, MAX_SPEED, NAV_ANGLE_STEP, NAV_CORRECTIONS,
    SEARCH_RETRIES, SWARM_SIZE, THREAT_RADIUS,
};
use fleet_core::{geometry, GameSnapshot, Intent, PlanetId, Ship, ShipId, WorldView};

use crate::{Navigator, Target, TargetLedger, Task, Unit, UnitRegistry};

/// Enemy ships threatening one owned planet, in snapshot order.
type ThreatList = SmallVec<[ShipId; 4]>;

/// Read-only per-round inputs to the assignment rule chain.
struct AssignCtx<'a> {
    snapshot: &'a GameSnapshot,
    view: &'a WorldView<'a>,
    threats: &'a [(PlanetId, ThreatList)],
    round: u64,
}

/// Stateful per-turn decision engine for the whole fleet.
///
/// All cross-round state lives here: the registry, the ledger, the round
/// counter, and the monotonic early-hunter count. Nothing survives a process
/// restart; a fresh instance starts empty and repopulates as owned ships are
/// discovered.
#[derive(Debug, Default)]
pub struct CommandCenter {
    registry: UnitRegistry,
    ledger: TargetLedger,
    round: u64,
    /// Lifetime count of early-hunter assignments. Never decremented: once
    /// the quota is spent, no further early hunters are created regardless
    /// of later fleet state.
    early_hunters: u32,
}

impl CommandCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a controller from pre-existing state, for drills and
    /// scenario tests that need mid-game conditions.
    pub fn from_parts(
        registry: UnitRegistry,
        ledger: TargetLedger,
        round: u64,
        early_hunters: u32,
    ) -> Self {
        Self {
            registry,
            ledger,
            round,
            early_hunters,
        }
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn units(&self) -> &[Unit] {
        self.registry.units()
    }

    pub fn ledger(&self) -> &TargetLedger {
        &self.ledger
    }

    /// One full evaluation pass: classify, reconcile, assign, execute.
    ///
    /// Returns the ordered intent list for the round. Per-unit failures are
    /// contained — a panic while deciding or executing one unit is logged and
    /// the remaining units still produce their commands.
    pub fn plan_round(
        &mut self,
        snapshot: &GameSnapshot,
        navigator: &dyn Navigator,
        rng: &mut impl Rng,
    ) -> Vec<Intent> {
        self.round += 1;
        let view = WorldView::classify(snapshot);
        let live: Vec<ShipId> = view.my_ships.iter().map(|ship| ship.id).collect();
        self.registry.reconcile(&live, &mut self.ledger);
        self.assign_tasks(snapshot, &view, rng);
        self.execute_tasks(snapshot, &view, navigator)
    }

    fn assign_tasks(&mut self, snapshot: &GameSnapshot, view: &WorldView, rng: &mut impl Rng) {
        let threats = determine_threats(view);
        let ctx = AssignCtx {
            snapshot,
            view,
            threats: &threats,
            round: self.round,
        };
        let Self {
            registry,
            ledger,
            early_hunters,
            ..
        } = self;

        for unit in registry.units_mut() {
            // Reconciliation just ran, so the lookup only fails mid-round if
            // something upstream handed us an inconsistent snapshot.
            let Some(ship) = snapshot.ship(unit.ship_id) else {
                debug!(ship = %unit.ship_id, "unit ship missing from snapshot, skipping");
                continue;
            };
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                assign_unit(unit, ship, &ctx, ledger, early_hunters, rng);
            }));
            if outcome.is_err() {
                error!(ship = %ship.id, "assignment panicked, unit keeps its previous task");
            }
        }
    }

    fn execute_tasks(
        &mut self,
        snapshot: &GameSnapshot,
        view: &WorldView,
        navigator: &dyn Navigator,
    ) -> Vec<Intent> {
        let mut intents = Vec::new();
        let Self {
            registry,
            ledger,
            round,
            ..
        } = self;

        for unit in registry.units_mut() {
            let ship_id = unit.ship_id;
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                execute_unit(unit, ledger, *round, snapshot, view, navigator)
            }));
            match outcome {
                Ok(Some(intent)) => intents.push(intent),
                Ok(None) => {}
                Err(_) => {
                    error!(ship = %ship_id, "execution panicked, unit emits nothing this round");
                }
            }
        }
        intents
    }
}

// ---------------------------------------------------------------------------
// Assignment rule chain
// ---------------------------------------------------------------------------

/// Evaluate the priority-ordered rule chain for one unit. First matching rule
/// wins. Mutates only the unit's task/target and the ledger — never the
/// world.
fn assign_unit(
    unit: &mut Unit,
    ship: &Ship,
    ctx: &AssignCtx,
    ledger: &mut TargetLedger,
    early_hunters: &mut u32,
    rng: &mut impl Rng,
) {
    // 1. Terminal tasks keep their assignment.
    if unit.task == Task::StayDocked && ship.is_docked() {
        return;
    }
    if unit.task == Task::CornerRat {
        return;
    }

    // 2. Birth decision: half the spawns look for an immediate dock, the
    // rest scatter away from the fleet first.
    if unit.age == 0 {
        if rng.gen_bool(BIRTH_DOCK_PROBABILITY) {
            if let Some(planet) = birth_dock_candidate(ship, ctx) {
                commit_colonize(unit, ledger, planet);
                return;
            }
        }
        assign(unit, ledger, Task::AvoidDanger, None);
        return;
    }

    // 3. Forced expansion: landless fleets grab the nearest empty planet.
    if ctx.view.owned_planets.is_empty() && !ctx.view.unowned_planets.is_empty() {
        let nearest = geometry::by_distance(ship.position, &ctx.view.unowned_planets);
        if let Some(planet) = nearest.first() {
            commit_colonize(unit, ledger, planet.id);
            return;
        }
    }

    // 4. Early hunter quota, plus stickiness for existing hunters.
    let quota_open = *early_hunters < EARLY_HUNTER_QUOTA
        && ctx.view.my_ships.len() > EARLY_HUNTER_FLEET_FLOOR
        && ctx.round < EARLY_GAME_CUTOFF_ROUND;
    if quota_open || unit.task == Task::Hunter {
        if unit.task != Task::Hunter {
            *early_hunters += 1;
        }
        let target = docked_hunt_target(ship, ctx.view);
        assign(unit, ledger, Task::Hunter, target);
        return;
    }

    // 5. Defense: answer the first threatened planet this unit can reach.
    for (planet_id, threat) in ctx.threats {
        let Some(first_threat) = threat.first() else {
            continue;
        };
        let Some(planet) = ctx.snapshot.planet(*planet_id) else {
            continue;
        };
        if ship.position.distance_to(planet.position) <= DEFENDER_CANDIDATE_RADIUS {
            assign(unit, ledger, Task::Defender, Some(Target::Ship(*first_threat)));
            return;
        }
    }

    // 6. Colonizers in transit are not re-targeted.
    if unit.task == Task::ColonizePlanet {
        return;
    }

    // 7. Opportunistic expansion.
    if !ctx.view.unowned_planets.is_empty()
        && unit.task != Task::Hunter
        && unit.task != Task::Defender
    {
        let nearest = geometry::by_distance(ship.position, &ctx.view.unowned_planets);
        if let Some(planet) = nearest.first() {
            commit_colonize(unit, ledger, planet.id);
            return;
        }
    }

    // 8. Noise injection: occasionally abandon the line for a map corner.
    if rng.gen_bool(CORNER_RAT_PROBABILITY) {
        assign(unit, ledger, Task::CornerRat, None);
        return;
    }

    // 9. Offensive default while the enemy still holds planets.
    if !ctx.view.enemy_planets.is_empty() {
        let target = docked_hunt_target(ship, ctx.view);
        assign(unit, ledger, Task::Hunter, target);
        return;
    }

    // 10. Fallback: anything without a live target fights the nearest enemy.
    if !target_alive(ctx.snapshot, unit.target) || unit.task == Task::Uninitialized {
        let target = geometry::closest(
            ship.position,
            &ctx.view.enemy_ships,
            |_| false,
            DEFAULT_SEARCH_RADIUS,
            SEARCH_RETRIES,
        )
        .map(|enemy| Target::Ship(enemy.id));
        assign(unit, ledger, Task::Fighter, target);
    }
}

/// Set a non-colonization task, releasing any colonization lock the unit
/// held. Colonization goes through `commit_colonize` instead so the ledger
/// count always matches the number of colonizing units.
fn assign(unit: &mut Unit, ledger: &mut TargetLedger, task: Task, target: Option<Target>) {
    debug_assert!(task != Task::ColonizePlanet);
    ledger.release(unit.ship_id);
    unit.task = task;
    unit.target = target;
}

fn commit_colonize(unit: &mut Unit, ledger: &mut TargetLedger, planet: PlanetId) {
    ledger.lock(unit.ship_id, planet);
    unit.task = Task::ColonizePlanet;
    unit.target = Some(Target::Planet(planet));
}

/// First planet (snapshot order) a newborn could dock at right now.
fn birth_dock_candidate(ship: &Ship, ctx: &AssignCtx) -> Option<PlanetId> {
    ctx.snapshot
        .planets
        .iter()
        .find(|planet| {
            ctx.snapshot.can_dock(ship, planet)
                && !ctx.snapshot.is_enemy_planet(planet)
                && !planet.is_full()
        })
        .map(|planet| planet.id)
}

/// Nearest docked enemy ship within the hunt scan radius, if any. Hunters
/// keep their role even when this comes back empty.
fn docked_hunt_target(ship: &Ship, view: &WorldView) -> Option<Target> {
    let docked: Vec<&Ship> = view
        .enemy_ships
        .iter()
        .copied()
        .filter(|enemy| enemy.is_docked())
        .collect();
    geometry::closest(
        ship.position,
        &docked,
        |_| false,
        HUNT_SCAN_RADIUS,
        SEARCH_RETRIES,
    )
    .map(|enemy| Target::Ship(enemy.id))
}

/// Docked-preferred hunt target: docked enemies first, then anything enemy
/// within the same scan radius.
fn hunt_fallback_target(ship: &Ship, view: &WorldView) -> Option<Target> {
    docked_hunt_target(ship, view).or_else(|| {
        geometry::closest(
            ship.position,
            &view.enemy_ships,
            |_| false,
            HUNT_SCAN_RADIUS,
            SEARCH_RETRIES,
        )
        .map(|enemy| Target::Ship(enemy.id))
    })
}

fn target_alive(snapshot: &GameSnapshot, target: Option<Target>) -> bool {
    match target {
        None => false,
        Some(Target::Ship(id)) => snapshot.ship(id).is_some(),
        Some(Target::Planet(id)) => snapshot.planet(id).is_some(),
    }
}

/// Owned planets with at least one enemy inside the threat radius, paired
/// with the threatening ships in snapshot order.
fn determine_threats(view: &WorldView) -> Vec<(PlanetId, ThreatList)> {
    let mut threats = Vec::new();
    for planet in &view.owned_planets {
        let mut list = ThreatList::new();
        for enemy in &view.enemy_ships {
            if planet.position.distance_to(enemy.position) <= THREAT_RADIUS {
                list.push(enemy.id);
            }
        }
        if !list.is_empty() {
            threats.push((planet.id, list));
        }
    }
    threats
}

// ---------------------------------------------------------------------------
// Execution dispatcher
// ---------------------------------------------------------------------------

/// Map the unit's task to a concrete intent, hot-swapping the task when the
/// target's state has invalidated the plan. Hot-swaps persist into the next
/// round's evaluation.
fn execute_unit(
    unit: &mut Unit,
    ledger: &mut TargetLedger,
    round: u64,
    snapshot: &GameSnapshot,
    view: &WorldView,
    navigator: &dyn Navigator,
) -> Option<Intent> {
    unit.age += 1;
    let ship = snapshot.ship(unit.ship_id)?;

    match unit.task {
        Task::Uninitialized => None,
        Task::StayDocked => {
            if !ship.is_docked() {
                debug!(ship = %ship.id, "stay_docked unit is undocked, re-evaluated next round");
            }
            None
        }
        Task::AvoidDanger => {
            let probe = geometry::avoid_vector(ship, &view.my_ships);
            navigator.navigate(snapshot, ship, probe, MAX_SPEED, NAV_CORRECTIONS, NAV_ANGLE_STEP)
        }
        Task::ColonizePlanet => execute_colonize(unit, ledger, ship, snapshot, view, navigator),
        Task::Hunter | Task::Defender | Task::Fighter => {
            pursue_target(unit, ship, snapshot, navigator)
        }
        Task::OffensiveSwarm => execute_swarm(unit, ledger, ship, snapshot, view, navigator, round),
        Task::CornerRat => {
            let corner = geometry::nearest_corner(ship, snapshot.width, snapshot.height);
            navigator.navigate(snapshot, ship, corner, MAX_SPEED, NAV_CORRECTIONS, NAV_ANGLE_STEP)
        }
    }
}

fn execute_colonize(
    unit: &mut Unit,
    ledger: &mut TargetLedger,
    ship: &Ship,
    snapshot: &GameSnapshot,
    view: &WorldView,
    navigator: &dyn Navigator,
) -> Option<Intent> {
    let planet = match unit.target {
        Some(Target::Planet(id)) => snapshot.planet(id),
        _ => None,
    };
    let Some(planet) = planet else {
        // Stale target: hunt the nearest enemy instead, docked crews first.
        let target = hunt_fallback_target(ship, view);
        assign(unit, ledger, Task::Hunter, target);
        return pursue_target(unit, ship, snapshot, navigator);
    };

    if snapshot.can_dock(ship, planet) && !snapshot.is_enemy_planet(planet) && !planet.is_full() {
        ledger.release(unit.ship_id);
        unit.task = Task::StayDocked;
        return Some(Intent::Dock {
            ship: ship.id,
            planet: planet.id,
        });
    }

    if snapshot.is_enemy_planet(planet) {
        // The prize was taken mid-transit; keep closing in, but as a hunter.
        assign(unit, ledger, Task::Hunter, Some(Target::Planet(planet.id)));
        return pursue_target(unit, ship, snapshot, navigator);
    }

    let destination = geometry::closest_point_to(ship.position, planet, APPROACH_DISTANCE);
    navigator.navigate(
        snapshot,
        ship,
        destination,
        MAX_SPEED,
        NAV_CORRECTIONS,
        NAV_ANGLE_STEP,
    )
}

/// Hunter/defender/fighter movement: approach the target, whatever kind it
/// is. A target that no longer resolves means no intent this round.
fn pursue_target(
    unit: &Unit,
    ship: &Ship,
    snapshot: &GameSnapshot,
    navigator: &dyn Navigator,
) -> Option<Intent> {
    let destination = match unit.target? {
        Target::Ship(id) => {
            geometry::closest_point_to(ship.position, snapshot.ship(id)?, APPROACH_DISTANCE)
        }
        Target::Planet(id) => {
            geometry::closest_point_to(ship.position, snapshot.planet(id)?, APPROACH_DISTANCE)
        }
    };
    navigator.navigate(
        snapshot,
        ship,
        destination,
        MAX_SPEED,
        NAV_CORRECTIONS,
        NAV_ANGLE_STEP,
    )
}

fn execute_swarm(
    unit: &mut Unit,
    ledger: &mut TargetLedger,
    ship: &Ship,
    snapshot: &GameSnapshot,
    view: &WorldView,
    navigator: &dyn Navigator,
    round: u64,
) -> Option<Intent> {
    let planet = match unit.target {
        Some(Target::Planet(id)) => snapshot.planet(id),
        _ => None,
    };
    let planet = match planet {
        Some(planet) => planet,
        None => {
            // No target left; fall back to pressuring the first enemy planet.
            let substitute = view.enemy_planets.first().copied()?;
            unit.target = Some(Target::Planet(substitute.id));
            substitute
        }
    };

    if snapshot.can_dock(ship, planet) && !snapshot.is_enemy_planet(planet) && !planet.is_full() {
        ledger.release(unit.ship_id);
        unit.task = Task::StayDocked;
        return Some(Intent::Dock {
            ship: ship.id,
            planet: planet.id,
        });
    }

    let orbit = geometry::swarm_point(planet, SWARM_SIZE, unit.ship_id.0, round);
    navigator.navigate(snapshot, ship, orbit, MAX_SPEED, NAV_CORRECTIONS, NAV_ANGLE_STEP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_core::test_fixtures::{docked_ship, owned_planet, planet, ship};
    use fleet_core::{GameSnapshot, PlayerId};

    fn snapshot_with(planets: Vec<fleet_core::Planet>, ships: Vec<Ship>) -> GameSnapshot {
        GameSnapshot {
            my_id: PlayerId(0),
            width: 240.0,
            height: 160.0,
            planets,
            ships,
        }
    }

    #[test]
    fn threats_only_list_planets_with_nearby_enemies() {
        let snapshot = snapshot_with(
            vec![
                owned_planet(1, 0, 50.0, 50.0, 5.0, 3),
                owned_planet(2, 0, 200.0, 100.0, 5.0, 3),
            ],
            vec![ship(1, 0, 40.0, 50.0), ship(50, 1, 60.0, 50.0)],
        );
        let view = WorldView::classify(&snapshot);

        let threats = determine_threats(&view);
        assert_eq!(threats.len(), 1);
        assert_eq!(threats[0].0, PlanetId(1));
        assert_eq!(threats[0].1.as_slice(), &[ShipId(50)]);
    }

    #[test]
    fn docked_hunt_target_ignores_free_flying_enemies() {
        let snapshot = snapshot_with(
            vec![owned_planet(1, 1, 60.0, 50.0, 5.0, 3)],
            vec![
                ship(1, 0, 40.0, 50.0),
                ship(50, 1, 45.0, 50.0),
                docked_ship(51, 1, 60.0, 50.0, 1),
            ],
        );
        let view = WorldView::classify(&snapshot);
        let me = snapshot.ship(ShipId(1)).unwrap();

        // Ship 50 is closer but undocked; the docked 51 wins.
        assert_eq!(
            docked_hunt_target(me, &view),
            Some(Target::Ship(ShipId(51)))
        );
        // The docked-preferred fallback agrees while a docked enemy exists.
        assert_eq!(
            hunt_fallback_target(me, &view),
            Some(Target::Ship(ShipId(51)))
        );
    }

    #[test]
    fn assign_away_from_colonization_releases_the_lock() {
        let mut ledger = TargetLedger::new();
        let mut unit = Unit::new(ShipId(1));
        commit_colonize(&mut unit, &mut ledger, PlanetId(4));
        assert_eq!(ledger.total_commitments(), 1);

        assign(&mut unit, &mut ledger, Task::Hunter, None);
        assert_eq!(unit.task, Task::Hunter);
        assert_eq!(ledger.total_commitments(), 0);
    }

    #[test]
    fn target_alive_checks_the_right_lookup_table() {
        let snapshot = snapshot_with(vec![planet(7, 10.0, 10.0, 4.0, 2)], vec![]);
        assert!(target_alive(&snapshot, Some(Target::Planet(PlanetId(7)))));
        // Same raw id, wrong kind.
        assert!(!target_alive(&snapshot, Some(Target::Ship(ShipId(7)))));
        assert!(!target_alive(&snapshot, None));
    }
}
