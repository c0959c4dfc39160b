//! Engine constants and controller tuning knobs.
//!
//! The first block mirrors the referee's physical constants; the rest are the
//! bot's own thresholds and probabilities, kept in one place so drills and
//! tests reference the same values the controller uses.

/// Maximum thrust speed per round.
pub const MAX_SPEED: f64 = 7.0;
/// Extra distance beyond the planet surface from which a ship may dock.
pub const DOCK_RADIUS: f64 = 4.0;
/// Collision radius of every mobile unit.
pub const SHIP_RADIUS: f64 = 0.5;

/// Initial radius for bounded nearest-neighbor searches.
pub const DEFAULT_SEARCH_RADIUS: f64 = 15.0;
/// Radius-doubling retries after the initial search pass.
pub const SEARCH_RETRIES: u32 = 3;
/// Initial radius when scanning for huntable docked enemies.
pub const HUNT_SCAN_RADIUS: f64 = 100.0;

/// An enemy ship inside this radius of an owned planet is a threat.
pub const THREAT_RADIUS: f64 = 20.0;
/// An owned ship inside this radius of a threatened planet may defend it.
pub const DEFENDER_CANDIDATE_RADIUS: f64 = 70.0;

/// Early hunters are only created before this round.
pub const EARLY_GAME_CUTOFF_ROUND: u64 = 50;
/// Lifetime cap on early-hunter assignments.
pub const EARLY_HUNTER_QUOTA: u32 = 2;
/// Early hunters require strictly more owned ships than this.
pub const EARLY_HUNTER_FLEET_FLOOR: usize = 3;

/// Chance that a freshly spawned unit looks for an immediate dock.
pub const BIRTH_DOCK_PROBABILITY: f64 = 0.5;
/// Per-round chance of a unit defecting to the map edge.
pub const CORNER_RAT_PROBABILITY: f64 = 0.08;

/// Orbit margin beyond the target's surface for swarm points.
pub const SWARM_MARGIN: f64 = 3.0;
/// Degrees the swarm ring rotates per round.
pub const SWARM_ANGULAR_SPEED: f64 = 20.0;
/// Angular slots on a swarm ring.
pub const SWARM_SIZE: u32 = 3;

/// Length of the deconfliction probe away from the fleet.
pub const AVOID_PROBE_DISTANCE: f64 = 10.0;
/// How far outside a target's surface the approach point sits.
pub const APPROACH_DISTANCE: f64 = 3.0;

/// Course-correction attempts granted to the external path planner.
pub const NAV_CORRECTIONS: u32 = 6;
/// Angular step (degrees) per planner correction attempt.
pub const NAV_ANGLE_STEP: f64 = 15.0;
