//! Geometric heuristics feeding the task-assignment engine.
//!
//! Everything here is pure and bounded: the nearest-neighbor search widens
//! its radius a fixed number of times and then gives up, so a round's
//! geometry cost never depends on how empty the neighborhood is.

use crate::constants::{AVOID_PROBE_DISTANCE, SWARM_ANGULAR_SPEED, SWARM_MARGIN};
use crate::{Entity, Position, Ship};

/// Nearest candidate strictly closer than `max_radius`, skipping any for
/// which `excluded` returns true.
///
/// When a pass finds nothing the radius doubles and the scan repeats, at most
/// `max_retries` more times (radius sequence r, 2r, 4r, 8r for the default
/// budget of 3). Returns `None` once the retry budget is exhausted.
pub fn closest<'a, E: Entity>(
    origin: Position,
    candidates: &[&'a E],
    excluded: impl Fn(&E) -> bool,
    max_radius: f64,
    max_retries: u32,
) -> Option<&'a E> {
    let mut radius = max_radius;
    for _ in 0..=max_retries {
        let mut best: Option<(&'a E, f64)> = None;
        for &candidate in candidates {
            if excluded(candidate) {
                continue;
            }
            let distance = origin.distance_to(candidate.position());
            if distance < radius && best.is_none_or(|(_, d)| distance < d) {
                best = Some((candidate, distance));
            }
        }
        if let Some((found, _)) = best {
            return Some(found);
        }
        radius *= 2.0;
    }
    None
}

/// Entities ordered ascending by distance to `origin`.
///
/// Ties keep the input order (stable sort); no further tie-break is defined.
pub fn by_distance<'a, E: Entity>(origin: Position, entities: &[&'a E]) -> Vec<&'a E> {
    let mut sorted = entities.to_vec();
    sorted.sort_by(|a, b| {
        origin
            .distance_to(a.position())
            .total_cmp(&origin.distance_to(b.position()))
    });
    sorted
}

/// Deconfliction probe: a short destination directly away from the rest of
/// the fleet, used to scatter freshly spawned units before they commit to a
/// role. `ship` itself is skipped if present in `others`.
pub fn avoid_vector(ship: &Ship, others: &[&Ship]) -> Position {
    let mut dx = 0.0;
    let mut dy = 0.0;
    for other in others {
        if other.id == ship.id {
            continue;
        }
        dx += other.position.x - ship.position.x;
        dy += other.position.y - ship.position.y;
    }
    let heading = (dy.atan2(dx).to_degrees() + 180.0).rem_euclid(360.0);
    ship.position.offset(heading, AVOID_PROBE_DISTANCE)
}

/// Orbit point on the circle of radius `target.radius + SWARM_MARGIN`, at an
/// angle determined by the unit's slot and the current round.
///
/// Distinct `slot_index` values split the ring into `360 / swarm_size`-degree
/// sectors, so a swarm converges on angularly distinct approach points; the
/// whole ring rotates `SWARM_ANGULAR_SPEED` degrees per round.
pub fn swarm_point<E: Entity>(
    target: &E,
    swarm_size: u32,
    slot_index: i32,
    turn_offset: u64,
) -> Position {
    let slot_angle = (360.0 / f64::from(swarm_size)) * f64::from(slot_index);
    let spin = (turn_offset as f64 * SWARM_ANGULAR_SPEED).rem_euclid(360.0);
    target
        .position()
        .offset(slot_angle + spin, target.radius() + SWARM_MARGIN)
}

/// Standard approach point: `min_distance` outside the target's surface, on
/// the axis back toward `origin`.
pub fn closest_point_to<E: Entity>(origin: Position, target: &E, min_distance: f64) -> Position {
    let angle = target.position().angle_to(origin);
    target
        .position()
        .offset(angle, target.radius() + min_distance)
}

/// Corner-rat destination: the nearest map corner, inset by the ship radius
/// on both axes.
pub fn nearest_corner(ship: &Ship, width: f64, height: f64) -> Position {
    let x = if ship.position.x < width - ship.position.x {
        ship.radius
    } else {
        width - ship.radius
    };
    let y = if ship.position.y < height - ship.position.y {
        ship.radius
    } else {
        height - ship.radius
    };
    Position::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_SEARCH_RADIUS, SEARCH_RETRIES, SWARM_SIZE};
    use crate::test_fixtures::ship;

    fn positions(coords: &[(f64, f64)]) -> Vec<Position> {
        coords.iter().map(|&(x, y)| Position::new(x, y)).collect()
    }

    #[test]
    fn closest_returns_nearest_candidate() {
        let origin = Position::new(0.0, 0.0);
        let candidates = positions(&[(10.0, 0.0), (4.0, 0.0), (7.0, 0.0)]);
        let refs: Vec<&Position> = candidates.iter().collect();

        let found = closest(origin, &refs, |_| false, DEFAULT_SEARCH_RADIUS, SEARCH_RETRIES);
        assert!((found.unwrap().x - 4.0).abs() < 1e-9);
    }

    #[test]
    fn closest_skips_excluded_candidates() {
        let origin = Position::new(0.0, 0.0);
        let candidates = positions(&[(4.0, 0.0), (7.0, 0.0)]);
        let refs: Vec<&Position> = candidates.iter().collect();

        let found = closest(
            origin,
            &refs,
            |p| (p.x - 4.0).abs() < 1e-9,
            DEFAULT_SEARCH_RADIUS,
            SEARCH_RETRIES,
        );
        assert!((found.unwrap().x - 7.0).abs() < 1e-9);
    }

    #[test]
    fn closest_widens_radius_up_to_retry_budget() {
        let origin = Position::new(0.0, 0.0);
        // Reachable only on the fourth pass: 15 → 30 → 60 → 120.
        let candidates = positions(&[(119.0, 0.0)]);
        let refs: Vec<&Position> = candidates.iter().collect();
        assert!(closest(origin, &refs, |_| false, 15.0, 3).is_some());

        // Strictly-closer-than comparison: 120.0 is outside the final pass.
        let candidates = positions(&[(120.0, 0.0)]);
        let refs: Vec<&Position> = candidates.iter().collect();
        assert!(closest(origin, &refs, |_| false, 15.0, 3).is_none());
    }

    #[test]
    fn closest_terminates_on_empty_candidate_set() {
        let refs: Vec<&Position> = Vec::new();
        assert!(closest(Position::new(0.0, 0.0), &refs, |_| false, 15.0, 3).is_none());
    }

    #[test]
    fn by_distance_sorts_ascending_and_keeps_tie_order() {
        let origin = Position::new(0.0, 0.0);
        let candidates = positions(&[(5.0, 0.0), (-3.0, 0.0), (3.0, 0.0), (1.0, 0.0)]);
        let refs: Vec<&Position> = candidates.iter().collect();

        let sorted = by_distance(origin, &refs);
        assert!((sorted[0].x - 1.0).abs() < 1e-9);
        // (-3, 0) and (3, 0) tie at distance 3; input order wins.
        assert!((sorted[1].x + 3.0).abs() < 1e-9);
        assert!((sorted[2].x - 3.0).abs() < 1e-9);
        assert!((sorted[3].x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn avoid_vector_points_away_from_fleet() {
        let me = ship(1, 0, 10.0, 10.0);
        let east = ship(2, 0, 20.0, 10.0);
        let others = vec![&me, &east];

        let probe = avoid_vector(&me, &others);
        // Fleet mass is due east, so the probe lands due west.
        assert!((probe.x - (10.0 - AVOID_PROBE_DISTANCE)).abs() < 1e-6);
        assert!((probe.y - 10.0).abs() < 1e-6);
    }

    #[test]
    fn swarm_slots_stay_at_least_a_sector_apart() {
        let target = ship(9, 1, 50.0, 50.0);
        let center = target.position;
        let angles: Vec<f64> = (0..3)
            .map(|slot| center.angle_to(swarm_point(&target, SWARM_SIZE, slot, 17)))
            .collect();

        for i in 0..3 {
            for j in (i + 1)..3 {
                let gap = (angles[i] - angles[j]).rem_euclid(360.0);
                let gap = gap.min(360.0 - gap);
                assert!(
                    gap >= 120.0 - 1e-6,
                    "slots {i} and {j} are only {gap:.2} degrees apart"
                );
            }
        }
    }

    #[test]
    fn closest_point_to_sits_outside_the_surface() {
        let target = ship(3, 1, 10.0, 0.0);
        let origin = Position::new(0.0, 0.0);

        let point = closest_point_to(origin, &target, 3.0);
        let expected = target.radius + 3.0;
        assert!((target.position.distance_to(point) - expected).abs() < 1e-9);
        // On the axis back toward the origin.
        assert!(point.x < target.position.x);
        assert!(point.y.abs() < 1e-9);
    }

    #[test]
    fn nearest_corner_picks_the_closest_edges() {
        let s = ship(1, 0, 10.0, 90.0);
        let corner = nearest_corner(&s, 240.0, 160.0);
        assert!((corner.x - s.radius).abs() < 1e-9);
        assert!((corner.y - (160.0 - s.radius)).abs() < 1e-9);
    }
}
