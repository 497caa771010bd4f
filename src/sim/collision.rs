//! Collision detection and response
//!
//! Ship vs obstacle uses axis-aligned boxes; ship vs pickup uses a circular
//! collection radius. Obstacles are never removed by a hit, only the ship is
//! penalized.

use glam::Vec2;

use super::state::{EnergyPickup, GameEvent, GameSession, Obstacle, Ship};
use crate::consts::*;

/// Axis-aligned box given by center and half extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half: size * 0.5,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    /// Standard overlap test (touching edges do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x && a_max.x > b_min.x && a_min.y < b_max.y && a_max.y > b_min.y
    }
}

/// Ship collision box (40x40 centered on the ship)
#[inline]
pub fn ship_box(ship: &Ship) -> Aabb {
    Aabb {
        center: ship.pos,
        half: Vec2::splat(SHIP_HALF_EXTENT),
    }
}

/// Check if the ship's box overlaps an obstacle
pub fn ship_obstacle_collision(ship: &Ship, obstacle: &Obstacle) -> bool {
    ship_box(ship).overlaps(&Aabb::new(obstacle.pos, obstacle.size))
}

/// Check if a pickup is inside the ship's collection radius
pub fn ship_pickup_collision(ship: &Ship, pickup: &EnergyPickup) -> bool {
    ship.pos.distance(pickup.pos) < COLLECTION_RADIUS
}

/// What a resolve pass did to the session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Obstacle that damaged the ship, if any
    pub hit: Option<u32>,
    /// Collected pickup IDs, in spawn order
    pub collected: Vec<u32>,
    /// Points awarded by collections
    pub points: u64,
}

/// Resolve all ship collisions: obstacles first, then pickups
pub fn resolve(session: &mut GameSession) -> CollisionReport {
    let mut report = CollisionReport::default();

    for obstacle in &session.obstacles {
        if session.ship.invincible {
            break;
        }
        if ship_obstacle_collision(&session.ship, obstacle) {
            session.ship.drain_energy(OBSTACLE_DAMAGE);
            session.ship.activate_invincibility(INVINCIBILITY_DURATION);
            session.events.push(GameEvent::Hit {
                obstacle_id: obstacle.id,
            });
            log::debug!(
                "Ship hit obstacle {} (energy {:.1})",
                obstacle.id,
                session.ship.energy
            );
            report.hit = Some(obstacle.id);
        }
    }

    let ship = &mut session.ship;
    let events = &mut session.events;
    session.pickups.retain(|pickup| {
        if !ship_pickup_collision(ship, pickup) {
            return true;
        }
        ship.add_energy(pickup.value as f32);
        report.points += u64::from(pickup.value);
        report.collected.push(pickup.id);
        events.push(GameEvent::Collected {
            pickup_id: pickup.id,
            value: pickup.value,
        });
        false
    });
    session.score += report.points;

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Difficulty, Level, LevelType};

    fn session() -> GameSession {
        GameSession::new(Level::new(LevelType::Hourglass, Difficulty::Normal), 1)
    }

    fn obstacle_at(id: u32, pos: Vec2) -> Obstacle {
        Obstacle {
            id,
            pos,
            size: Vec2::splat(OBSTACLE_SIZE),
            vel: Vec2::new(OBSTACLE_SPEED, 0.0),
        }
    }

    fn pickup_at(id: u32, pos: Vec2) -> EnergyPickup {
        EnergyPickup {
            id,
            pos,
            vel: Vec2::new(PICKUP_SPEED, 0.0),
            value: PICKUP_VALUE,
        }
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::new(Vec2::ZERO, Vec2::splat(40.0));
        assert!(a.overlaps(&Aabb::new(Vec2::new(39.0, 0.0), Vec2::splat(40.0))));
        // Edges touching
        assert!(!a.overlaps(&Aabb::new(Vec2::new(40.0, 0.0), Vec2::splat(40.0))));
        assert!(!a.overlaps(&Aabb::new(Vec2::new(0.0, 60.0), Vec2::splat(40.0))));
    }

    #[test]
    fn test_pickup_radius() {
        let ship = Ship::default();
        assert!(ship_pickup_collision(&ship, &pickup_at(1, ship.pos + Vec2::new(29.0, 0.0))));
        assert!(!ship_pickup_collision(&ship, &pickup_at(1, ship.pos + Vec2::new(30.0, 0.0))));
        assert!(!ship_pickup_collision(&ship, &pickup_at(1, ship.pos + Vec2::new(25.0, 25.0))));
    }

    #[test]
    fn test_hit_drains_and_grants_invincibility() {
        let mut s = session();
        let pos = s.ship.pos;
        s.obstacles.push(obstacle_at(1, pos));
        s.obstacles.push(obstacle_at(2, pos + Vec2::new(5.0, 0.0)));

        let report = resolve(&mut s);
        assert_eq!(report.hit, Some(1));
        assert_eq!(s.ship.energy, SHIP_MAX_ENERGY - OBSTACLE_DAMAGE);
        assert!(s.ship.invincible);
        // Obstacles persist after a hit
        assert_eq!(s.obstacles.len(), 2);
        assert_eq!(s.events, vec![GameEvent::Hit { obstacle_id: 1 }]);
    }

    #[test]
    fn test_invincible_ship_ignores_overlap() {
        let mut s = session();
        let pos = s.ship.pos;
        s.obstacles.push(obstacle_at(1, pos));
        resolve(&mut s);
        let energy = s.ship.energy;
        let remaining = s.ship.invincibility_remaining;

        let report = resolve(&mut s);
        assert_eq!(report.hit, None);
        assert_eq!(s.ship.energy, energy);
        assert_eq!(s.ship.invincibility_remaining, remaining);
    }

    #[test]
    fn test_collect_pickup() {
        let mut s = session();
        s.ship.energy = 50.0;
        let pos = s.ship.pos;
        s.pickups.push(pickup_at(3, pos + Vec2::new(10.0, 0.0)));
        s.pickups.push(pickup_at(4, pos + Vec2::new(200.0, 0.0)));

        let report = resolve(&mut s);
        assert_eq!(report.collected, vec![3]);
        assert_eq!(report.points, u64::from(PICKUP_VALUE));
        assert_eq!(s.score, u64::from(PICKUP_VALUE));
        assert_eq!(s.ship.energy, 50.0 + PICKUP_VALUE as f32);
        assert_eq!(s.pickups.len(), 1);
        assert_eq!(s.pickups[0].id, 4);
    }

    #[test]
    fn test_pickup_collected_once() {
        let mut s = session();
        let pos = s.ship.pos;
        let pickup = pickup_at(5, pos);
        s.pickups.push(pickup.clone());
        resolve(&mut s);
        let score = s.score;

        // Stale copy of the same pickup is not in the active set anymore
        let report = resolve(&mut s);
        assert!(report.collected.is_empty());
        assert_eq!(s.score, score);
        assert!(!s.pickups.iter().any(|p| p.id == pickup.id));
    }

    #[test]
    fn test_collection_energy_clamped() {
        let mut s = session();
        let pos = s.ship.pos;
        s.pickups.push(pickup_at(1, pos));
        resolve(&mut s);
        assert_eq!(s.ship.energy, s.ship.max_energy);
        // Points still awarded at full energy
        assert_eq!(s.score, u64::from(PICKUP_VALUE));
    }
}
