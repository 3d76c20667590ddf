//! CPU steering
//!
//! Each CPU body chases its nearest neighbour, aiming at a point pushed off
//! the wall that neighbour is closest to. It also kicks itself away from
//! walls it gets too close to. The decision is a pure function of the
//! current bodies and arena; nothing is remembered between ticks.

use super::arena::Arena;
use super::entity::Entity;
use super::input::braked_force;
use crate::Vector2;
use crate::tuning::Tuning;

/// What a CPU body wants to do this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuDecision {
    /// Unit thrust direction (zero when there is nobody to chase)
    pub thrust: Vector2,
    /// Fixed-magnitude push toward the arena interior (zero away from walls)
    pub avoidance: Vector2,
    /// Wall braking factor for this tick
    pub braking: f64,
}

impl CpuDecision {
    /// Total force to apply, with counter-thrust braking on opposing axes
    pub fn force(&self, vel: Vector2, tuning: &Tuning) -> Vector2 {
        let thrust = if self.thrust.length_squared() > 0.0 {
            braked_force(
                self.thrust,
                tuning.cpu_thrust_force,
                vel,
                tuning.braking_constant,
                self.braking,
            )
        } else {
            Vector2::ZERO
        };
        thrust + self.avoidance
    }
}

/// Index of the body closest to `entities[me]`, excluding itself
pub fn nearest_other(me: usize, entities: &[Entity]) -> Option<usize> {
    let origin = entities[me].pos;
    entities
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != me)
        .map(|(i, e)| (i, (e.pos - origin).length_squared()))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
}

/// Point the CPU steers toward when hunting a body at `prey`.
///
/// The target is shifted `offset` units inward from the wall nearest the
/// prey. Near corners this can land outside the arena; it is not clamped.
pub fn herd_target(prey: Vector2, arena: &Arena, offset: f64) -> Vector2 {
    let (edge, _) = arena.nearest_edge(prey);
    prey + edge.inward() * offset
}

/// Push toward the interior on each axis within `margin` of a wall
pub fn wall_avoidance(pos: Vector2, arena: &Arena, margin: f64, force: f64) -> Vector2 {
    let mut dir = Vector2::ZERO;
    if pos.x < margin {
        dir.x = 1.0;
    } else if pos.x > arena.width - margin {
        dir.x = -1.0;
    }
    if pos.y < margin {
        dir.y = 1.0;
    } else if pos.y > arena.height - margin {
        dir.y = -1.0;
    }
    dir.normalize_or_zero() * force
}

/// Decide thrust, avoidance and braking for `entities[me]`
pub fn steer(me: usize, entities: &[Entity], arena: &Arena, tuning: &Tuning) -> CpuDecision {
    let cpu = &entities[me];

    let thrust = nearest_other(me, entities)
        .map(|prey| {
            let target = herd_target(entities[prey].pos, arena, tuning.cpu_push_offset);
            (target - cpu.pos).normalize_or_zero()
        })
        .unwrap_or(Vector2::ZERO);

    CpuDecision {
        thrust,
        avoidance: wall_avoidance(
            cpu.pos,
            arena,
            tuning.cpu_avoidance_margin,
            tuning.cpu_avoidance_force,
        ),
        braking: arena.braking_factor(cpu.pos, tuning.wall_margin, tuning.brake_boost),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Role;

    fn body(id: u32, x: f64, y: f64, role: Role) -> Entity {
        Entity::new(id, Vector2::new(x, y), role, 12.0, 10.0, 0)
    }

    #[test]
    fn test_chases_nearest() {
        let arena = Arena::new(800.0, 800.0);
        let bodies = vec![
            body(1, 400.0, 400.0, Role::Player),
            body(2, 300.0, 400.0, Role::Cpu),
            body(3, 700.0, 700.0, Role::Cpu),
        ];
        assert_eq!(nearest_other(1, &bodies), Some(0));
        assert_eq!(nearest_other(2, &bodies), Some(0));

        let decision = steer(1, &bodies, &arena, &Tuning::default());
        // Player is centred; nearest wall is Left by tie order, target shifts right
        let expected = (Vector2::new(450.0, 400.0) - Vector2::new(300.0, 400.0)).normalize();
        assert!((decision.thrust - expected).length() < 1e-12);
        assert_eq!(decision.avoidance, Vector2::ZERO);
        assert_eq!(decision.braking, 0.0);
    }

    #[test]
    fn test_herd_target_pushes_off_wall() {
        let arena = Arena::new(800.0, 600.0);
        assert_eq!(herd_target(Vector2::new(400.0, 590.0), &arena, 50.0), Vector2::new(400.0, 540.0));
        assert_eq!(herd_target(Vector2::new(790.0, 300.0), &arena, 50.0), Vector2::new(740.0, 300.0));
        assert_eq!(herd_target(Vector2::new(400.0, 10.0), &arena, 50.0), Vector2::new(400.0, 60.0));
    }

    #[test]
    fn test_herd_target_unclamped_outside_arena() {
        let arena = Arena::new(800.0, 600.0);
        // Prey already past the left wall stays on the left-wall rule
        let target = herd_target(Vector2::new(-80.0, 300.0), &arena, 50.0);
        assert_eq!(target, Vector2::new(-30.0, 300.0));
        assert!(!arena.contains(target));
    }

    #[test]
    fn test_corner_avoidance_is_fixed_magnitude() {
        let arena = Arena::new(800.0, 800.0);
        let f = wall_avoidance(Vector2::new(10.0, 790.0), &arena, 50.0, 2000.0);
        assert!((f.length() - 2000.0).abs() < 1e-9);
        assert!(f.x > 0.0 && f.y < 0.0);
        assert_eq!(wall_avoidance(Vector2::new(400.0, 400.0), &arena, 50.0, 2000.0), Vector2::ZERO);
    }

    #[test]
    fn test_lonely_cpu_only_avoids() {
        let arena = Arena::new(800.0, 800.0);
        let bodies = vec![body(1, 20.0, 400.0, Role::Cpu)];
        let tuning = Tuning::default();
        let decision = steer(0, &bodies, &arena, &tuning);
        assert_eq!(decision.thrust, Vector2::ZERO);
        assert!((decision.braking - 130.0 / 25.0).abs() < 1e-12);
        assert_eq!(decision.force(Vector2::ZERO, &tuning), Vector2::new(2000.0, 0.0));
    }

    #[test]
    fn test_force_brakes_when_reversing() {
        let tuning = Tuning::default();
        let decision = CpuDecision {
            thrust: Vector2::new(1.0, 0.0),
            avoidance: Vector2::ZERO,
            braking: 1.0,
        };
        let f = decision.force(Vector2::new(-10.0, 0.0), &tuning);
        assert_eq!(f, Vector2::new(1800.0 * 3.0, 0.0));
    }
}
