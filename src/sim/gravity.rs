//! Pairwise gravitational attraction
//!
//! Force magnitude between two bodies:
//!
//! **F = min(G * m₁ * m₂ / (d²)^k, F_max)**
//!
//! With the default k = 0.87 the falloff is d^1.74, a little softer than
//! Newtonian gravity, and the cap keeps close encounters finite.

use super::entity::Entity;
use crate::Vector2;
use crate::tuning::Tuning;

/// Force law parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityLaw {
    pub constant: f64,
    pub max_force: f64,
    pub exponent: f64,
}

impl GravityLaw {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            constant: tuning.gravity_constant,
            max_force: tuning.gravity_max,
            exponent: tuning.distance_exponent,
        }
    }

    /// Capped force magnitude at squared distance `dist_sq` (> 0)
    #[inline]
    pub fn magnitude(&self, mass_a: f64, mass_b: f64, dist_sq: f64) -> f64 {
        (self.constant * mass_a * mass_b / dist_sq.powf(self.exponent)).min(self.max_force)
    }

    /// Force exerted on A by B, or `None` when the bodies coincide
    pub fn force_on(&self, a_pos: Vector2, a_mass: f64, b_pos: Vector2, b_mass: f64) -> Option<Vector2> {
        let offset = b_pos - a_pos;
        let dist_sq = offset.length_squared();
        if dist_sq > 0.0 {
            Some(offset.normalize_or_zero() * self.magnitude(a_mass, b_mass, dist_sq))
        } else {
            None
        }
    }
}

/// What the player felt during one accumulation pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityReport {
    /// Sum of force magnitudes over every pair involving the player
    pub player_force: f64,
    /// Smallest surface-to-surface gap between the player and any body
    pub min_player_gap: f64,
}

impl Default for GravityReport {
    fn default() -> Self {
        Self {
            player_force: 0.0,
            min_player_gap: f64::INFINITY,
        }
    }
}

/// Apply equal and opposite forces for every unordered pair of bodies
pub fn accumulate(entities: &mut [Entity], law: &GravityLaw) -> GravityReport {
    let mut report = GravityReport::default();

    for i in 0..entities.len() {
        let (head, tail) = entities.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            let offset = b.pos - a.pos;
            let dist_sq = offset.length_squared();
            if dist_sq <= 0.0 {
                continue;
            }
            let magnitude = law.magnitude(a.mass, b.mass, dist_sq);
            let force = offset.normalize_or_zero() * magnitude;
            a.apply_force(force);
            b.apply_force(-force);

            if a.is_player() || b.is_player() {
                report.player_force += magnitude;
                let gap = dist_sq.sqrt() - a.radius - b.radius;
                report.min_player_gap = report.min_player_gap.min(gap);
            }
        }
    }

    report
}
