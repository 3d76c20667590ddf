//! Cosmetic particles (exhaust, elimination and victory bursts)
//!
//! Particles never feed back into physics.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Vector2, polar};

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const PLAYER: Color = Color::rgb(0x00, 0xF0, 0xFF);
    pub const ENEMY: Color = Color::rgb(0xFF, 0x00, 0x55);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
    pub const VICTORY_ALT: Color = Color::rgb(0x00, 0xAA, 0xCC);
    pub const DEFEAT: Color = Color::rgb(0xFF, 0x00, 0x00);
    pub const VICTORY: Color = Color::rgb(0x00, 0xFF, 0xFF);
    pub const BACKGROUND: Color = Color::rgb(0x05, 0x05, 0x05);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#RRGGBB`
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// `rgba(r, g, b, a)` with alpha clamped to [0, 1]
    pub fn to_rgba(&self, alpha: f64) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha.clamp(0.0, 1.0))
    }
}

/// A short-lived visual point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vector2,
    pub vel: Vector2,
    /// Starts at 1.0, dead at or below 0
    pub life: f64,
    /// Seconds to burn through `life`
    pub max_life: f64,
    pub color: Color,
}

impl Particle {
    /// Lifetime is randomized to (0.2..0.6) * `life_multiplier` seconds
    pub fn new<R: Rng>(pos: Vector2, vel: Vector2, color: Color, life_multiplier: f64, rng: &mut R) -> Self {
        Self {
            pos,
            vel,
            life: 1.0,
            max_life: (0.2 + rng.random::<f64>() * 0.4) * life_multiplier,
            color,
        }
    }

    pub fn update(&mut self, dt: f64) {
        self.pos += self.vel * dt;
        self.life -= dt / self.max_life;
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Advance every particle and purge the dead ones
pub fn update_particles(particles: &mut Vec<Particle>, dt: f64) {
    for p in particles.iter_mut() {
        p.update(dt);
    }
    particles.retain(Particle::is_alive);
}

/// Drop the oldest particles until at most `max` remain
pub fn cap_particles(particles: &mut Vec<Particle>, max: usize) {
    if particles.len() > max {
        let excess = particles.len() - max;
        particles.drain(..excess);
    }
}

/// One exhaust puff behind a body thrusting along `direction`
pub fn exhaust<R: Rng>(
    origin: Vector2,
    radius: f64,
    color: Color,
    direction: Vector2,
    thrust: f64,
    rng: &mut R,
) -> Particle {
    let dir = direction.normalize_or_zero();
    let thrust = thrust.min(1.0);
    let spread = 80.0 * thrust;
    let speed = (150.0 + rng.random::<f64>() * 100.0) * thrust;
    let jitter = Vector2::new(
        (rng.random::<f64>() - 0.5) * spread,
        (rng.random::<f64>() - 0.5) * spread,
    );
    let color = if rng.random::<f64>() > 0.8 { Color::WHITE } else { color };
    Particle::new(origin - dir * radius, -dir * speed + jitter, color, 1.0, rng)
}

/// Radial burst parameters
#[derive(Debug, Clone, Copy)]
pub struct Burst {
    pub count: usize,
    pub min_speed: f64,
    /// Random speed added on top of `min_speed`
    pub speed_range: f64,
    pub life_multiplier: f64,
}

impl Burst {
    /// Body leaving the arena
    pub fn elimination(is_player: bool) -> Self {
        Self {
            count: if is_player { 500 } else { 600 },
            min_speed: 100.0,
            speed_range: 500.0,
            life_multiplier: 2.0,
        }
    }

    /// Player left alone
    pub fn victory() -> Self {
        Self {
            count: 500,
            min_speed: 50.0,
            speed_range: 600.0,
            life_multiplier: 4.0,
        }
    }

    /// Emit into `out`; `color_for` picks the color of the i-th particle
    pub fn emit<R: Rng>(
        &self,
        origin: Vector2,
        color_for: impl Fn(usize) -> Color,
        out: &mut Vec<Particle>,
        rng: &mut R,
    ) {
        out.reserve(self.count);
        for i in 0..self.count {
            let angle = rng.random::<f64>() * std::f64::consts::TAU;
            let speed = self.min_speed + rng.random::<f64>() * self.speed_range;
            out.push(Particle::new(
                origin,
                polar(speed, angle),
                color_for(i),
                self.life_multiplier,
                rng,
            ));
        }
    }
}

/// Three-way color cycle used by the victory burst
pub fn victory_color(i: usize) -> Color {
    match i % 3 {
        0 => Color::PLAYER,
        1 => Color::WHITE,
        _ => Color::VICTORY_ALT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_life_decays_by_dt_over_max_life() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut p = Particle::new(Vector2::ZERO, Vector2::new(10.0, 0.0), Color::WHITE, 1.0, &mut rng);
        assert!(p.max_life >= 0.2 && p.max_life < 0.6);
        let before = p.life;
        p.update(0.05);
        assert!((before - p.life - 0.05 / p.max_life).abs() < 1e-12);
        assert!((p.pos.x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_dead_particles_purged() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut particles: Vec<Particle> = (0..10)
            .map(|_| Particle::new(Vector2::ZERO, Vector2::ZERO, Color::WHITE, 1.0, &mut rng))
            .collect();
        // 0.6s exceeds every possible max_life
        update_particles(&mut particles, 0.1);
        assert_eq!(particles.len(), 10);
        for _ in 0..5 {
            update_particles(&mut particles, 0.1);
        }
        assert!(particles.is_empty());
    }

    #[test]
    fn test_exhaust_behind_body() {
        let mut rng = Pcg32::seed_from_u64(3);
        let p = exhaust(Vector2::new(50.0, 50.0), 12.0, Color::PLAYER, Vector2::new(2.0, 0.0), 1.0, &mut rng);
        assert_eq!(p.pos, Vector2::new(38.0, 50.0));
        // Moves backwards: base speed 150..250 dominates the ±40 jitter
        assert!(p.vel.x < -100.0);
        assert!(p.vel.y.abs() <= 40.0);
    }

    #[test]
    fn test_bursts() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut out = Vec::new();
        Burst::victory().emit(Vector2::ZERO, victory_color, &mut out, &mut rng);
        assert_eq!(out.len(), 500);
        assert_eq!(out[0].color, Color::PLAYER);
        assert_eq!(out[1].color, Color::WHITE);
        assert_eq!(out[2].color, Color::VICTORY_ALT);
        for p in &out {
            let speed = p.vel.length();
            assert!((50.0 - 1e-9..650.0 + 1e-9).contains(&speed));
            assert!(p.max_life >= 0.8 && p.max_life < 2.4);
        }
        assert_eq!(Burst::elimination(false).count, 600);
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut particles: Vec<Particle> = (0..5)
            .map(|i| Particle::new(Vector2::splat(i as f64), Vector2::ZERO, Color::WHITE, 1.0, &mut rng))
            .collect();
        cap_particles(&mut particles, 2);
        assert_eq!(particles.len(), 2);
        assert_eq!(particles[0].pos.x, 3.0);
    }

    #[test]
    fn test_color_strings() {
        assert_eq!(Color::PLAYER.to_hex(), "#00F0FF");
        assert_eq!(Color::ENEMY.to_rgba(2.0), "rgba(255, 0, 85, 1)");
    }
}
