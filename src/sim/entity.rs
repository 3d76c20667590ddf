//! Bodies: the player and the CPU-controlled point masses

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::particle::Color;
use crate::Vector2;

/// Who steers a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Player,
    Cpu,
}

/// A point mass taking part in gravity and elimination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub pos: Vector2,
    pub vel: Vector2,
    /// Per-tick force accumulator (already divided by mass); zeroed by `integrate`
    pub acc: Vector2,
    pub radius: f64,
    pub mass: f64,
    pub role: Role,
    /// Extra counter-thrust multiplier near walls, recomputed every tick
    pub braking: f64,
    /// Past positions, oldest first
    #[serde(skip)]
    pub trail: VecDeque<Vector2>,
    #[serde(skip)]
    trail_capacity: usize,
}

impl Entity {
    pub fn new(id: u32, pos: Vector2, role: Role, radius: f64, mass: f64, trail_capacity: usize) -> Self {
        Self {
            id,
            pos,
            vel: Vector2::ZERO,
            acc: Vector2::ZERO,
            radius,
            mass,
            role,
            braking: 0.0,
            trail: VecDeque::with_capacity(trail_capacity),
            trail_capacity,
        }
    }

    #[inline]
    pub fn is_player(&self) -> bool {
        self.role == Role::Player
    }

    pub fn color(&self) -> Color {
        match self.role {
            Role::Player => Color::PLAYER,
            Role::Cpu => Color::ENEMY,
        }
    }

    /// Accumulate a force for this tick (a = F / m)
    #[inline]
    pub fn apply_force(&mut self, force: Vector2) {
        self.acc += force / self.mass;
    }

    /// Semi-implicit Euler step, then reset the accumulator and record the trail
    pub fn integrate(&mut self, dt: f64) {
        self.vel += self.acc * dt;
        self.pos += self.vel * dt;
        self.acc = Vector2::ZERO;
        self.record_trail();
    }

    /// Append the current position, evicting the oldest point when full
    pub fn record_trail(&mut self) {
        if self.trail_capacity == 0 {
            return;
        }
        while self.trail.len() >= self.trail_capacity {
            self.trail.pop_front();
        }
        self.trail.push_back(self.pos);
    }

    pub fn trail_capacity(&self) -> usize {
        self.trail_capacity
    }
}
