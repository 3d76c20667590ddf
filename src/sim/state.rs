//! Game state and core simulation types
//!
//! The match lifecycle lives here: phases, spawning, transition effects and
//! the outbound event queue.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::arena::Arena;
use super::entity::{Entity, Role};
use super::particle::{Burst, Color, Particle, cap_particles, victory_color};
use super::stats::GameStats;
use crate::Vector2;
use crate::tuning::Tuning;

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Idle before the first match; no physics
    Menu,
    /// Physics running
    Playing,
    /// Player left the arena
    GameOver,
    /// Player is the last body standing
    Victory,
}

/// Something observers care about
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PhaseChanged(GamePhase),
    Stats(GameStats),
    Eliminated { id: u32, role: Role, pos: Vector2 },
}

/// Screen shake and color flash, both decaying exponentially per tick
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenEffects {
    pub shake: f64,
    pub shake_decay: f64,
    pub flash: f64,
    pub flash_color: Color,
}

impl Default for ScreenEffects {
    fn default() -> Self {
        Self {
            shake: 0.0,
            shake_decay: 0.9,
            flash: 0.0,
            flash_color: Color::WHITE,
        }
    }
}

impl ScreenEffects {
    /// Flash fades this much per tick
    pub const FLASH_DECAY: f64 = 0.9;

    pub fn decay(&mut self) {
        if self.shake > 0.1 {
            self.shake *= self.shake_decay;
        } else {
            self.shake = 0.0;
        }

        if self.flash > 0.01 {
            self.flash *= Self::FLASH_DECAY;
        } else {
            self.flash = 0.0;
        }
    }

    pub fn is_idle(&self) -> bool {
        self.shake == 0.0 && self.flash == 0.0
    }
}

/// Complete match state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    /// Drives spawn placement and every cosmetic random choice
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub arena: Arena,
    pub phase: GamePhase,
    /// Live bodies (player first after `start`)
    pub entities: Vec<Entity>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub effects: ScreenEffects,
    /// Cap applied after every emission
    pub max_particles: usize,
    /// Simulated seconds since the match started
    pub elapsed: f64,
    pub max_speed: f64,
    pub max_gravity: f64,
    pub initial_enemies: usize,
    /// Playing ticks since the match started
    pub time_ticks: u64,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create an idle state in `Menu`
    pub fn new(seed: u64, tuning: Tuning, arena: Arena) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            initial_enemies: tuning.enemy_count,
            tuning,
            arena,
            phase: GamePhase::Menu,
            entities: Vec::new(),
            particles: Vec::new(),
            effects: ScreenEffects::default(),
            max_particles: usize::MAX,
            elapsed: 0.0,
            max_speed: 0.0,
            max_gravity: 0.0,
            time_ticks: 0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Reset every session value and begin a fresh match, from any phase
    pub fn start(&mut self) {
        self.entities.clear();
        self.particles.clear();
        self.effects = ScreenEffects::default();
        self.elapsed = 0.0;
        self.max_speed = 0.0;
        self.max_gravity = 0.0;
        self.time_ticks = 0;
        self.initial_enemies = self.tuning.enemy_count;

        let center = self.arena.center();
        let id = self.next_entity_id();
        let player = self.new_body(id, center, Role::Player);
        self.entities.push(player);

        for _ in 0..self.initial_enemies {
            let pos = self.spawn_position(center);
            let id = self.next_entity_id();
            let cpu = self.new_body(id, pos, Role::Cpu);
            self.entities.push(cpu);
        }

        log::info!(
            "Match started: {} enemies in {:.0}x{:.0} arena",
            self.initial_enemies,
            self.arena.width,
            self.arena.height
        );
        self.set_phase(GamePhase::Playing);
    }

    fn new_body(&self, id: u32, pos: Vector2, role: Role) -> Entity {
        Entity::new(
            id,
            pos,
            role,
            self.tuning.body_radius,
            self.tuning.body_mass,
            self.tuning.trail_length,
        )
    }

    /// Random in-arena position at least `safe_distance` from `player`,
    /// settling for the last candidate when every attempt lands too close
    fn spawn_position(&mut self, player: Vector2) -> Vector2 {
        let r = self.tuning.body_radius;
        let safe_sq = self.tuning.safe_distance * self.tuning.safe_distance;
        let span_x = (self.arena.width - r * 2.0).max(0.0);
        let span_y = (self.arena.height - r * 2.0).max(0.0);

        let mut candidate = player;
        for attempt in 0..self.tuning.spawn_attempts.max(1) {
            candidate = Vector2::new(
                self.rng.random::<f64>() * span_x + r,
                self.rng.random::<f64>() * span_y + r,
            );
            if candidate.distance_squared(player) >= safe_sq {
                log::debug!("Spawned CPU at {:?} after {} attempts", candidate, attempt + 1);
                return candidate;
            }
        }

        log::warn!(
            "No spawn point {:.0} units from the player after {} attempts; using {:?}",
            self.tuning.safe_distance,
            self.tuning.spawn_attempts,
            candidate
        );
        candidate
    }

    /// Switch phase, notify observers and fire one-shot end-of-match effects
    pub fn set_phase(&mut self, phase: GamePhase) {
        let prev = self.phase;
        self.phase = phase;
        self.events.push(GameEvent::PhaseChanged(phase));
        log::info!("Phase {:?} -> {:?}", prev, phase);

        if prev != GamePhase::Playing {
            return;
        }
        match phase {
            GamePhase::GameOver => {
                self.effects.shake = 40.0;
                self.effects.shake_decay = 0.92;
                self.effects.flash = 0.8;
                self.effects.flash_color = Color::DEFEAT;
            }
            GamePhase::Victory => {
                self.effects.shake = 20.0;
                self.effects.shake_decay = 0.96;
                self.effects.flash = 0.5;
                self.effects.flash_color = Color::VICTORY;
                if let Some(pos) = self.player().map(|p| p.pos) {
                    Burst::victory().emit(pos, victory_color, &mut self.particles, &mut self.rng);
                    cap_particles(&mut self.particles, self.max_particles);
                }
            }
            _ => {}
        }
    }

    /// Burst, shake and flash for a body leaving the arena
    pub fn eliminate_effect(&mut self, entity: &Entity) {
        let is_player = entity.is_player();
        let intensity = if is_player { 40.0 } else { 50.0 };
        self.effects.shake = self.effects.shake.max(intensity);
        self.effects.flash = if is_player { 0.9 } else { 0.6 };
        self.effects.flash_color = entity.color();

        let color = entity.color();
        Burst::elimination(is_player).emit(entity.pos, |_| color, &mut self.particles, &mut self.rng);
        cap_particles(&mut self.particles, self.max_particles);

        self.events.push(GameEvent::Eliminated {
            id: entity.id,
            role: entity.role,
            pos: entity.pos,
        });
        log::debug!("{:?} {} eliminated at {:?}", entity.role, entity.id, entity.pos);
    }

    pub fn player(&self) -> Option<&Entity> {
        self.entities.iter().find(|e| e.is_player())
    }

    pub fn player_index(&self) -> Option<usize> {
        self.entities.iter().position(|e| e.is_player())
    }

    /// Live CPU bodies
    pub fn enemy_count(&self) -> usize {
        self.entities.iter().filter(|e| !e.is_player()).count()
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
