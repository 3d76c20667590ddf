//! Simulation module
//!
//! All gameplay logic lives here. Everything is a plain function of the
//! state passed in:
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod arena;
pub mod cpu;
pub mod entity;
pub mod gravity;
pub mod input;
pub mod particle;
pub mod state;
pub mod stats;
pub mod tick;

pub use arena::{Arena, Edge, Viewport};
pub use cpu::{CpuDecision, steer};
pub use entity::{Entity, Role};
pub use gravity::{GravityLaw, GravityReport};
pub use input::{InputSnapshot, Thrust, is_start_key};
pub use particle::{Color, Particle};
pub use state::{GameEvent, GamePhase, GameState, ScreenEffects};
pub use stats::GameStats;
pub use tick::tick;
