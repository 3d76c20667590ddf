//! Grav Arena - An N-body gravity survival game
//!
//! Core modules:
//! - `sim`: Simulation (gravity, integration, CPU steering, game state)
//! - `engine`: Engine facade (input, lifecycle, update then render)
//! - `frame`: Frame loop driven by an injectable scheduler
//! - `renderer`: Draw commands against an abstract 2D surface
//! - `platform`: Browser scheduler and canvas surface
//! - `tuning`: Data-driven game balance

pub mod engine;
pub mod frame;
pub mod observer;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use engine::Engine;
pub use frame::{FrameHandle, FrameLoop, ManualScheduler, Scheduler};
pub use observer::{GameObserver, RecordingObserver};
pub use sim::{GameEvent, GamePhase, GameStats, InputSnapshot};
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

/// 2D vector used for every physical quantity (double precision)
pub type Vector2 = glam::DVec2;

/// Game configuration constants
pub mod consts {
    /// Largest physics step (seconds); longer stalls collapse into one step
    pub const MAX_DT: f64 = 0.1;
    /// Side of the square the logical arena is scaled from
    pub const BASE_LOGICAL_SIZE: f64 = 800.0;
    /// Smallest allowed logical scale factor
    pub const MIN_SCALE_FACTOR: f64 = 0.1;

    /// Body defaults
    pub const PLAYER_RADIUS: f64 = 12.0;
    pub const ENTITY_MASS: f64 = 10.0;
    /// Positions kept per body trail
    pub const TRAIL_LENGTH: usize = 150;

    /// Gravity: F = min(G * m1 * m2 / (d²)^DIST_EXP, GRAVITY_MAX)
    pub const GRAVITY_CONSTANT: f64 = 45_000.0;
    pub const GRAVITY_MAX: f64 = 300_000.0;
    pub const DIST_EXP: f64 = 0.87;

    /// Thrust
    pub const THRUST_FORCE: f64 = 1500.0;
    pub const CPU_THRUST_FORCE: f64 = 1800.0;
    /// Counter-thrust multiplier base (added to the wall braking factor)
    pub const BRAKING_CONSTANT: f64 = 2.0;
    /// Distance from an edge where wall braking starts
    pub const WALL_MARGIN: f64 = 150.0;
    /// Divisor turning wall penetration into a braking factor
    pub const BRAKE_BOOST: f64 = 25.0;

    /// CPU steering
    pub const CPU_PUSH_OFFSET: f64 = 50.0;
    pub const CPU_AVOIDANCE_MARGIN: f64 = 50.0;
    pub const CPU_AVOIDANCE_FORCE: f64 = 2000.0;
    /// Probability a thrusting CPU emits exhaust this tick
    pub const CPU_EXHAUST_CHANCE: f64 = 0.6;

    /// Match setup
    pub const ENEMY_NUMBER: usize = 7;
    pub const SAFE_DISTANCE: f64 = 150.0;
    pub const SPAWN_ATTEMPTS: u32 = 20;

    /// Stats are reported every N ticks
    pub const STATS_INTERVAL: u64 = 5;
    /// Proximity (logical units) at which danger starts rising from 0
    pub const DANGER_RANGE: f64 = 200.0;

    /// Distance under which gravity lines are drawn
    pub const GRAVITY_LINE_RANGE: f64 = 800.0;
}

/// Clamp a raw frame delta (seconds) into a usable physics step
#[inline]
pub fn clamp_dt(dt: f64) -> f64 {
    if dt.is_finite() {
        dt.clamp(0.0, consts::MAX_DT)
    } else {
        0.0
    }
}

/// Unit vector at `angle` scaled to `length`
#[inline]
pub fn polar(length: f64, angle: f64) -> Vector2 {
    Vector2::new(length * angle.cos(), length * angle.sin())
}
