//! Data-driven game balance
//!
//! Every physics knob lives here so a match can be rebalanced from JSON
//! without touching the simulation code. Defaults come from `consts`.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Physics and balance parameters for a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tuning {
    /// CPU bodies spawned at match start
    pub enemy_count: usize,
    /// Radius shared by every body
    pub body_radius: f64,
    /// Mass shared by every body
    pub body_mass: f64,
    pub gravity_constant: f64,
    /// Upper bound on any pairwise force magnitude
    pub gravity_max: f64,
    /// Exponent applied to squared distance (0.87 gives d^1.74 falloff)
    pub distance_exponent: f64,
    pub thrust_force: f64,
    pub cpu_thrust_force: f64,
    pub braking_constant: f64,
    pub wall_margin: f64,
    pub brake_boost: f64,
    /// Minimum spawn distance between a CPU body and the player
    pub safe_distance: f64,
    pub spawn_attempts: u32,
    pub trail_length: usize,
    pub cpu_push_offset: f64,
    pub cpu_avoidance_margin: f64,
    pub cpu_avoidance_force: f64,
    pub cpu_exhaust_chance: f64,
    /// Stats callback fires every this many ticks
    pub stats_interval: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            enemy_count: ENEMY_NUMBER,
            body_radius: PLAYER_RADIUS,
            body_mass: ENTITY_MASS,
            gravity_constant: GRAVITY_CONSTANT,
            gravity_max: GRAVITY_MAX,
            distance_exponent: DIST_EXP,
            thrust_force: THRUST_FORCE,
            cpu_thrust_force: CPU_THRUST_FORCE,
            braking_constant: BRAKING_CONSTANT,
            wall_margin: WALL_MARGIN,
            brake_boost: BRAKE_BOOST,
            safe_distance: SAFE_DISTANCE,
            spawn_attempts: SPAWN_ATTEMPTS,
            trail_length: TRAIL_LENGTH,
            cpu_push_offset: CPU_PUSH_OFFSET,
            cpu_avoidance_margin: CPU_AVOIDANCE_MARGIN,
            cpu_avoidance_force: CPU_AVOIDANCE_FORCE,
            cpu_exhaust_chance: CPU_EXHAUST_CHANCE,
            stats_interval: STATS_INTERVAL,
        }
    }
}

impl Tuning {
    /// Parse a tuning document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Parse a tuning document, logging and falling back to defaults on error
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => {
                log::info!("Loaded tuning ({} enemies)", tuning.enemy_count);
                tuning
            }
            Err(e) => {
                log::warn!("Rejected tuning document: {}", e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
