//! Player input and thrust resolution

use serde::{Deserialize, Serialize};

use crate::Vector2;

/// Analog components at or below this are treated as centered
pub const ANALOG_DEADZONE: f64 = 0.01;

/// Merged held-input state (keyboard flags plus an optional joystick vector)
///
/// Last write wins; the integrator reads whatever is current each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Joystick vector, components in [-1, 1]
    #[serde(default)]
    pub analog: Option<Vector2>,
}

/// A resolved thrust request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thrust {
    /// Unit direction (zero when idle)
    pub direction: Vector2,
    /// Strength in [0, 1]
    pub magnitude: f64,
}

impl Thrust {
    pub const IDLE: Thrust = Thrust {
        direction: Vector2::ZERO,
        magnitude: 0.0,
    };

    pub fn is_active(&self) -> bool {
        self.magnitude > 0.0
    }
}

impl InputSnapshot {
    /// Analog input wins when it is outside the deadzone; otherwise the four
    /// flags combine into a full-strength direction (opposite flags cancel).
    pub fn thrust(&self) -> Thrust {
        if let Some(v) = self.analog.filter(|v| v.x.abs() > ANALOG_DEADZONE || v.y.abs() > ANALOG_DEADZONE) {
            return Thrust {
                direction: v.normalize_or_zero(),
                magnitude: v.length().min(1.0),
            };
        }

        let mut dir = Vector2::ZERO;
        if self.left {
            dir.x -= 1.0;
        }
        if self.right {
            dir.x += 1.0;
        }
        if self.up {
            dir.y -= 1.0;
        }
        if self.down {
            dir.y += 1.0;
        }

        if dir.length_squared() > 0.0 {
            Thrust {
                direction: dir.normalize_or_zero(),
                magnitude: 1.0,
            }
        } else {
            Thrust::IDLE
        }
    }

    /// Update a direction flag from a `KeyboardEvent.key` value (arrows or
    /// WASD). Returns false for keys that are not movement keys.
    pub fn apply_key(&mut self, key: &str, pressed: bool) -> bool {
        let flag = match key {
            "ArrowUp" | "w" | "W" => &mut self.up,
            "ArrowDown" | "s" | "S" => &mut self.down,
            "ArrowLeft" | "a" | "A" => &mut self.left,
            "ArrowRight" | "d" | "D" => &mut self.right,
            _ => return false,
        };
        *flag = pressed;
        true
    }
}

/// Keys that begin a match from the menu or an end screen
pub fn is_start_key(key: &str) -> bool {
    matches!(key, "Enter" | " ")
}

/// Thrust force with per-axis braking: an axis whose velocity opposes the
/// thrust gets multiplied by `braking_constant + braking`.
pub fn braked_force(direction: Vector2, force: f64, vel: Vector2, braking_constant: f64, braking: f64) -> Vector2 {
    let mut out = direction * force;
    let boost = braking_constant + braking;
    if vel.x * direction.x < 0.0 {
        out.x *= boost;
    }
    if vel.y * direction.y < 0.0 {
        out.y *= boost;
    }
    out
}
