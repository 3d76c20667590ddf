//! Statistics snapshot reported to observers

use serde::{Deserialize, Serialize};

use crate::consts::DANGER_RANGE;

/// Periodic match statistics (plain numbers for any UI)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    /// Player speed this tick
    pub speed: f64,
    pub max_speed: f64,
    /// Total gravitational force on the player this tick
    pub gravity_force: f64,
    pub max_gravity: f64,
    pub current_enemies: usize,
    pub initial_enemies: usize,
    /// Seconds since the match started
    pub time_survived: f64,
    /// 0 (safe) to 100 (touching a wall or another body)
    pub danger_level: f64,
}

/// Map the player's closest proximity (wall distance or body gap) to 0..=100
pub fn danger_level(min_distance: f64) -> f64 {
    if min_distance.is_nan() {
        return 0.0;
    }
    (100.0 - (min_distance / DANGER_RANGE) * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_danger_level_ramp() {
        assert_eq!(danger_level(f64::INFINITY), 0.0);
        assert_eq!(danger_level(400.0), 0.0);
        assert_eq!(danger_level(200.0), 0.0);
        assert_eq!(danger_level(100.0), 50.0);
        assert_eq!(danger_level(0.0), 100.0);
        // Overlapping bodies report a negative gap
        assert_eq!(danger_level(-5.0), 100.0);
    }

    #[test]
    fn test_camel_case_schema() {
        let json = serde_json::to_value(GameStats::default()).unwrap();
        for key in [
            "speed",
            "maxSpeed",
            "gravityForce",
            "maxGravity",
            "currentEnemies",
            "initialEnemies",
            "timeSurvived",
            "dangerLevel",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
