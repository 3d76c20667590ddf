//! Arena bounds and wall geometry
//!
//! The arena is the logical rectangle `[0, width] x [0, height]`. A body on
//! the boundary is still alive; strictly outside it is eliminated.

use serde::{Deserialize, Serialize};

use crate::Vector2;
use crate::consts::{BASE_LOGICAL_SIZE, MIN_SCALE_FACTOR};

/// One side of the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    /// Unit vector pointing from this edge into the arena
    pub fn inward(&self) -> Vector2 {
        match self {
            Edge::Left => Vector2::X,
            Edge::Right => Vector2::NEG_X,
            Edge::Top => Vector2::Y,
            Edge::Bottom => Vector2::NEG_Y,
        }
    }
}

/// Logical arena bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(BASE_LOGICAL_SIZE, BASE_LOGICAL_SIZE)
    }
}

impl Arena {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vector2 {
        Vector2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Inclusive bounds check: the boundary itself counts as inside
    #[inline]
    pub fn contains(&self, pos: Vector2) -> bool {
        pos.x >= 0.0 && pos.x <= self.width && pos.y >= 0.0 && pos.y <= self.height
    }

    /// Closest edge to `pos` and the distance to it (negative once outside).
    /// Ties resolve in Left, Right, Top, Bottom order.
    pub fn nearest_edge(&self, pos: Vector2) -> (Edge, f64) {
        [
            (Edge::Left, pos.x),
            (Edge::Right, self.width - pos.x),
            (Edge::Top, pos.y),
            (Edge::Bottom, self.height - pos.y),
        ]
        .into_iter()
        .fold((Edge::Left, f64::INFINITY), |best, cand| {
            if cand.1 < best.1 { cand } else { best }
        })
    }

    /// Wall braking factor: grows linearly from 0 at `margin` to
    /// `margin / boost` on the wall itself.
    pub fn braking_factor(&self, pos: Vector2, margin: f64, boost: f64) -> f64 {
        let (_, dist) = self.nearest_edge(pos);
        if dist < margin {
            (margin - dist) / boost
        } else {
            0.0
        }
    }
}

/// Mapping from surface pixels to logical arena units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Surface size in CSS pixels
    pub width: f64,
    pub height: f64,
    /// Pixels per logical unit
    pub scale: f64,
}

impl Viewport {
    /// Fit the logical arena so its shorter side spans `BASE_LOGICAL_SIZE` units
    pub fn fit(width: f64, height: f64) -> Self {
        let scale = (width.min(height) / BASE_LOGICAL_SIZE).max(MIN_SCALE_FACTOR);
        Self {
            width,
            height,
            scale,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn arena(&self) -> Arena {
        Arena::new(self.width / self.scale, self.height / self.scale)
    }
}
