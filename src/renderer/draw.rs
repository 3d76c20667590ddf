//! Frame drawing
//!
//! Turns a `GameState` snapshot into surface calls. Everything between the
//! save/restore pair is in logical arena units.

use rand::Rng;

use super::surface::{CompositeMode, Paint, RenderSurface, Stop};
use crate::Vector2;
use crate::consts::GRAVITY_LINE_RANGE;
use crate::settings::Settings;
use crate::sim::{Color, Entity, GamePhase, GameState, Viewport};

/// On-screen particle radius in physical pixels before scale compensation
const PARTICLE_PHYSICAL_RADIUS: f64 = 1.5;
const BORDER_WIDTH: f64 = 20.0;
const GRAVITY_LINE_WIDTH: f64 = 1.0;
const BODY_GLOW: f64 = 30.0;

/// Draw one frame. Returns false when the surface is not ready.
pub fn draw_frame<R: Rng>(
    state: &GameState,
    surface: &mut dyn RenderSurface,
    settings: &Settings,
    rng: &mut R,
) -> bool {
    let (width, height) = surface.size();
    let viewport = Viewport::fit(width, height);
    if viewport.is_empty() {
        return false;
    }

    surface.set_composite(CompositeMode::SourceOver);
    surface.fill_rect(0.0, 0.0, width, height, &Paint::solid(Color::BACKGROUND));

    surface.save();
    let shake = state.effects.shake;
    if shake > 0.0 && settings.screen_shake {
        let sx = (rng.random::<f64>() - 0.5) * shake;
        let sy = (rng.random::<f64>() - 0.5) * shake;
        surface.translate(sx, sy);
    }
    surface.scale(viewport.scale);

    draw_border(state, surface);
    if settings.gravity_lines {
        draw_gravity_lines(&state.entities, surface, viewport.scale);
    }

    surface.set_composite(CompositeMode::Lighter);
    if settings.particles {
        let radius = PARTICLE_PHYSICAL_RADIUS / viewport.scale.powf(0.7);
        for p in state.particles.iter().filter(|p| p.is_alive()) {
            surface.set_global_alpha(p.life.max(0.0) * 0.9);
            surface.fill_circle(p.pos, radius, &Paint::solid(p.color));
        }
        surface.set_global_alpha(1.0);
    }
    for e in &state.entities {
        draw_body(e, surface, settings);
    }
    surface.restore();

    if state.effects.flash > 0.0 && settings.flash {
        surface.save();
        surface.set_global_alpha(state.effects.flash);
        surface.fill_rect(0.0, 0.0, width, height, &Paint::solid(state.effects.flash_color));
        surface.restore();
    }

    surface.set_composite(CompositeMode::SourceOver);
    true
}

fn draw_border(state: &GameState, surface: &mut dyn RenderSurface) {
    let game_over = state.phase == GamePhase::GameOver;
    let (color, alpha, glow) = if game_over {
        (Color::DEFEAT, 0.5, 30.0)
    } else {
        (Color::rgb(0xFF, 0x00, 0x32), 0.5, 15.0)
    };
    surface.set_shadow(glow, color);
    surface.stroke_rect(
        0.0,
        0.0,
        state.arena.width,
        state.arena.height,
        &Paint::translucent(color, alpha),
        BORDER_WIDTH,
    );
    surface.set_shadow(0.0, color);
}

/// Opacity of the line between two bodies `dist` apart (0 beyond range)
pub fn gravity_line_opacity(dist: f64) -> f64 {
    if dist >= GRAVITY_LINE_RANGE {
        0.0
    } else {
        (1.0 - dist / GRAVITY_LINE_RANGE).powi(2) * 0.7
    }
}

fn draw_gravity_lines(entities: &[Entity], surface: &mut dyn RenderSurface, scale: f64) {
    for (i, a) in entities.iter().enumerate() {
        for b in &entities[i + 1..] {
            let opacity = gravity_line_opacity(a.pos.distance(b.pos));
            if opacity <= 0.0 {
                continue;
            }
            let paint = Paint::Linear {
                from: a.pos,
                to: b.pos,
                stops: vec![
                    Stop::new(0.0, Color::PLAYER, opacity),
                    Stop::new(1.0, Color::ENEMY, opacity),
                ],
            };
            surface.stroke_path(&[a.pos, b.pos], &paint, GRAVITY_LINE_WIDTH / scale);
        }
    }
}

/// The newest `quality` fraction of a trail, oldest first
pub fn visible_trail(entity: &Entity, quality: f64) -> Vec<Vector2> {
    let keep = ((entity.trail.len() as f64) * quality.clamp(0.0, 1.0)).ceil() as usize;
    entity.trail.iter().skip(entity.trail.len() - keep).copied().collect()
}

fn draw_body(entity: &Entity, surface: &mut dyn RenderSurface, settings: &Settings) {
    let color = entity.color();

    if settings.trails {
        let points = visible_trail(entity, settings.quality.trail_quality());
        if points.len() > 1 {
            let paint = Paint::Linear {
                from: points[0],
                to: entity.pos,
                stops: vec![Stop::new(0.0, Color::rgb(0, 0, 0), 0.0), Stop::new(1.0, color, 1.0)],
            };
            surface.stroke_path(&points, &paint, entity.radius / 1.8);
        }
    }

    if settings.quality.glow_enabled() {
        surface.set_shadow(BODY_GLOW, color);
    }
    surface.fill_circle(entity.pos, entity.radius, &Paint::solid(color));
    surface.set_shadow(0.0, Color::WHITE);
    surface.fill_circle(entity.pos, entity.radius * 0.4, &Paint::solid(Color::WHITE));
}
