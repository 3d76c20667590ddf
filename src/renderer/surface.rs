//! Abstract 2D drawing surface
//!
//! Mirrors the small part of a canvas-style API the game needs: paths,
//! solid and gradient paints, transforms and compositing mode.

use crate::Vector2;
use crate::sim::Color;

/// How new pixels combine with what is already drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeMode {
    SourceOver,
    /// Additive blending
    Lighter,
}

impl CompositeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompositeMode::SourceOver => "source-over",
            CompositeMode::Lighter => "lighter",
        }
    }
}

/// Gradient stop: offset in [0, 1], color, alpha
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stop {
    pub offset: f64,
    pub color: Color,
    pub alpha: f64,
}

impl Stop {
    pub fn new(offset: f64, color: Color, alpha: f64) -> Self {
        Self { offset, color, alpha }
    }
}

/// Fill or stroke style
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid { color: Color, alpha: f64 },
    Linear { from: Vector2, to: Vector2, stops: Vec<Stop> },
}

impl Paint {
    pub fn solid(color: Color) -> Self {
        Paint::Solid { color, alpha: 1.0 }
    }

    pub fn translucent(color: Color, alpha: f64) -> Self {
        Paint::Solid { color, alpha }
    }
}

/// Drawing target. All coordinates are in the current transform's space.
pub trait RenderSurface {
    /// Surface size in CSS pixels; zero means not ready
    fn size(&self) -> (f64, f64);

    /// Re-read the display size before a frame (no-op for fixed surfaces)
    fn refresh_size(&mut self) {}

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    fn scale(&mut self, factor: f64);

    fn set_global_alpha(&mut self, alpha: f64);
    fn set_composite(&mut self, mode: CompositeMode);
    /// Glow around subsequent fills; blur 0 turns it off
    fn set_shadow(&mut self, blur: f64, color: Color);

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: &Paint);
    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: &Paint, line_width: f64);
    fn fill_circle(&mut self, center: Vector2, radius: f64, paint: &Paint);
    /// Open polyline with round caps and joins
    fn stroke_path(&mut self, points: &[Vector2], paint: &Paint, line_width: f64);
}

/// One recorded surface call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    Translate(f64, f64),
    Scale(f64),
    GlobalAlpha(f64),
    Composite(CompositeMode),
    Shadow(f64, Color),
    FillRect { rect: [f64; 4], paint: Paint },
    StrokeRect { rect: [f64; 4], paint: Paint, line_width: f64 },
    FillCircle { center: Vector2, radius: f64, paint: Paint },
    StrokePath { points: Vec<Vector2>, paint: Paint, line_width: f64 },
}

/// Headless surface that records every call
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

impl RenderSurface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::Translate(x, y));
    }

    fn scale(&mut self, factor: f64) {
        self.commands.push(DrawCommand::Scale(factor));
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.commands.push(DrawCommand::GlobalAlpha(alpha));
    }

    fn set_composite(&mut self, mode: CompositeMode) {
        self.commands.push(DrawCommand::Composite(mode));
    }

    fn set_shadow(&mut self, blur: f64, color: Color) {
        self.commands.push(DrawCommand::Shadow(blur, color));
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: &Paint) {
        self.commands.push(DrawCommand::FillRect {
            rect: [x, y, w, h],
            paint: paint.clone(),
        });
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: &Paint, line_width: f64) {
        self.commands.push(DrawCommand::StrokeRect {
            rect: [x, y, w, h],
            paint: paint.clone(),
            line_width,
        });
    }

    fn fill_circle(&mut self, center: Vector2, radius: f64, paint: &Paint) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            paint: paint.clone(),
        });
    }

    fn stroke_path(&mut self, points: &[Vector2], paint: &Paint, line_width: f64) {
        self.commands.push(DrawCommand::StrokePath {
            points: points.to_vec(),
            paint: paint.clone(),
            line_width,
        });
    }
}
