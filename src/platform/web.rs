//! requestAnimationFrame scheduler and 2D canvas surface

use std::cell::RefCell;
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use crate::Vector2;
use crate::frame::{FrameCallback, FrameHandle, Scheduler};
use crate::renderer::{CompositeMode, Paint, RenderSurface};
use crate::sim::Color;

#[derive(Default)]
struct RafClosures {
    live: HashMap<i32, Closure<dyn FnMut(f64)>>,
    /// The closure that fired last; dropped once the next one runs
    spent: Option<Closure<dyn FnMut(f64)>>,
}

/// Schedules frames with `window.requestAnimationFrame`
pub struct RafScheduler {
    window: Window,
    closures: Rc<RefCell<RafClosures>>,
}

impl RafScheduler {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        Ok(Self {
            window,
            closures: Rc::new(RefCell::new(RafClosures::default())),
        })
    }
}

impl Scheduler for RafScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let id = Rc::new(std::cell::Cell::new(0));
        let closures = Rc::downgrade(&self.closures);
        let my_id = id.clone();
        let closure = Closure::once(move |timestamp: f64| {
            if let Some(closures) = closures.upgrade() {
                let mut c = closures.borrow_mut();
                c.spent = c.live.remove(&my_id.get());
            }
            callback(timestamp);
        });

        match self.window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(raf_id) => {
                id.set(raf_id);
                self.closures.borrow_mut().live.insert(raf_id, closure);
                FrameHandle(raf_id as u64)
            }
            Err(err) => {
                log::warn!("requestAnimationFrame failed: {:?}", err);
                FrameHandle(0)
            }
        }
    }

    fn cancel(&self, handle: FrameHandle) {
        let id = handle.0 as i32;
        if self.closures.borrow_mut().live.remove(&id).is_some() {
            if let Err(err) = self.window.cancel_animation_frame(id) {
                log::warn!("cancelAnimationFrame failed: {:?}", err);
            }
        }
    }
}

/// `RenderSurface` over a canvas 2D context
///
/// The backing store is sized in device pixels and the base transform maps
/// CSS pixels onto it, so callers only ever see CSS pixels.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    css_size: (f64, f64),
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let mut surface = Self {
            canvas,
            ctx,
            css_size: (0.0, 0.0),
        };
        surface.fit_to_display();
        Ok(surface)
    }

    /// Match the backing store to the element's displayed size. Returns true
    /// when the size changed.
    pub fn fit_to_display(&mut self) -> bool {
        let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
        let css = (self.canvas.client_width() as f64, self.canvas.client_height() as f64);
        if css == self.css_size {
            return false;
        }
        self.css_size = css;
        self.canvas.set_width((css.0 * dpr) as u32);
        self.canvas.set_height((css.1 * dpr) as u32);
        // Resizing resets the context state, transform included
        if let Err(err) = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0) {
            log::warn!("set_transform failed: {:?}", err);
        }
        log::debug!("Canvas {}x{} CSS px at dpr {}", css.0, css.1, dpr);
        true
    }

    fn set_fill(&self, paint: &Paint) {
        match paint {
            Paint::Solid { color, alpha } => self.ctx.set_fill_style_str(&color.to_rgba(*alpha)),
            Paint::Linear { .. } => {
                if let Some(gradient) = self.gradient(paint) {
                    self.ctx.set_fill_style_canvas_gradient(&gradient);
                }
            }
        }
    }

    fn set_stroke(&self, paint: &Paint) {
        match paint {
            Paint::Solid { color, alpha } => self.ctx.set_stroke_style_str(&color.to_rgba(*alpha)),
            Paint::Linear { .. } => {
                if let Some(gradient) = self.gradient(paint) {
                    self.ctx.set_stroke_style_canvas_gradient(&gradient);
                }
            }
        }
    }

    fn gradient(&self, paint: &Paint) -> Option<web_sys::CanvasGradient> {
        let Paint::Linear { from, to, stops } = paint else {
            return None;
        };
        let gradient = self.ctx.create_linear_gradient(from.x, from.y, to.x, to.y);
        for stop in stops {
            if let Err(err) = gradient.add_color_stop(stop.offset as f32, &stop.color.to_rgba(stop.alpha)) {
                log::warn!("add_color_stop failed: {:?}", err);
                return None;
            }
        }
        Some(gradient)
    }
}

impl RenderSurface for CanvasSurface {
    fn size(&self) -> (f64, f64) {
        self.css_size
    }

    fn refresh_size(&mut self) {
        self.fit_to_display();
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, x: f64, y: f64) {
        if let Err(err) = self.ctx.translate(x, y) {
            log::warn!("translate failed: {:?}", err);
        }
    }

    fn scale(&mut self, factor: f64) {
        if let Err(err) = self.ctx.scale(factor, factor) {
            log::warn!("scale failed: {:?}", err);
        }
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
    }

    fn set_composite(&mut self, mode: CompositeMode) {
        if let Err(err) = self.ctx.set_global_composite_operation(mode.as_str()) {
            log::warn!("composite {} rejected: {:?}", mode.as_str(), err);
        }
    }

    fn set_shadow(&mut self, blur: f64, color: Color) {
        self.ctx.set_shadow_blur(blur);
        self.ctx.set_shadow_color(&color.to_hex());
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: &Paint) {
        self.set_fill(paint);
        self.ctx.fill_rect(x, y, w, h);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: &Paint, line_width: f64) {
        self.set_stroke(paint);
        self.ctx.set_line_width(line_width);
        self.ctx.stroke_rect(x, y, w, h);
    }

    fn fill_circle(&mut self, center: Vector2, radius: f64, paint: &Paint) {
        self.set_fill(paint);
        self.ctx.begin_path();
        if self.ctx.arc(center.x, center.y, radius, 0.0, TAU).is_ok() {
            self.ctx.fill();
        }
    }

    fn stroke_path(&mut self, points: &[Vector2], paint: &Paint, line_width: f64) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.set_stroke(paint);
        self.ctx.set_line_width(line_width);
        self.ctx.set_line_cap("round");
        self.ctx.set_line_join("round");
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        for p in rest {
            self.ctx.line_to(p.x, p.y);
        }
        self.ctx.stroke();
    }
}
