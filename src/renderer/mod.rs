//! Rendering module
//!
//! Draws the simulation through an abstract canvas-like surface so the
//! core stays independent of any particular graphics backend.

pub mod draw;
pub mod surface;

pub use draw::draw_frame;
pub use surface::{CompositeMode, DrawCommand, Paint, RecordingSurface, RenderSurface, Stop};
