//! Platform abstraction layer
//!
//! Browser implementations of the frame scheduler and the render surface.
//! Native builds drive the engine with `ManualScheduler` and a
//! `RecordingSurface` instead.

#[cfg(target_arch = "wasm32")]
pub mod web;
