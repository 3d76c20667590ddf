//! Engine facade
//!
//! Owns the match, the latest input snapshot, the render surface and the
//! observer. One `frame` call runs a full update and then a render.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::observer::{Callbacks, GameObserver, dispatch};
use crate::renderer::{RenderSurface, draw_frame};
use crate::settings::Settings;
use crate::sim::{Arena, GamePhase, GameState, GameStats, InputSnapshot, Viewport, tick};
use crate::tuning::Tuning;

/// Seed used when the host does not supply one
pub const DEFAULT_SEED: u64 = 0x6772_6176;

pub struct Engine {
    state: GameState,
    input: InputSnapshot,
    settings: Settings,
    surface: Option<Box<dyn RenderSurface>>,
    observer: Box<dyn GameObserver>,
    /// Cosmetic randomness (shake jitter) kept apart from the simulation RNG
    fx_rng: Pcg32,
    viewport: Option<Viewport>,
}

impl Engine {
    /// `surface` may be `None` (or zero-sized) until the host has one ready;
    /// rendering is skipped in the meantime.
    pub fn new(surface: Option<Box<dyn RenderSurface>>, observer: Box<dyn GameObserver>) -> Self {
        Self {
            state: GameState::new(DEFAULT_SEED, Tuning::default(), Arena::default()),
            input: InputSnapshot::default(),
            settings: Settings::default(),
            surface,
            observer,
            fx_rng: Pcg32::seed_from_u64(DEFAULT_SEED ^ 0xFF),
            viewport: None,
        }
    }

    /// Construct from a state-change callback and a stats callback
    pub fn with_callbacks<S, T>(surface: Option<Box<dyn RenderSurface>>, on_state: S, on_stats: T) -> Self
    where
        S: FnMut(GamePhase) + 'static,
        T: FnMut(&GameStats) + 'static,
    {
        Self::new(surface, Box::new(Callbacks { on_state, on_stats }))
    }

    /// Reseed both the simulation and the effects RNG
    pub fn with_seed(mut self, seed: u64) -> Self {
        let tuning = self.state.tuning.clone();
        self.state = GameState::new(seed, tuning, self.state.arena);
        self.fx_rng = Pcg32::seed_from_u64(seed ^ 0xFF);
        self
    }

    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.state = GameState::new(self.state.seed, tuning, self.state.arena);
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Swap settings mid-match; the particle cap applies from the next tick
    pub fn set_settings(&mut self, settings: Settings) {
        self.state.max_particles = settings.max_particles();
        self.settings = settings;
    }

    pub fn set_surface(&mut self, surface: Box<dyn RenderSurface>) {
        self.surface = Some(surface);
        self.viewport = None;
    }

    /// Store the latest merged input (last write wins)
    pub fn handle_input(&mut self, input: InputSnapshot) {
        self.input = input;
    }

    pub fn input(&self) -> &InputSnapshot {
        &self.input
    }

    /// Reset every session value and begin a new match
    pub fn start(&mut self) {
        self.refit();
        self.state.max_particles = self.settings.max_particles();
        self.state.start();
        self.flush_events();
    }

    /// Refit the logical arena to a new surface size (CSS pixels)
    pub fn resize(&mut self, width: f64, height: f64) {
        let viewport = Viewport::fit(width, height);
        if viewport.is_empty() {
            return;
        }
        if self.viewport != Some(viewport) {
            let arena = viewport.arena();
            log::debug!(
                "Viewport {}x{} -> arena {:.0}x{:.0} (scale {:.3})",
                width,
                height,
                arena.width,
                arena.height,
                viewport.scale
            );
            self.state.arena = arena;
            self.viewport = Some(viewport);
        }
    }

    fn refit(&mut self) {
        if let Some((w, h)) = self.surface.as_mut().map(|s| {
            s.refresh_size();
            s.size()
        }) {
            self.resize(w, h);
        }
    }

    /// Advance the simulation by `dt` seconds and notify the observer
    pub fn update(&mut self, dt: f64) {
        tick(&mut self.state, &self.input, dt);
        self.flush_events();
    }

    /// Draw the current state. Returns false when there is nothing to draw on.
    pub fn render(&mut self) -> bool {
        self.refit();
        match self.surface.as_mut() {
            Some(surface) => draw_frame(&self.state, surface.as_mut(), &self.settings, &mut self.fx_rng),
            None => false,
        }
    }

    /// Update, then render
    pub fn frame(&mut self, dt: f64) {
        self.update(dt);
        self.render();
    }

    fn flush_events(&mut self) {
        for event in self.state.drain_events() {
            dispatch(self.observer.as_mut(), &event);
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Get mutable game state (for testing)
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
