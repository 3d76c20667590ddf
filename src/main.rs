//! Grav Arena entry point
//!
//! Browser: wires the canvas, keyboard and requestAnimationFrame loop.
//! Native: runs a seeded headless match on a manual clock and logs it.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use grav_arena::platform::web::{CanvasSurface, RafScheduler};
    use grav_arena::sim::is_start_key;
    use grav_arena::{Engine, FrameLoop, GamePhase, GameStats, Settings};

    fn set_text(id: &str, text: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            el.set_text_content(Some(text));
        }
    }

    fn show_phase(phase: GamePhase) {
        log::info!("Phase: {:?}", phase);
        let banner = match phase {
            GamePhase::Menu => "Press Enter to start",
            GamePhase::Playing => "",
            GamePhase::GameOver => "Eliminated - press Enter to retry",
            GamePhase::Victory => "Victory - press Enter to play again",
        };
        set_text("banner", banner);
    }

    fn show_stats(stats: &GameStats) {
        set_text(
            "hud",
            &format!(
                "speed {:.0} (max {:.0}) | gravity {:.0} (max {:.0}) | enemies {}/{} | {:.1}s | danger {:.0}%",
                stats.speed,
                stats.max_speed,
                stats.gravity_force,
                stats.max_gravity,
                stats.current_enemies,
                stats.initial_enemies,
                stats.time_survived,
                stats.danger_level,
            ),
        );
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Grav Arena starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()
            .map_err(|_| JsValue::from_str("not a canvas"))?;

        let surface = CanvasSurface::new(canvas)?;
        let seed = js_sys::Date::now() as u64;
        let engine = Engine::with_callbacks(Some(Box::new(surface)), show_phase, show_stats)
            .with_seed(seed)
            .with_settings(Settings::load());
        log::info!("Engine initialized with seed: {}", seed);

        let frame_loop = Rc::new(FrameLoop::new(engine, RafScheduler::new()?));
        setup_keyboard(&window, frame_loop.clone())?;

        show_phase(GamePhase::Menu);
        // Menu renders until the first start key
        frame_loop.run();

        // The page owns the loop for its whole lifetime
        std::mem::forget(frame_loop);
        log::info!("Grav Arena running!");
        Ok(())
    }

    fn setup_keyboard(window: &web_sys::Window, frame_loop: Rc<FrameLoop<RafScheduler>>) -> Result<(), JsValue> {
        for (event_name, pressed) in [("keydown", true), ("keyup", false)] {
            let frame_loop = frame_loop.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let key = event.key();
                let phase = {
                    let mut engine = frame_loop.engine_mut();
                    if pressed && (key == "q" || key == "Q") {
                        let mut settings = engine.settings().clone();
                        settings.apply_preset(settings.quality.next());
                        settings.save();
                        log::info!("Quality: {}", settings.quality.as_str());
                        engine.set_settings(settings);
                    }
                    let mut input = *engine.input();
                    if input.apply_key(&key, pressed) {
                        engine.handle_input(input);
                        event.prevent_default();
                    }
                    engine.phase()
                };
                if pressed && is_start_key(&key) && phase != GamePhase::Playing {
                    event.prevent_default();
                    frame_loop.start();
                }
            });
            window.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::rc::Rc;
    use std::sync::mpsc;

    use grav_arena::engine::DEFAULT_SEED;
    use grav_arena::{Engine, FrameLoop, GameEvent, GamePhase, InputSnapshot, ManualScheduler, Tuning, Vector2};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 180;

    /// Hold the player near the middle of the arena with the joystick
    fn hold_center(engine: &Engine) -> InputSnapshot {
        let state = engine.state();
        let Some(player) = state.player() else {
            return InputSnapshot::default();
        };
        let to_center = state.arena.center() - player.pos;
        let correction = to_center / 200.0 - player.vel / 400.0;
        InputSnapshot {
            analog: Some(correction.clamp_length_max(1.0)),
            ..Default::default()
        }
    }

    fn load_tuning() -> Tuning {
        let Some(path) = std::env::args().nth(1) else {
            return Tuning::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => Tuning::from_json_or_default(&json),
            Err(e) => {
                log::warn!("Could not read tuning file {}: {}", path, e);
                Tuning::default()
            }
        }
    }

    pub fn run() {
        let seed = std::env::var("GRAV_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SEED);
        log::info!("Headless match with seed {}", seed);

        let (tx, rx) = mpsc::channel::<GameEvent>();
        let engine = Engine::new(None, Box::new(tx)).with_seed(seed).with_tuning(load_tuning());
        let scheduler = Rc::new(ManualScheduler::new());
        let frame_loop = FrameLoop::new(engine, scheduler.clone());
        frame_loop.start();

        let mut outcome = GamePhase::Playing;
        for _ in 0..MAX_FRAMES {
            let input = hold_center(&frame_loop.engine());
            frame_loop.engine_mut().handle_input(input);
            scheduler.advance(FRAME_MS);

            for event in rx.try_iter() {
                match event {
                    GameEvent::PhaseChanged(phase) => {
                        log::info!("Phase -> {:?}", phase);
                        outcome = phase;
                    }
                    GameEvent::Stats(stats) => log::debug!(
                        "t={:.2}s speed={:.1} gravity={:.1} enemies={}/{} danger={:.0}",
                        stats.time_survived,
                        stats.speed,
                        stats.gravity_force,
                        stats.current_enemies,
                        stats.initial_enemies,
                        stats.danger_level
                    ),
                    GameEvent::Eliminated { id, role, pos } => {
                        log::info!("{:?} #{} left the arena at ({:.0}, {:.0})", role, id, pos.x, pos.y)
                    }
                }
            }
            if outcome != GamePhase::Playing {
                break;
            }
        }
        frame_loop.stop();

        let engine = frame_loop.engine();
        let state = engine.state();
        let last: Vector2 = state.player().map(|p| p.pos).unwrap_or_default();
        log::info!(
            "Finished: {:?} after {:.1}s, max speed {:.0}, max gravity {:.0}, {} of {} enemies left, player at ({:.0}, {:.0})",
            outcome,
            state.elapsed,
            state.max_speed,
            state.max_gravity,
            state.enemy_count(),
            state.initial_enemies,
            last.x,
            last.y
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
