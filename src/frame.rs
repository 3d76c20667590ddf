//! Frame loop and scheduling
//!
//! The loop asks a `Scheduler` for the next frame, turns successive frame
//! timestamps (milliseconds) into a clamped `dt`, and drives the engine.
//! A browser host schedules on requestAnimationFrame; tests and the native
//! demo use `ManualScheduler`, which only fires when advanced.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

use crate::engine::Engine;

/// Callback invoked with the frame timestamp in milliseconds
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Identifies one pending frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Source of frame callbacks
pub trait Scheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle;

    /// Cancelling an unknown or already-fired handle is a no-op
    fn cancel(&self, handle: FrameHandle);
}

impl<S: Scheduler + ?Sized> Scheduler for Rc<S> {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        (**self).request_frame(callback)
    }

    fn cancel(&self, handle: FrameHandle) {
        (**self).cancel(handle)
    }
}

/// Deterministic scheduler driven by explicit `advance` calls
#[derive(Default)]
pub struct ManualScheduler {
    next_id: Cell<u64>,
    now: Cell<f64>,
    pending: RefCell<Vec<(FrameHandle, FrameCallback)>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock in milliseconds
    pub fn now(&self) -> f64 {
        self.now.get()
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Move the clock forward by `ms` and fire every callback that was
    /// pending beforehand. Returns how many fired.
    pub fn advance(&self, ms: f64) -> usize {
        self.now.set(self.now.get() + ms);
        // Callbacks re-enter request_frame, so take the batch first
        let due = std::mem::take(&mut *self.pending.borrow_mut());
        let fired = due.len();
        let now = self.now.get();
        for (_, callback) in due {
            callback(now);
        }
        fired
    }
}

impl Scheduler for ManualScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let handle = FrameHandle(id);
        self.pending.borrow_mut().push((handle, callback));
        handle
    }

    fn cancel(&self, handle: FrameHandle) {
        self.pending.borrow_mut().retain(|(h, _)| *h != handle);
    }
}

struct LoopInner<S> {
    scheduler: S,
    engine: RefCell<Engine>,
    pending: Cell<Option<FrameHandle>>,
    last_time: Cell<Option<f64>>,
    running: Cell<bool>,
}

/// Start/stop lifecycle around an `Engine`
pub struct FrameLoop<S: Scheduler + 'static> {
    inner: Rc<LoopInner<S>>,
}

impl<S: Scheduler + 'static> FrameLoop<S> {
    pub fn new(engine: Engine, scheduler: S) -> Self {
        Self {
            inner: Rc::new(LoopInner {
                scheduler,
                engine: RefCell::new(engine),
                pending: Cell::new(None),
                last_time: Cell::new(None),
                running: Cell::new(false),
            }),
        }
    }

    /// Begin a fresh match and schedule frames. Calling it while running
    /// restarts the match without stacking a second loop.
    ///
    /// Must not be called from inside an observer callback.
    pub fn start(&self) {
        let inner = &self.inner;
        if let Some(handle) = inner.pending.take() {
            inner.scheduler.cancel(handle);
        }
        match inner.engine.try_borrow_mut() {
            Ok(mut engine) => engine.start(),
            Err(_) => {
                log::warn!("start() ignored: engine is mid-frame");
                return;
            }
        }
        inner.last_time.set(None);
        inner.running.set(true);
        Self::schedule(inner);
        log::info!("Frame loop started");
    }

    /// Keep frames coming without starting a match, so the menu still
    /// renders. No-op while already running.
    pub fn run(&self) {
        let inner = &self.inner;
        if inner.running.get() {
            return;
        }
        inner.last_time.set(None);
        inner.running.set(true);
        Self::schedule(inner);
    }

    /// Cancel the pending frame. Safe to call when not running.
    pub fn stop(&self) {
        let inner = &self.inner;
        let was_running = inner.running.replace(false);
        if let Some(handle) = inner.pending.take() {
            inner.scheduler.cancel(handle);
        }
        if was_running {
            log::info!("Frame loop stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    pub fn engine(&self) -> Ref<'_, Engine> {
        self.inner.engine.borrow()
    }

    pub fn engine_mut(&self) -> RefMut<'_, Engine> {
        self.inner.engine.borrow_mut()
    }

    pub fn scheduler(&self) -> &S {
        &self.inner.scheduler
    }

    fn schedule(inner: &Rc<LoopInner<S>>) {
        let weak: Weak<LoopInner<S>> = Rc::downgrade(inner);
        let handle = inner.scheduler.request_frame(Box::new(move |timestamp| {
            if let Some(inner) = weak.upgrade() {
                Self::on_frame(&inner, timestamp);
            }
        }));
        inner.pending.set(Some(handle));
    }

    fn on_frame(inner: &Rc<LoopInner<S>>, timestamp: f64) {
        inner.pending.set(None);
        if !inner.running.get() {
            return;
        }
        let dt = match inner.last_time.replace(Some(timestamp)) {
            Some(last) => (timestamp - last) / 1000.0,
            None => 0.0,
        };
        inner.engine.borrow_mut().frame(dt);
        // An observer may have stopped the loop during the frame
        if inner.running.get() {
            Self::schedule(inner);
        }
    }
}

impl<S: Scheduler + 'static> Drop for FrameLoop<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::RecordingObserver;
    use crate::renderer::RecordingSurface;
    use crate::sim::GamePhase;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn setup() -> (FrameLoop<Rc<ManualScheduler>>, Rc<ManualScheduler>, RecordingObserver) {
        let recorder = RecordingObserver::new();
        let engine = Engine::new(
            Some(Box::new(RecordingSurface::new(800.0, 800.0))),
            Box::new(recorder.clone()),
        )
        .with_seed(5);
        let scheduler = Rc::new(ManualScheduler::new());
        (FrameLoop::new(engine, scheduler.clone()), scheduler, recorder)
    }

    #[test]
    fn test_manual_scheduler_cancel() {
        let scheduler = ManualScheduler::new();
        let fired = Rc::new(Cell::new(0));
        let f = fired.clone();
        let keep = scheduler.request_frame(Box::new(move |_| f.set(f.get() + 1)));
        let f = fired.clone();
        let drop_me = scheduler.request_frame(Box::new(move |_| f.set(f.get() + 10)));
        assert_ne!(keep, drop_me);
        scheduler.cancel(drop_me);
        assert_eq!(scheduler.advance(16.0), 1);
        assert_eq!(fired.get(), 1);
        assert_eq!(scheduler.now(), 16.0);
        assert_eq!(scheduler.advance(16.0), 0);
    }

    #[test]
    fn test_first_frame_has_zero_dt() {
        let (frame_loop, scheduler, _) = setup();
        frame_loop.start();
        scheduler.advance(FRAME_MS);
        assert_eq!(frame_loop.engine().state().elapsed, 0.0);
        assert_eq!(frame_loop.engine().state().time_ticks, 1);
        scheduler.advance(FRAME_MS);
        let elapsed = frame_loop.engine().state().elapsed;
        assert!((elapsed - FRAME_MS / 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_long_pause_is_clamped() {
        let (frame_loop, scheduler, _) = setup();
        frame_loop.start();
        scheduler.advance(FRAME_MS);
        // Tab was hidden for five seconds
        scheduler.advance(5000.0);
        assert!((frame_loop.engine().state().elapsed - crate::consts::MAX_DT).abs() < 1e-12);
    }

    #[test]
    fn test_run_idles_in_menu() {
        let (frame_loop, scheduler, recorder) = setup();
        frame_loop.run();
        frame_loop.run();
        assert_eq!(scheduler.pending(), 1);
        for _ in 0..10 {
            scheduler.advance(FRAME_MS);
        }
        assert_eq!(frame_loop.engine().phase(), GamePhase::Menu);
        assert!(recorder.events().is_empty());

        frame_loop.start();
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(frame_loop.engine().phase(), GamePhase::Playing);
    }

    #[test]
    fn test_stop_prevents_further_frames() {
        let (frame_loop, scheduler, _) = setup();
        frame_loop.start();
        for _ in 0..3 {
            scheduler.advance(FRAME_MS);
        }
        frame_loop.stop();
        assert!(!frame_loop.is_running());
        assert_eq!(scheduler.pending(), 0);
        let ticks = frame_loop.engine().state().time_ticks;
        scheduler.advance(FRAME_MS);
        assert_eq!(frame_loop.engine().state().time_ticks, ticks);
        // Stopping twice is harmless
        frame_loop.stop();
    }

    #[test]
    fn test_double_start_keeps_one_loop() {
        let (frame_loop, scheduler, recorder) = setup();
        frame_loop.start();
        frame_loop.start();
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(recorder.phases(), vec![GamePhase::Playing, GamePhase::Playing]);
        scheduler.advance(FRAME_MS);
        assert_eq!(frame_loop.engine().state().time_ticks, 1);
    }

    #[test]
    fn test_restart_resets_session_stats() {
        let (frame_loop, scheduler, recorder) = setup();
        frame_loop.start();
        for _ in 0..30 {
            scheduler.advance(FRAME_MS);
        }
        let before = recorder.last_stats().unwrap();
        assert!(before.time_survived > 0.0);

        frame_loop.stop();
        recorder.clear();
        frame_loop.start();
        {
            let engine = frame_loop.engine();
            let state = engine.state();
            assert_eq!(state.elapsed, 0.0);
            assert_eq!(state.max_speed, 0.0);
            assert_eq!(state.max_gravity, 0.0);
            assert_eq!(state.enemy_count(), state.tuning.enemy_count);
        }
        for _ in 0..5 {
            scheduler.advance(FRAME_MS);
        }
        let after = recorder.last_stats().unwrap();
        assert!(after.time_survived < before.time_survived);
        assert_eq!(after.initial_enemies, frame_loop.engine().state().tuning.enemy_count);
    }

    #[test]
    fn test_dropping_loop_cancels_frame() {
        let (frame_loop, scheduler, _) = setup();
        frame_loop.start();
        drop(frame_loop);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.advance(FRAME_MS), 0);
    }
}
