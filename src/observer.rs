//! Outbound notifications: phase changes and periodic stats
//!
//! The engine never talks to a UI directly. Hosts plug in a `GameObserver`,
//! a pair of closures, or an mpsc sender for a message-passing design.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::Sender;

use crate::Vector2;
use crate::sim::{GameEvent, GamePhase, GameStats, Role};

/// Receives match notifications
pub trait GameObserver {
    fn on_state_change(&mut self, phase: GamePhase);

    fn on_stats(&mut self, stats: &GameStats);

    /// A body left the arena
    fn on_eliminated(&mut self, _id: u32, _role: Role, _pos: Vector2) {}
}

/// Route one event to the matching observer method
pub fn dispatch(observer: &mut dyn GameObserver, event: &GameEvent) {
    match event {
        GameEvent::PhaseChanged(phase) => observer.on_state_change(*phase),
        GameEvent::Stats(stats) => observer.on_stats(stats),
        GameEvent::Eliminated { id, role, pos } => observer.on_eliminated(*id, *role, *pos),
    }
}

/// Observer that ignores everything
#[derive(Debug, Default)]
pub struct NullObserver;

impl GameObserver for NullObserver {
    fn on_state_change(&mut self, _phase: GamePhase) {}
    fn on_stats(&mut self, _stats: &GameStats) {}
}

/// Observer built from a state-change closure and a stats closure
pub struct Callbacks<S, T> {
    pub on_state: S,
    pub on_stats: T,
}

impl<S, T> GameObserver for Callbacks<S, T>
where
    S: FnMut(GamePhase),
    T: FnMut(&GameStats),
{
    fn on_state_change(&mut self, phase: GamePhase) {
        (self.on_state)(phase);
    }

    fn on_stats(&mut self, stats: &GameStats) {
        (self.on_stats)(stats);
    }
}

/// Forward everything down a channel. A disconnected receiver is ignored.
impl GameObserver for Sender<GameEvent> {
    fn on_state_change(&mut self, phase: GamePhase) {
        let _ = self.send(GameEvent::PhaseChanged(phase));
    }

    fn on_stats(&mut self, stats: &GameStats) {
        let _ = self.send(GameEvent::Stats(*stats));
    }

    fn on_eliminated(&mut self, id: u32, role: Role, pos: Vector2) {
        let _ = self.send(GameEvent::Eliminated { id, role, pos });
    }
}

/// Shared in-memory log of every event, cloned into the engine for tests
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Rc<RefCell<Vec<GameEvent>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<GameEvent> {
        self.events.borrow().clone()
    }

    pub fn phases(&self) -> Vec<GamePhase> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                GameEvent::PhaseChanged(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    pub fn stats(&self) -> Vec<GameStats> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                GameEvent::Stats(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    pub fn last_stats(&self) -> Option<GameStats> {
        self.stats().last().copied()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl GameObserver for RecordingObserver {
    fn on_state_change(&mut self, phase: GamePhase) {
        self.events.borrow_mut().push(GameEvent::PhaseChanged(phase));
    }

    fn on_stats(&mut self, stats: &GameStats) {
        self.events.borrow_mut().push(GameEvent::Stats(*stats));
    }

    fn on_eliminated(&mut self, id: u32, role: Role, pos: Vector2) {
        self.events.borrow_mut().push(GameEvent::Eliminated { id, role, pos });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_callbacks_receive_dispatch() {
        let mut phases = Vec::new();
        let mut speeds = Vec::new();
        {
            let mut observer = Callbacks {
                on_state: |p: GamePhase| phases.push(p),
                on_stats: |s: &GameStats| speeds.push(s.speed),
            };
            dispatch(&mut observer, &GameEvent::PhaseChanged(GamePhase::Victory));
            dispatch(
                &mut observer,
                &GameEvent::Stats(GameStats {
                    speed: 3.0,
                    ..Default::default()
                }),
            );
            // Callbacks have no elimination hook
            dispatch(
                &mut observer,
                &GameEvent::Eliminated {
                    id: 2,
                    role: Role::Cpu,
                    pos: Vector2::ZERO,
                },
            );
        }
        assert_eq!(phases, vec![GamePhase::Victory]);
        assert_eq!(speeds, vec![3.0]);
    }

    #[test]
    fn test_channel_observer() {
        let (tx, rx) = mpsc::channel::<GameEvent>();
        let mut observer = tx;
        dispatch(&mut observer, &GameEvent::PhaseChanged(GamePhase::Playing));
        assert_eq!(rx.try_recv().unwrap(), GameEvent::PhaseChanged(GamePhase::Playing));

        drop(rx);
        // Sending into a closed channel is silently dropped
        observer.on_state_change(GamePhase::GameOver);
    }

    #[test]
    fn test_recording_shares_log() {
        let recorder = RecordingObserver::new();
        let mut handle = recorder.clone();
        handle.on_state_change(GamePhase::Playing);
        handle.on_stats(&GameStats::default());
        assert_eq!(recorder.phases(), vec![GamePhase::Playing]);
        assert_eq!(recorder.stats().len(), 1);
        recorder.clear();
        assert!(recorder.events().is_empty());
    }
}
