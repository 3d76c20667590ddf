//! Per-frame simulation tick
//!
//! Order within a playing tick:
//! 1. wall braking factors
//! 2. player thrust
//! 3. CPU steering
//! 4. pairwise gravity
//! 5. integration
//! 6. elimination (strictly after every body has moved)
//! 7. victory check, stats

use rand::Rng;

use super::cpu::{self, CpuDecision};
use super::entity::Entity;
use super::gravity::{self, GravityLaw};
use super::input::{InputSnapshot, braked_force};
use super::particle::{cap_particles, exhaust, update_particles};
use super::state::{GameEvent, GamePhase, GameState};
use super::stats::{GameStats, danger_level};
use crate::clamp_dt;

/// Player exhaust strength used for CPU bodies
const CPU_EXHAUST_THRUST: f64 = 0.8;

/// Advance the game state by `dt` seconds (clamped to `MAX_DT`)
pub fn tick(state: &mut GameState, input: &InputSnapshot, dt: f64) {
    let dt = clamp_dt(dt);

    state.effects.decay();

    // Effects keep animating outside a match; physics does not
    if state.phase != GamePhase::Playing {
        update_particles(&mut state.particles, dt);
        return;
    }

    let arena = state.arena;
    let tuning = &state.tuning;

    // --- WALL BRAKING ---
    for e in state.entities.iter_mut() {
        e.braking = arena.braking_factor(e.pos, tuning.wall_margin, tuning.brake_boost);
    }

    let player_idx = state.player_index();
    let mut min_danger = f64::INFINITY;

    // --- PLAYER THRUST ---
    if let Some(idx) = player_idx {
        let player = &mut state.entities[idx];
        let (_, wall_dist) = arena.nearest_edge(player.pos);
        min_danger = min_danger.min(wall_dist);

        let thrust = input.thrust();
        if thrust.is_active() {
            let force = braked_force(
                thrust.direction,
                tuning.thrust_force * thrust.magnitude,
                player.vel,
                tuning.braking_constant,
                player.braking,
            );
            player.apply_force(force);

            let puffs = (thrust.magnitude * 3.0).floor() as usize;
            let extra = state.rng.random::<f64>() < thrust.magnitude.fract();
            for _ in 0..puffs + usize::from(extra) {
                state.particles.push(exhaust(
                    player.pos,
                    player.radius,
                    player.color(),
                    thrust.direction,
                    thrust.magnitude,
                    &mut state.rng,
                ));
            }
        }
    }

    // --- CPU STEERING ---
    // Decisions only read positions, so they are all taken before any is applied
    let decisions: Vec<(usize, CpuDecision)> = state
        .entities
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.is_player())
        .map(|(i, _)| (i, cpu::steer(i, &state.entities, &arena, tuning)))
        .collect();

    for (i, decision) in decisions {
        let body = &mut state.entities[i];
        body.braking = decision.braking;
        body.apply_force(decision.force(body.vel, tuning));

        if decision.thrust.length_squared() > 0.0 && state.rng.random::<f64>() < tuning.cpu_exhaust_chance {
            state.particles.push(exhaust(
                body.pos,
                body.radius,
                body.color(),
                decision.thrust,
                CPU_EXHAUST_THRUST,
                &mut state.rng,
            ));
        }
    }

    // --- GRAVITY ---
    let report = gravity::accumulate(&mut state.entities, &GravityLaw::from_tuning(tuning));
    min_danger = min_danger.min(report.min_player_gap);

    // --- INTEGRATION ---
    for e in state.entities.iter_mut() {
        e.integrate(dt);
    }

    let player_vel = player_idx.map(|idx| state.entities[idx].vel);

    // --- ELIMINATION ---
    let (alive, out): (Vec<Entity>, Vec<Entity>) =
        std::mem::take(&mut state.entities).into_iter().partition(|e| arena.contains(e.pos));
    state.entities = alive;
    for e in &out {
        state.eliminate_effect(e);
        if e.is_player() && state.phase == GamePhase::Playing {
            state.set_phase(GamePhase::GameOver);
        }
    }

    // --- PARTICLES ---
    update_particles(&mut state.particles, dt);
    cap_particles(&mut state.particles, state.max_particles);

    // --- RECORDS ---
    if let Some(vel) = player_vel {
        state.max_speed = state.max_speed.max(vel.length());
        state.max_gravity = state.max_gravity.max(report.player_force);
    }

    // --- VICTORY ---
    if state.phase == GamePhase::Playing && state.entities.len() == 1 && state.entities[0].is_player() {
        state.set_phase(GamePhase::Victory);
    }

    state.elapsed += dt;
    state.time_ticks += 1;

    // --- STATS (throttled) ---
    if let Some(vel) = player_vel {
        let interval = state.tuning.stats_interval.max(1);
        if state.time_ticks % interval == 0 {
            let stats = GameStats {
                speed: vel.length(),
                max_speed: state.max_speed,
                gravity_force: report.player_force,
                max_gravity: state.max_gravity,
                current_enemies: state.enemy_count(),
                initial_enemies: state.initial_enemies,
                time_survived: state.elapsed,
                danger_level: danger_level(min_danger),
            };
            state.push_event(GameEvent::Stats(stats));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector2;
    use crate::sim::arena::Arena;
    use crate::sim::entity::Role;
    use crate::tuning::Tuning;

    const DT: f64 = 1.0 / 60.0;

    fn started(seed: u64) -> GameState {
        let mut state = GameState::new(seed, Tuning::default(), Arena::new(800.0, 800.0));
        state.start();
        state.drain_events();
        state
    }

    fn phase_changes(events: &[GameEvent]) -> Vec<GamePhase> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::PhaseChanged(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_menu_runs_no_physics() {
        let mut state = GameState::new(1, Tuning::default(), Arena::default());
        tick(&mut state, &InputSnapshot::default(), DT);
        assert_eq!(state.phase, GamePhase::Menu);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_player_out_of_bounds_game_over_once() {
        let mut state = started(11);
        let idx = state.player_index().unwrap();
        state.entities[idx].pos = Vector2::new(-50.0, 400.0);

        tick(&mut state, &InputSnapshot::default(), DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.player().is_none());
        let events = state.drain_events();
        assert_eq!(phase_changes(&events), vec![GamePhase::GameOver]);
        let player_eliminations = events
            .iter()
            .filter(|e| matches!(e, GameEvent::Eliminated { role: Role::Player, .. }))
            .count();
        assert_eq!(player_eliminations, 1);

        for _ in 0..10 {
            tick(&mut state, &InputSnapshot::default(), DT);
        }
        let later = state.drain_events();
        assert!(later.is_empty());
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_last_body_standing_wins() {
        let mut state = started(12);
        state.entities.retain(|e| e.is_player());
        tick(&mut state, &InputSnapshot::default(), DT);
        assert_eq!(state.phase, GamePhase::Victory);
        assert_eq!(phase_changes(&state.drain_events()), vec![GamePhase::Victory]);
        // Victory burst is still in flight
        assert!(!state.particles.is_empty());
    }

    #[test]
    fn test_boundary_is_alive() {
        let mut state = started(13);
        state.entities.truncate(2);
        let cpu = &mut state.entities[1];
        // After one step the body sits exactly on the right edge
        cpu.pos = Vector2::new(800.0, 400.0);
        cpu.vel = Vector2::ZERO;
        state.tuning.gravity_constant = 0.0;
        state.tuning.cpu_thrust_force = 0.0;
        state.tuning.cpu_avoidance_force = 0.0;

        tick(&mut state, &InputSnapshot::default(), DT);
        assert_eq!(state.entities.len(), 2);
        assert_eq!(state.entities[1].pos.x, 800.0);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_cpu_eliminated_after_integration() {
        let mut state = started(14);
        state.entities.truncate(3);
        state.tuning.gravity_constant = 0.0;
        state.tuning.cpu_thrust_force = 0.0;
        state.tuning.cpu_avoidance_force = 0.0;
        // Inside now, outside after moving
        state.entities[1].pos = Vector2::new(799.0, 400.0);
        state.entities[1].vel = Vector2::new(120.0, 0.0);
        // Outside now, back inside after moving
        state.entities[2].pos = Vector2::new(-1.0, 400.0);
        state.entities[2].vel = Vector2::new(120.0, 0.0);
        let gone = state.entities[1].id;

        tick(&mut state, &InputSnapshot::default(), DT);
        assert_eq!(state.entities.len(), 2);
        assert!(state.entities.iter().all(|e| e.id != gone));
        assert!(state.drain_events().iter().any(|e| matches!(e, GameEvent::Eliminated { id, .. } if *id == gone)));
        assert!(state.effects.shake >= 49.0);
    }

    #[test]
    fn test_player_thrust_accelerates_and_emits() {
        let mut state = started(15);
        state.entities.retain(|e| e.is_player());
        // Keep the match running with a distant, inert CPU
        let id = state.next_entity_id();
        state.entities.push(Entity::new(id, Vector2::new(700.0, 700.0), Role::Cpu, 12.0, 10.0, 4));
        state.tuning.gravity_constant = 0.0;
        state.tuning.cpu_thrust_force = 0.0;
        state.tuning.cpu_exhaust_chance = 0.0;

        let input = InputSnapshot {
            right: true,
            ..Default::default()
        };
        tick(&mut state, &input, DT);
        let player = state.player().unwrap();
        // a = 1500 / 10
        assert!((player.vel.x - 150.0 * DT).abs() < 1e-9);
        assert_eq!(player.vel.y, 0.0);
        assert_eq!(state.particles.len(), 3);
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut state = started(16);
        state.entities.retain(|e| e.is_player());
        let id = state.next_entity_id();
        state.entities.push(Entity::new(id, Vector2::new(700.0, 700.0), Role::Cpu, 12.0, 10.0, 4));
        state.tuning.gravity_constant = 0.0;
        state.tuning.cpu_thrust_force = 0.0;
        state.entities[0].vel = Vector2::new(10.0, 0.0);

        tick(&mut state, &InputSnapshot::default(), 5.0);
        assert!((state.elapsed - 0.1).abs() < 1e-12);
        assert!((state.entities[0].pos.x - 401.0).abs() < 1e-9);
    }

    #[test]
    fn test_stats_throttled_and_reset_on_restart() {
        let mut state = started(17);
        for _ in 0..10 {
            tick(&mut state, &InputSnapshot::default(), DT);
            if state.phase != GamePhase::Playing {
                break;
            }
        }
        let stats: Vec<GameStats> = state
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::Stats(s) => Some(s),
                _ => None,
            })
            .collect();
        assert_eq!(stats.len(), 2);
        let last = stats[1];
        assert_eq!(last.initial_enemies, 7);
        assert!((last.time_survived - 10.0 * DT).abs() < 1e-9);
        assert!(last.gravity_force > 0.0);
        assert!(last.max_gravity >= last.gravity_force);
        assert!((0.0..=100.0).contains(&last.danger_level));

        state.start();
        assert_eq!(state.elapsed, 0.0);
        assert_eq!(state.max_speed, 0.0);
        assert_eq!(state.max_gravity, 0.0);
    }

    #[test]
    fn test_accumulator_cleared_each_tick() {
        let mut state = started(18);
        tick(&mut state, &InputSnapshot::default(), DT);
        assert!(state.entities.iter().all(|e| e.acc == Vector2::ZERO));
        assert!(state.entities.iter().all(|e| e.trail.len() == 1));
    }

    #[test]
    fn test_particles_age_after_match() {
        let mut state = started(19);
        state.entities.retain(|e| e.is_player());
        tick(&mut state, &InputSnapshot::default(), DT);
        assert_eq!(state.phase, GamePhase::Victory);
        let before = state.particles.len();
        for _ in 0..200 {
            tick(&mut state, &InputSnapshot::default(), 0.05);
        }
        assert!(before > 0);
        assert!(state.particles.is_empty());
        assert!(state.effects.is_idle());
    }

    #[test]
    fn test_same_seed_same_match() {
        let mut a = started(99);
        let mut b = started(99);
        let input = InputSnapshot {
            up: true,
            left: true,
            ..Default::default()
        };
        for _ in 0..30 {
            tick(&mut a, &input, DT);
            tick(&mut b, &input, DT);
        }
        assert_eq!(a.entities.len(), b.entities.len());
        for (ea, eb) in a.entities.iter().zip(&b.entities) {
            assert_eq!(ea.pos, eb.pos);
        }
        assert_eq!(a.particles.len(), b.particles.len());
    }
}
