//! Ball spawner and difficulty progression
//!
//! The spawn task speeds up by a fixed step every time it fires until it
//! reaches the floor. A one-shot override then pins the cadence to a fixed
//! period, replacing the ramp entirely.

use glam::Vec2;
use rand::Rng;

use super::scheduler::{Scheduler, TaskKind};
use super::state::{Ball, GameEvent, GameState};
use crate::tuning::Tuning;

/// Next interval in the ramp, or `None` if already at the floor
pub fn next_interval(current_ms: u32, tuning: &Tuning) -> Option<u32> {
    if current_ms > tuning.min_spawn_interval_ms {
        Some(
            current_ms
                .saturating_sub(tuning.spawn_interval_step_ms)
                .max(tuning.min_spawn_interval_ms),
        )
    } else {
        None
    }
}

/// Arm the spawn task and the progression override for a fresh game
pub fn begin(state: &mut GameState, scheduler: &mut Scheduler, tuning: &Tuning) {
    state.spawn_interval_ms = tuning.initial_spawn_interval_ms;
    state.progression_overridden = false;
    state.spawn_timer = Some(scheduler.set_interval(TaskKind::Spawn, state.spawn_interval_ms));
    state.override_timer = Some(
        scheduler.set_timeout(TaskKind::ProgressionOverride, tuning.progression_override_after_ms),
    );
}

/// Replace the spawn task with one at `period_ms`
fn rearm(state: &mut GameState, scheduler: &mut Scheduler, period_ms: u32) {
    if let Some(old) = state.spawn_timer.take() {
        scheduler.cancel(old);
    }
    state.spawn_interval_ms = period_ms;
    state.spawn_timer = Some(scheduler.set_interval(TaskKind::Spawn, period_ms));
}

/// Put a ball at `x` on the top edge and start its fall task
pub fn insert_ball(
    state: &mut GameState,
    scheduler: &mut Scheduler,
    tuning: &Tuning,
    x: f32,
    horizontal_speed: f32,
) -> u32 {
    let id = state.next_ball_id();
    let x = x.clamp(0.0, state.ball_max_x(tuning.ball_size));
    let fall_timer = scheduler.set_interval(TaskKind::Fall { ball_id: id }, tuning.fall_tick_ms);
    state.balls.push(Ball {
        id,
        pos: Vec2::new(x, 0.0),
        horizontal_speed,
        fall_timer: Some(fall_timer),
    });
    log::debug!("Ball {} created at x={:.1}", id, x);
    id
}

/// Spawn task fired: create a ball, then step the ramp
pub fn on_spawn(
    state: &mut GameState,
    scheduler: &mut Scheduler,
    tuning: &Tuning,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    let x = rng.random::<f32>() * state.ball_max_x(tuning.ball_size);
    let speed = if rng.random_bool(0.5) {
        -tuning.ball_drift
    } else {
        tuning.ball_drift
    };
    let id = insert_ball(state, scheduler, tuning, x, speed);
    events.push(GameEvent::BallSpawned { id });

    if state.progression_overridden {
        return;
    }
    if let Some(next) = next_interval(state.spawn_interval_ms, tuning) {
        rearm(state, scheduler, next);
        events.push(GameEvent::SpawnIntervalChanged(next));
        log::debug!("Spawn interval updated: {} ms", next);
    }
}

/// Override timeout fired: drop the ramp and spawn at a fixed cadence
pub fn on_override(
    state: &mut GameState,
    scheduler: &mut Scheduler,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    state.override_timer = None;
    state.progression_overridden = true;
    rearm(state, scheduler, tuning.override_spawn_interval_ms);
    events.push(GameEvent::SpawnIntervalChanged(tuning.override_spawn_interval_ms));
    log::info!(
        "Spawn cadence pinned to {} ms",
        tuning.override_spawn_interval_ms
    );
}
