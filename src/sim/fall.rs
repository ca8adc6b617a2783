//! Per-ball fall tick
//!
//! Each ball owns one repeating fall task. A tick either moves the ball or,
//! once it reaches the collision band, settles it: a miss scores a point, a
//! hit ends the game. Either way the ball and its task are gone afterwards.

use super::collision::{drift, in_collision_band};
use super::scheduler::Scheduler;
use super::state::{GameEvent, GameState, SoundEffect};
use crate::tuning::Tuning;

/// What a fall tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallOutcome {
    /// Still falling
    Moved,
    /// Reached the floor clear of the player; score was incremented
    Passed,
    /// Landed on the player; the game must end
    Hit,
    /// Ball no longer exists (stale task)
    Gone,
}

/// Advance ball `id` by one fall tick
pub fn fall_tick(
    state: &mut GameState,
    scheduler: &mut Scheduler,
    tuning: &Tuning,
    id: u32,
    events: &mut Vec<GameEvent>,
) -> FallOutcome {
    let max_x = state.ball_max_x(tuning.ball_size);
    let height = state.play_area_height;
    let player_span = state.player.span();

    let Some(ball) = state.ball_mut(id) else {
        log::warn!("Fall tick for unknown ball {}", id);
        return FallOutcome::Gone;
    };
    log::trace!("Ball {} at ({:.1}, {:.1})", id, ball.pos.x, ball.pos.y);

    if !in_collision_band(ball.pos.y, tuning.ball_size, height) {
        ball.pos.y += tuning.ball_fall_step;
        let (x, speed) = drift(ball.pos.x, ball.horizontal_speed, max_x);
        ball.pos.x = x;
        ball.horizontal_speed = speed;
        return FallOutcome::Moved;
    }

    let hit = ball.span(tuning.ball_size).overlaps(&player_span);

    if let Some(ball) = state.remove_ball(id)
        && let Some(timer) = ball.fall_timer
    {
        scheduler.cancel(timer);
    }
    log::debug!("Ball {} removed", id);

    if hit {
        if !state.damage_sound_played {
            state.damage_sound_played = true;
            events.push(GameEvent::Sound(SoundEffect::Damage));
            log::debug!("Damage sound played");
        }
        events.push(GameEvent::Collision { id });
        FallOutcome::Hit
    } else {
        state.score += 1;
        events.push(GameEvent::BallPassed {
            id,
            score: state.score,
        });
        log::debug!("Score updated: {}", state.score);
        FallOutcome::Passed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::spawner::insert_ball;

    fn setup() -> (GameState, Scheduler, Tuning) {
        let tuning = Tuning::default();
        let state = GameState::new(&tuning);
        (state, Scheduler::new(), tuning)
    }

    /// Ticks until the ball settles, returning the outcome and tick count
    fn run_to_floor(
        state: &mut GameState,
        scheduler: &mut Scheduler,
        tuning: &Tuning,
        id: u32,
        events: &mut Vec<GameEvent>,
    ) -> (FallOutcome, usize) {
        for n in 1..10_000 {
            let outcome = fall_tick(state, scheduler, tuning, id, events);
            if outcome != FallOutcome::Moved {
                return (outcome, n);
            }
        }
        panic!("ball never settled");
    }

    #[test]
    fn test_ball_falls_and_drifts() {
        let (mut state, mut scheduler, tuning) = setup();
        let id = insert_ball(&mut state, &mut scheduler, &tuning, 100.0, 2.0);
        let mut events = Vec::new();

        assert_eq!(
            fall_tick(&mut state, &mut scheduler, &tuning, id, &mut events),
            FallOutcome::Moved
        );
        let ball = state.ball(id).expect("ball");
        assert_eq!(ball.pos.y, 5.0);
        assert_eq!(ball.pos.x, 102.0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_ball_reflects_at_right_wall() {
        let (mut state, mut scheduler, tuning) = setup();
        let id = insert_ball(&mut state, &mut scheduler, &tuning, 709.0, 2.0);
        let mut events = Vec::new();

        fall_tick(&mut state, &mut scheduler, &tuning, id, &mut events);
        let ball = state.ball(id).expect("ball");
        assert_eq!(ball.pos.x, 709.0);
        assert_eq!(ball.horizontal_speed, -2.0);

        fall_tick(&mut state, &mut scheduler, &tuning, id, &mut events);
        assert_eq!(state.ball(id).expect("ball").pos.x, 707.0);
    }

    #[test]
    fn test_miss_scores_once() {
        let (mut state, mut scheduler, tuning) = setup();
        // Far left with no drift: stays clear of the player
        let id = insert_ball(&mut state, &mut scheduler, &tuning, 0.0, 0.0);
        let mut events = Vec::new();

        let (outcome, ticks) = run_to_floor(&mut state, &mut scheduler, &tuning, id, &mut events);
        assert_eq!(outcome, FallOutcome::Passed);
        // y = 425 is the first value inside the band; checked on tick 86
        assert_eq!(ticks, 86);
        assert_eq!(state.score, 1);
        assert!(state.balls.is_empty());
        assert!(scheduler.is_empty());
        assert_eq!(events, vec![GameEvent::BallPassed { id, score: 1 }]);

        // A stale tick is harmless
        assert_eq!(
            fall_tick(&mut state, &mut scheduler, &tuning, id, &mut events),
            FallOutcome::Gone
        );
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_hit_plays_damage_once() {
        let (mut state, mut scheduler, tuning) = setup();
        let a = insert_ball(&mut state, &mut scheduler, &tuning, 355.0, 0.0);
        let b = insert_ball(&mut state, &mut scheduler, &tuning, 355.0, 0.0);
        let mut events = Vec::new();

        let (first, _) = run_to_floor(&mut state, &mut scheduler, &tuning, a, &mut events);
        let (second, _) = run_to_floor(&mut state, &mut scheduler, &tuning, b, &mut events);
        assert_eq!(first, FallOutcome::Hit);
        assert_eq!(second, FallOutcome::Hit);

        let sounds = events
            .iter()
            .filter(|e| matches!(e, GameEvent::Sound(SoundEffect::Damage)))
            .count();
        assert_eq!(sounds, 1);
        assert!(state.damage_sound_played);
        assert_eq!(state.score, 0);
    }
}
