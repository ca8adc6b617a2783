//! Game controller
//!
//! Owns the state, the scheduler, input and RNG, and drives screen
//! transitions. The platform layer calls [`Game::advance`] with elapsed time,
//! forwards input, and drains [`GameEvent`]s to play audio and swap screens.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::fall::{FallOutcome, fall_tick};
use super::input::{self, InputEvent, InputHandler};
use super::scheduler::{Scheduler, TaskId, TaskKind};
use super::spawner;
use super::state::{GameEvent, GamePhase, GameState};
use crate::tuning::Tuning;

pub struct Game {
    tuning: Tuning,
    state: GameState,
    scheduler: Scheduler,
    input: InputHandler,
    rng: Pcg32,
    seed: u64,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self {
            state: GameState::new(&tuning),
            tuning,
            scheduler: Scheduler::new(),
            input: InputHandler::new(),
            rng: Pcg32::seed_from_u64(seed),
            seed,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn input(&self) -> &InputHandler {
        &self.input
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    /// Milliseconds since the current game started (0 when not playing)
    pub fn elapsed_ms(&self) -> u64 {
        match self.state.phase {
            GamePhase::Playing | GamePhase::Ended => {
                self.scheduler.now_ms().saturating_sub(self.state.started_at_ms)
            }
            _ => 0,
        }
    }

    /// Take all events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Serialize the current state for logging or comparison
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.state)
    }

    /// Adopt measured play-area and player sizes
    pub fn resize(&mut self, play_area_width: f32, play_area_height: f32, player_width: f32) {
        self.state.play_area_width = play_area_width;
        self.state.play_area_height = play_area_height;
        self.state.player.width = player_width;
        let max_x = self.state.player_max_x();
        self.state.player.x = self.state.player.x.clamp(0.0, max_x);
        log::debug!(
            "Play area {}x{}, player width {}",
            play_area_width,
            play_area_height,
            player_width
        );
    }

    fn set_phase(&mut self, phase: GamePhase) {
        let before = self.state.phase.screen();
        self.state.phase = phase;
        let after = phase.screen();
        if before != after {
            self.events.push(GameEvent::ScreenChanged(after));
        }
    }

    /// Leave the intro (or a reset) and begin play
    pub fn start(&mut self) {
        if !matches!(self.state.phase, GamePhase::Intro | GamePhase::Ready) {
            log::warn!("start() ignored in phase {:?}", self.state.phase);
            return;
        }

        self.set_phase(GamePhase::Playing);
        self.events.push(GameEvent::MusicStarted);
        self.state.player.center(self.state.play_area_width);
        self.input.register();
        self.state.started_at_ms = self.scheduler.now_ms();
        spawner::begin(&mut self.state, &mut self.scheduler, &self.tuning);

        log::info!("Game started at {} ms", self.state.started_at_ms);
    }

    /// Cancel every task and forget the handles that pointed at them
    fn cancel_all_tasks(&mut self) -> usize {
        let cancelled = self.scheduler.cancel_all();
        self.state.spawn_timer = None;
        self.state.override_timer = None;
        self.input.forget_timer();
        for ball in &mut self.state.balls {
            ball.fall_timer = None;
        }
        cancelled
    }

    /// Stop everything and show the end screen
    pub fn show_end(&mut self) {
        if self.state.phase != GamePhase::Playing {
            return;
        }

        let cancelled = self.cancel_all_tasks();
        self.set_phase(GamePhase::Ended);
        self.events.push(GameEvent::MusicPaused);

        log::info!(
            "Game over: score {} after {} ms ({} tasks cancelled)",
            self.state.score,
            self.elapsed_ms(),
            cancelled
        );
    }

    /// Clear all tasks and balls and return to a fresh, idle play area
    pub fn reset(&mut self) {
        let cancelled = self.cancel_all_tasks();
        self.input.unregister(&mut self.scheduler);

        let removed = self.state.balls.len();
        self.state.balls.clear();
        self.state.score = 0;
        self.state.spawn_interval_ms = self.tuning.initial_spawn_interval_ms;
        self.state.progression_overridden = false;
        self.state.damage_sound_played = false;
        self.state.player.center(self.state.play_area_width);
        self.set_phase(GamePhase::Ready);

        log::debug!("Reset: {} tasks cancelled, {} balls removed", cancelled, removed);
    }

    pub fn restart(&mut self) {
        self.reset();
        self.start();
        log::info!("Game restarted");
    }

    /// Forward a platform input event (ignored unless playing)
    pub fn handle_input(&mut self, event: InputEvent) {
        if self.state.phase != GamePhase::Playing {
            return;
        }
        let max_x = self.state.player_max_x();
        self.input.handle(
            event,
            &mut self.scheduler,
            &mut self.state.player,
            max_x,
            self.tuning.player_speed,
            self.tuning.move_repeat_ms,
        );
    }

    /// Drop a ball at `x` with the given drift, outside the spawn schedule
    pub fn drop_ball(&mut self, x: f32, horizontal_speed: f32) -> Option<u32> {
        if self.state.phase != GamePhase::Playing {
            return None;
        }
        let id = spawner::insert_ball(
            &mut self.state,
            &mut self.scheduler,
            &self.tuning,
            x,
            horizontal_speed,
        );
        self.events.push(GameEvent::BallSpawned { id });
        Some(id)
    }

    /// Run every task due within the next `dt_ms`, in order
    pub fn advance(&mut self, dt_ms: u64) {
        let until = self.scheduler.now_ms() + dt_ms;
        while let Some((id, kind)) = self.scheduler.pop_due(until) {
            self.run_task(id, kind);
        }
        self.scheduler.advance_to(until);
    }

    fn run_task(&mut self, id: TaskId, kind: TaskKind) {
        if self.state.phase != GamePhase::Playing {
            self.scheduler.cancel(id);
            return;
        }

        match kind {
            TaskKind::Spawn => spawner::on_spawn(
                &mut self.state,
                &mut self.scheduler,
                &self.tuning,
                &mut self.rng,
                &mut self.events,
            ),
            TaskKind::ProgressionOverride => spawner::on_override(
                &mut self.state,
                &mut self.scheduler,
                &self.tuning,
                &mut self.events,
            ),
            TaskKind::MoveRepeat(direction) => {
                let max_x = self.state.player_max_x();
                input::step(
                    &mut self.state.player,
                    direction,
                    self.tuning.player_speed,
                    max_x,
                );
            }
            TaskKind::Fall { ball_id } => {
                let outcome = fall_tick(
                    &mut self.state,
                    &mut self.scheduler,
                    &self.tuning,
                    ball_id,
                    &mut self.events,
                );
                if outcome == FallOutcome::Hit {
                    self.show_end();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::input::Direction;
    use crate::sim::state::{Screen, SoundEffect};
    use proptest::prelude::*;

    /// Tuning with the random spawner effectively switched off
    fn quiet() -> Tuning {
        Tuning {
            initial_spawn_interval_ms: 600_000,
            min_spawn_interval_ms: 600_000,
            progression_override_after_ms: 600_000,
            ..Default::default()
        }
    }

    fn count_damage(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::Sound(SoundEffect::Damage)))
            .count()
    }

    #[test]
    fn test_start_from_intro() {
        let mut game = Game::new(Tuning::default(), 1);
        assert_eq!(game.state().phase, GamePhase::Intro);

        game.start();
        assert_eq!(game.state().phase, GamePhase::Playing);
        assert_eq!(game.state().player.x, 350.0);
        assert!(game.input().is_registered());
        // Spawn interval + progression override
        assert_eq!(game.scheduler().len(), 2);
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::ScreenChanged(Screen::Play), GameEvent::MusicStarted]
        );

        // Second start is ignored
        game.start();
        assert_eq!(game.scheduler().len(), 2);
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn test_centered_ball_ends_game() {
        let mut game = Game::new(quiet(), 1);
        game.start();
        game.drain_events();

        let id = game.drop_ball(355.0, 0.0).expect("playing");
        game.advance(1_719);
        assert_eq!(game.state().phase, GamePhase::Playing);
        game.advance(1);

        let events = game.drain_events();
        assert_eq!(game.state().phase, GamePhase::Ended);
        assert_eq!(game.state().score, 0);
        assert_eq!(count_damage(&events), 1);
        assert!(events.contains(&GameEvent::Collision { id }));
        assert!(events.contains(&GameEvent::ScreenChanged(Screen::End)));
        assert!(events.contains(&GameEvent::MusicPaused));
        assert!(game.scheduler().is_empty());
        assert!(game.state().balls.is_empty());
    }

    #[test]
    fn test_simultaneous_hits_play_damage_once() {
        let mut game = Game::new(quiet(), 1);
        game.start();
        game.drop_ball(355.0, 0.0);
        game.drop_ball(360.0, 0.0);
        game.advance(5_000);

        let events = game.drain_events();
        assert_eq!(count_damage(&events), 1);
        let collisions = events
            .iter()
            .filter(|e| matches!(e, GameEvent::Collision { .. }))
            .count();
        assert_eq!(collisions, 1);
        // The second ball is frozen with its task cancelled
        assert_eq!(game.state().balls.len(), 1);
        assert!(game.state().balls[0].fall_timer.is_none());
        assert!(game.scheduler().is_empty());
    }

    #[test]
    fn test_passing_balls_score() {
        let mut game = Game::new(quiet(), 1);
        game.start();
        game.drop_ball(0.0, 0.0);
        game.drop_ball(710.0, 0.0);
        game.advance(2_000);

        assert_eq!(game.state().phase, GamePhase::Playing);
        assert_eq!(game.state().score, 2);
        assert_eq!(game.state().score_text(), "Pontos: 2");
        assert!(game.state().balls.is_empty());
    }

    #[test]
    fn test_restart_after_end() {
        let mut game = Game::new(Tuning::default(), 3);
        game.start();
        game.drop_ball(0.0, 0.0);
        game.advance(1_720);
        game.handle_input(InputEvent::KeyDown(Some(Direction::Left)));
        game.advance(100);
        game.handle_input(InputEvent::KeyUp);
        let centered = game.state().player.x;
        assert_eq!(centered, 320.0);
        game.drop_ball(centered, 0.0);
        game.advance(10_000);
        assert_eq!(game.state().phase, GamePhase::Ended);
        assert!(game.state().score >= 1);

        game.restart();
        let state = game.state();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.spawn_interval_ms, 600);
        assert!(!state.damage_sound_played);
        assert!(!state.progression_overridden);
        assert!(state.balls.is_empty());
        assert_eq!(state.player.x, 350.0);
        // Only the fresh spawn task and override remain
        assert_eq!(game.scheduler().len(), 2);
        assert_eq!(game.input().repeat_timer(), None);
    }

    #[test]
    fn test_reset_cancels_live_balls() {
        let tuning = Tuning {
            play_area_height: 100_000.0,
            ..Default::default()
        };
        let mut game = Game::new(tuning, 9);
        game.start();
        game.handle_input(InputEvent::KeyDown(Some(Direction::Right)));
        game.advance(3_000);
        assert!(game.state().balls.len() > 3);

        game.reset();
        assert_eq!(game.state().phase, GamePhase::Ready);
        assert!(game.scheduler().is_empty());
        assert!(game.state().balls.is_empty());
        assert!(!game.input().is_registered());
        game.drain_events();

        // Nothing left to fire
        game.advance(60_000);
        assert!(game.drain_events().is_empty());
        assert_eq!(game.state().score, 0);

        // Input is ignored until the next start
        game.handle_input(InputEvent::KeyDown(Some(Direction::Left)));
        assert!(game.scheduler().is_empty());
    }

    #[test]
    fn test_spawn_progression_then_override() {
        let tuning = Tuning {
            play_area_height: 100_000.0,
            ..Default::default()
        };
        let mut game = Game::new(tuning, 5);
        game.start();
        game.advance(17_500);

        let intervals: Vec<u32> = game
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::SpawnIntervalChanged(ms) => Some(ms),
                _ => None,
            })
            .collect();
        assert_eq!(intervals, vec![550, 500, 450, 400, 350, 300, 250, 200, 1000]);
        assert_eq!(game.state().spawn_interval_ms, 1000);
        assert!(game.state().progression_overridden);
        assert_eq!(game.state().override_timer, None);

        // Fixed cadence: one ball per second from here on
        let before = game.state().balls.len();
        game.advance(3_000);
        assert_eq!(game.state().balls.len(), before + 3);
    }

    #[test]
    fn test_held_key_moves_until_release() {
        let mut game = Game::new(quiet(), 1);
        game.handle_input(InputEvent::KeyDown(Some(Direction::Right)));
        assert!(game.scheduler().is_empty());

        game.start();
        game.handle_input(InputEvent::KeyDown(Some(Direction::Right)));
        game.advance(500);
        assert_eq!(game.state().player.x, 500.0);

        game.handle_input(InputEvent::KeyUp);
        game.advance(500);
        assert_eq!(game.state().player.x, 500.0);

        game.handle_input(InputEvent::TouchStart {
            x: 10.0,
            viewport_width: 400.0,
        });
        assert_eq!(game.state().player.x, 485.0);
        game.advance(10_000);
        assert_eq!(game.state().player.x, 0.0);
    }

    #[test]
    fn test_resize_clamps_player() {
        let mut game = Game::new(quiet(), 1);
        game.resize(300.0, 400.0, 80.0);
        assert!(game.state().player.x <= 220.0);

        game.start();
        assert_eq!(game.state().player.x, 110.0);
    }

    #[test]
    fn test_same_seed_same_game() {
        let script = [
            (250, Some(InputEvent::KeyDown(Some(Direction::Left)))),
            (700, Some(InputEvent::KeyUp)),
            (1_300, Some(InputEvent::TouchStart {
                x: 900.0,
                viewport_width: 1000.0,
            })),
            (2_000, Some(InputEvent::TouchEnd)),
            (20_000, None),
        ];

        let run = || {
            let mut game = Game::new(Tuning::default(), 42);
            game.start();
            for (dt, input) in script {
                game.advance(dt);
                if let Some(input) = input {
                    game.handle_input(input);
                }
            }
            game.snapshot_json().expect("serializable")
        };

        assert_eq!(run(), run());
    }

    proptest! {
        #[test]
        fn prop_entities_stay_in_bounds(
            seed in any::<u64>(),
            steps in prop::collection::vec((1u64..200, 0u8..6), 1..150),
        ) {
            let mut game = Game::new(Tuning::default(), seed);
            game.start();
            for (dt, action) in steps {
                let input = match action {
                    0 => InputEvent::KeyDown(Some(Direction::Left)),
                    1 => InputEvent::KeyDown(Some(Direction::Right)),
                    2 => InputEvent::KeyUp,
                    3 => InputEvent::TouchStart { x: 10.0, viewport_width: 800.0 },
                    4 => InputEvent::TouchStart { x: 790.0, viewport_width: 800.0 },
                    _ => InputEvent::TouchEnd,
                };
                game.handle_input(input);
                game.advance(dt);

                let state = game.state();
                prop_assert!((0.0..=state.player_max_x()).contains(&state.player.x));
                let ball_max = state.ball_max_x(game.tuning().ball_size);
                for ball in &state.balls {
                    prop_assert!((0.0..=ball_max).contains(&ball.pos.x));
                }
                if state.phase == GamePhase::Playing {
                    // One fall task per live ball
                    prop_assert!(state.balls.iter().all(|b| b
                        .fall_timer
                        .is_some_and(|t| game.scheduler().is_active(t))));
                }
            }
        }
    }
}
