//! Game state and core simulation types
//!
//! Everything that describes a running game lives here and is serializable,
//! so a snapshot can be logged or compared between runs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Span;
use super::scheduler::TaskId;
use crate::max_offset;
use crate::tuning::Tuning;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Intro screen, nothing scheduled
    Intro,
    /// Reset done: play area visible, nothing scheduled yet
    Ready,
    /// Active gameplay
    Playing,
    /// Collision happened, end screen shown
    Ended,
}

impl GamePhase {
    /// Which screen is visible in this phase
    pub fn screen(self) -> Screen {
        match self {
            GamePhase::Intro => Screen::Intro,
            GamePhase::Ready | GamePhase::Playing => Screen::Play,
            GamePhase::Ended => Screen::End,
        }
    }
}

/// The three mutually exclusive screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    Intro,
    Play,
    End,
}

/// One-shot sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Ball hit the player
    Damage,
}

/// Side effects produced by the simulation, drained by the platform layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ScreenChanged(Screen),
    MusicStarted,
    MusicPaused,
    Sound(SoundEffect),
    BallSpawned { id: u32 },
    /// Ball reached the floor without touching the player
    BallPassed { id: u32, score: u32 },
    /// Ball landed on the player
    Collision { id: u32 },
    SpawnIntervalChanged(u32),
}

/// A falling ball. `pos` is its top-left corner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    /// Horizontal units per fall tick; sign is the direction
    pub horizontal_speed: f32,
    /// `None` once the game has ended and the timer was cancelled
    pub fall_timer: Option<TaskId>,
}

impl Ball {
    /// Horizontal extent of the ball
    pub fn span(&self, size: f32) -> Span {
        Span::new(self.pos.x, size)
    }
}

/// The player's paddle, pinned to the floor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Left edge
    pub x: f32,
    pub width: f32,
}

impl Player {
    pub fn span(&self) -> Span {
        Span::new(self.x, self.width)
    }

    /// Place the player in the horizontal centre of the play area
    pub fn center(&mut self, play_area_width: f32) {
        self.x = max_offset(play_area_width, self.width) / 2.0;
    }
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub score: u32,
    /// Current spawn period (ramps down, then pinned by the override)
    pub spawn_interval_ms: u32,
    /// True once the override has pinned the cadence
    pub progression_overridden: bool,
    pub damage_sound_played: bool,
    pub play_area_width: f32,
    pub play_area_height: f32,
    pub player: Player,
    /// Live balls, in spawn order
    pub balls: Vec<Ball>,
    pub spawn_timer: Option<TaskId>,
    pub override_timer: Option<TaskId>,
    /// Virtual time when the current game started
    pub started_at_ms: u64,
    next_id: u32,
}

impl GameState {
    pub fn new(tuning: &Tuning) -> Self {
        let mut player = Player {
            x: 0.0,
            width: tuning.player_width,
        };
        player.center(tuning.play_area_width);

        Self {
            phase: GamePhase::Intro,
            score: 0,
            spawn_interval_ms: tuning.initial_spawn_interval_ms,
            progression_overridden: false,
            damage_sound_played: false,
            play_area_width: tuning.play_area_width,
            play_area_height: tuning.play_area_height,
            player,
            balls: Vec::new(),
            spawn_timer: None,
            override_timer: None,
            started_at_ms: 0,
            next_id: 1,
        }
    }

    /// Allocate a new ball ID
    pub fn next_ball_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Rightmost legal player position
    pub fn player_max_x(&self) -> f32 {
        max_offset(self.play_area_width, self.player.width)
    }

    /// Rightmost legal ball position
    pub fn ball_max_x(&self, ball_size: f32) -> f32 {
        max_offset(self.play_area_width, ball_size)
    }

    pub fn ball(&self, id: u32) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    pub fn ball_mut(&mut self, id: u32) -> Option<&mut Ball> {
        self.balls.iter_mut().find(|b| b.id == id)
    }

    /// Remove a ball, returning it if it was live
    pub fn remove_ball(&mut self, id: u32) -> Option<Ball> {
        let idx = self.balls.iter().position(|b| b.id == id)?;
        Some(self.balls.remove(idx))
    }

    /// Score readout shown above the play area
    pub fn score_text(&self) -> String {
        format!("Pontos: {}", self.score)
    }
}
