//! Ball Dodge - a single-screen arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (timers, spawning, falling balls, input)
//! - `tuning`: Data-driven game balance
//! - `audio`: Background music and sound effects (browser only)
//! - `platform`: DOM view and browser glue (browser only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod platform;
pub mod sim;
pub mod tuning;

pub use sim::{Game, GameEvent, GamePhase, GameState, Screen};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Play area dimensions (re-measured from the page before each start)
    pub const PLAY_AREA_WIDTH: f32 = 800.0;
    pub const PLAY_AREA_HEIGHT: f32 = 600.0;

    /// Player paddle
    pub const PLAYER_WIDTH: f32 = 100.0;
    /// Distance moved per movement tick
    pub const PLAYER_SPEED: f32 = 15.0;
    /// Key/touch repeat period while a direction is held
    pub const MOVE_REPEAT_MS: u32 = 50;

    /// Ball defaults (balls are square, `BALL_SIZE` on each side)
    pub const BALL_SIZE: f32 = 90.0;
    /// Vertical advance per fall tick
    pub const BALL_FALL_STEP: f32 = 5.0;
    /// Horizontal drift per fall tick (sign picked at spawn)
    pub const BALL_DRIFT: f32 = 2.0;
    pub const FALL_TICK_MS: u32 = 20;

    /// Spawn cadence
    pub const INITIAL_SPAWN_INTERVAL_MS: u32 = 600;
    pub const MIN_SPAWN_INTERVAL_MS: u32 = 200;
    pub const SPAWN_INTERVAL_STEP_MS: u32 = 50;

    /// After this long the spawn cadence is pinned to `OVERRIDE_SPAWN_INTERVAL_MS`
    pub const PROGRESSION_OVERRIDE_AFTER_MS: u32 = 15_000;
    pub const OVERRIDE_SPAWN_INTERVAL_MS: u32 = 1_000;

    /// Background music volume (0.0 - 1.0)
    pub const MUSIC_VOLUME: f32 = 0.5;
}

/// Largest x that keeps a span of `size` inside `[0, width]`
#[inline]
pub fn max_offset(width: f32, size: f32) -> f32 {
    (width - size).max(0.0)
}
