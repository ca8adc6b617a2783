//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Virtual time only (the scheduler's clock)
//! - Seeded RNG only
//! - Tasks fire in due-time order, ties by scheduling order
//! - No DOM or audio dependencies

pub mod collision;
pub mod fall;
pub mod game;
pub mod input;
pub mod scheduler;
pub mod spawner;
pub mod state;

pub use collision::{Span, drift, in_collision_band};
pub use fall::{FallOutcome, fall_tick};
pub use game::Game;
pub use input::{Direction, InputEvent, InputHandler};
pub use scheduler::{Scheduler, TaskId, TaskKind};
pub use state::{Ball, GameEvent, GamePhase, GameState, Player, Screen, SoundEffect};
