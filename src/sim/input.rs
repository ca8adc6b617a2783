//! Keyboard and touch input
//!
//! Discrete press/release events become continuous movement: holding a
//! direction runs a repeating movement task until release. Only one
//! direction repeats at a time; the last press wins.

use serde::{Deserialize, Serialize};

use super::scheduler::{Scheduler, TaskId, TaskKind};
use super::state::Player;

/// Horizontal movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Map a `KeyboardEvent.key` value to a direction
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            _ => None,
        }
    }

    /// Left half of the viewport moves left, right half moves right
    pub fn from_touch(x: f32, viewport_width: f32) -> Self {
        if x < viewport_width / 2.0 {
            Direction::Left
        } else {
            Direction::Right
        }
    }

    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }
}

/// Raw input from the platform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Any key press; `None` for keys that don't steer
    KeyDown(Option<Direction>),
    KeyUp,
    TouchStart { x: f32, viewport_width: f32 },
    TouchEnd,
}

/// Apply one movement tick, keeping the player inside `[0, max_x]`
pub fn step(player: &mut Player, direction: Direction, speed: f32, max_x: f32) {
    let target = player.x + direction.sign() * speed;
    player.x = target.clamp(0.0, max_x.max(0.0));
    log::trace!("Player moved {:?} to {}", direction, player.x);
}

/// Owns the (at most one) movement repeat task
#[derive(Debug, Clone, Default)]
pub struct InputHandler {
    registered: bool,
    repeat_timer: Option<TaskId>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start accepting input
    pub fn register(&mut self) {
        self.registered = true;
    }

    /// Stop accepting input and drop any held movement
    pub fn unregister(&mut self, scheduler: &mut Scheduler) {
        self.stop(scheduler);
        self.registered = false;
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Currently repeating direction, if any
    pub fn held_direction(&self, scheduler: &Scheduler) -> Option<Direction> {
        match self.repeat_timer.and_then(|id| scheduler.kind_of(id)) {
            Some(TaskKind::MoveRepeat(direction)) => Some(direction),
            _ => None,
        }
    }

    pub fn repeat_timer(&self) -> Option<TaskId> {
        self.repeat_timer
    }

    /// Cancel the movement repeat task
    pub fn stop(&mut self, scheduler: &mut Scheduler) {
        if let Some(id) = self.repeat_timer.take() {
            scheduler.cancel(id);
        }
    }

    /// Forget the repeat task after the scheduler was cleared wholesale
    pub(crate) fn forget_timer(&mut self) {
        self.repeat_timer = None;
    }

    fn start_repeat(&mut self, scheduler: &mut Scheduler, direction: Direction, period_ms: u32) {
        self.stop(scheduler);
        self.repeat_timer = Some(scheduler.set_interval(TaskKind::MoveRepeat(direction), period_ms));
    }

    /// Handle one platform event. Ignored unless registered.
    pub fn handle(
        &mut self,
        event: InputEvent,
        scheduler: &mut Scheduler,
        player: &mut Player,
        max_x: f32,
        speed: f32,
        repeat_ms: u32,
    ) {
        if !self.registered {
            return;
        }

        match event {
            InputEvent::KeyDown(direction) => {
                // Any key press cancels the current movement first
                self.stop(scheduler);
                if let Some(direction) = direction {
                    self.start_repeat(scheduler, direction, repeat_ms);
                }
            }
            InputEvent::TouchStart { x, viewport_width } => {
                self.stop(scheduler);
                let direction = Direction::from_touch(x, viewport_width);
                step(player, direction, speed, max_x);
                self.start_repeat(scheduler, direction, repeat_ms);
            }
            InputEvent::KeyUp | InputEvent::TouchEnd => self.stop(scheduler),
        }
    }
}
