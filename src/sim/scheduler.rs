//! Virtual-time task scheduler
//!
//! Stands in for the browser's `setInterval`/`setTimeout`. Every timer in the
//! game is a task here, so ending or restarting a game can cancel all of
//! them at once, including the per-ball fall timers.
//!
//! Time only moves when the owner calls [`Scheduler::pop_due`] or
//! [`Scheduler::advance_to`], which keeps the simulation deterministic.

use serde::{Deserialize, Serialize};

use super::input::Direction;

/// Handle to a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(u64);

/// What a task does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    /// Create a ball (and maybe speed up the cadence)
    Spawn,
    /// One-shot: pin the spawn cadence after the ramp period
    ProgressionOverride,
    /// Held key/touch movement
    MoveRepeat(Direction),
    /// Advance one ball
    Fall { ball_id: u32 },
}

#[derive(Debug, Clone)]
struct Task {
    id: TaskId,
    kind: TaskKind,
    due_ms: u64,
    /// `None` for one-shot timeouts
    period_ms: Option<u32>,
}

/// Ordered set of pending tasks on a virtual clock
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: u64,
    next_id: u64,
    tasks: Vec<Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of live tasks
    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn push(&mut self, kind: TaskKind, delay_ms: u32, period_ms: Option<u32>) -> TaskId {
        // Ids double as scheduling order for tie-breaks
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            kind,
            due_ms: self.now_ms + u64::from(delay_ms.max(1)),
            period_ms: period_ms.map(|p| p.max(1)),
        });
        id
    }

    /// Fire `kind` every `period_ms`, first after one period
    pub fn set_interval(&mut self, kind: TaskKind, period_ms: u32) -> TaskId {
        self.push(kind, period_ms, Some(period_ms))
    }

    /// Fire `kind` once after `delay_ms`
    pub fn set_timeout(&mut self, kind: TaskKind, delay_ms: u32) -> TaskId {
        self.push(kind, delay_ms, None)
    }

    /// Cancel a task. Returns false if it already finished or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Cancel every pending task, returning how many were dropped
    pub fn cancel_all(&mut self) -> usize {
        let n = self.tasks.len();
        self.tasks.clear();
        n
    }

    pub fn is_active(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    /// Kind of a live task
    pub fn kind_of(&self, id: TaskId) -> Option<TaskKind> {
        self.tasks.iter().find(|t| t.id == id).map(|t| t.kind)
    }

    /// Period of a live interval task
    pub fn period_of(&self, id: TaskId) -> Option<u32> {
        self.tasks.iter().find(|t| t.id == id).and_then(|t| t.period_ms)
    }

    /// Take the earliest task due at or before `until_ms`.
    ///
    /// The clock jumps to the task's due time. Intervals are re-armed before
    /// being returned, so the caller may cancel the task from its handler;
    /// timeouts are removed.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TaskId, TaskKind)> {
        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id))
            .map(|(i, _)| i)?;

        let Task {
            id,
            kind,
            due_ms,
            period_ms,
        } = self.tasks[idx].clone();
        self.now_ms = self.now_ms.max(due_ms);

        match period_ms {
            Some(period) => self.tasks[idx].due_ms += u64::from(period),
            None => {
                self.tasks.swap_remove(idx);
            }
        }
        let fired = (id, kind);

        Some(fired)
    }

    /// Move the clock forward once all due tasks have been handled
    pub fn advance_to(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    /// Ids of every live task (sorted, for inspection)
    pub fn task_ids(&self) -> Vec<TaskId> {
        let mut ids: Vec<_> = self.tasks.iter().map(|t| t.id).collect();
        ids.sort();
        ids
    }
}
