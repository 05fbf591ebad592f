use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::{Move, RotationEngine};

/// Elapsed time driven by the frame loop rather than the wall clock, so that
/// runs are reproducible.
#[derive(Debug, Default, Clone)]
pub struct PlaybackClock {
    pub time_seconds: f32,
}

impl PlaybackClock {
    pub fn reset(&mut self) {
        self.time_seconds = 0.0;
    }

    pub fn advance(&mut self, delta: f32) {
        self.time_seconds = (self.time_seconds + delta).max(0.0);
    }
}

/// Who asked for a move. Only used for statistics and the overlay.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveOrigin {
    /// Keyboard or audio trigger.
    Stimulus,
    /// Popped from the undo stack.
    Solver,
    /// Started directly, bypassing the queue.
    Direct,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMove {
    pub mv: Move,
    pub origin: MoveOrigin,
}

impl ScheduledMove {
    pub fn new(mv: Move, origin: MoveOrigin) -> Self {
        Self { mv, origin }
    }
}

/// FIFO of pending moves, fed into the [`RotationEngine`] one at a time.
#[derive(Debug, Default)]
pub struct Scheduler {
    queue: VecDeque<ScheduledMove>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, mv: Move, origin: MoveOrigin) {
        self.queue.push_back(ScheduledMove::new(mv, origin));
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &ScheduledMove> {
        self.queue.iter()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Starts the head of the queue if the rotation engine is idle.
    pub fn tick(&mut self, rotation: &mut RotationEngine) -> Option<ScheduledMove> {
        if !rotation.is_idle() {
            return None;
        }

        let next = self.queue.pop_front()?;
        let started = rotation.begin(next.mv);
        debug_assert!(started, "idle rotation engine refused a move");
        Some(next)
    }
}
