//! Undo-stack solver.
//!
//! Every stimulus move leaves its inverse on a stack. After a warm-up the
//! solver pops that stack back into the move queue, faster the longer it has
//! been running. This only ever undoes the scramble it watched being made;
//! it is not a general cube solver.

use serde::{Deserialize, Serialize};

use crate::{config::SolverConfig, Move};

/// LIFO of moves still owed to get back to the solved state.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoStack {
    moves: Vec<Move>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    pub fn pop(&mut self) -> Option<Move> {
        self.moves.pop()
    }

    pub fn top(&self) -> Option<Move> {
        self.moves.last().copied()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn clear(&mut self) {
        self.moves.clear();
    }

    /// Bottom to top.
    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum SolverPhase {
    /// Warm-up: inverses pile up, nothing is drained.
    Accumulating,
    /// Draining, entered once and never left until a rebuild.
    Active { since_seconds: f32 },
}

/// What recording a stimulus move did to the stack.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StackChange {
    Pushed(Move),
    Cancelled(Move),
}

/// Batch size and cooldown for one drain step.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Pace {
    pub batch: usize,
    pub cooldown_frames: u32,
}

#[derive(Debug, Clone)]
pub struct UndoSolver {
    config: SolverConfig,
    stack: UndoStack,
    phase: SolverPhase,
    cooldown: u32,
}

impl UndoSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            stack: UndoStack::new(),
            phase: SolverPhase::Accumulating,
            cooldown: 0,
        }
    }

    pub fn stack(&self) -> &UndoStack {
        &self.stack
    }

    pub fn phase(&self) -> SolverPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, SolverPhase::Active { .. })
    }

    pub fn reset(&mut self) {
        self.stack.clear();
        self.phase = SolverPhase::Accumulating;
        self.cooldown = 0;
    }

    /// Records a stimulus move. Once active, a move equal to the top of the
    /// stack cancels that pending correction instead of adding a new one.
    pub fn record_stimulus(&mut self, mv: Move) -> StackChange {
        if self.is_active() && self.stack.top() == Some(mv) {
            self.stack.pop();
            tracing::trace!(%mv, depth = self.stack.len(), "undo entry cancelled");
            return StackChange::Cancelled(mv);
        }

        let inverse = mv.inverse();
        self.stack.push(inverse);
        StackChange::Pushed(inverse)
    }

    /// Latches the active phase once `now_seconds` passes the warm-up.
    /// Returns `true` on the tick the latch happens.
    pub fn update_phase(&mut self, now_seconds: f32) -> bool {
        if self.is_active() || now_seconds < self.config.warmup_seconds {
            return false;
        }

        self.phase = SolverPhase::Active {
            since_seconds: now_seconds,
        };
        tracing::info!(backlog = self.stack.len(), "solver active");
        true
    }

    /// Pace for the given number of seconds spent in the active phase.
    pub fn pace(&self, active_seconds: f32) -> Pace {
        let base = self.config.cooldown_frames;
        self.config
            .pace
            .iter()
            .filter(|step| active_seconds > step.after_seconds)
            .max_by(|a, b| a.after_seconds.total_cmp(&b.after_seconds))
            .map(|step| Pace {
                batch: step.batch.max(1),
                cooldown_frames: (base / step.cooldown_divisor.max(1)).max(1),
            })
            .unwrap_or(Pace {
                batch: 1,
                cooldown_frames: base,
            })
    }

    /// One frame of the drain loop. `ready` tells whether the rotation engine
    /// is idle with nothing queued. Returns the moves to enqueue, top of the
    /// stack first.
    pub fn tick(&mut self, now_seconds: f32, ready: bool) -> Vec<Move> {
        let mut drained = Vec::new();

        if let SolverPhase::Active { since_seconds } = self.phase {
            if ready && self.cooldown == 0 && !self.stack.is_empty() {
                let pace = self.pace(now_seconds - since_seconds);
                drained.extend(self.drain(pace.batch));
                self.cooldown = pace.cooldown_frames;
            }
        }

        self.cooldown = self.cooldown.saturating_sub(1);
        drained
    }

    /// Pops up to `count` moves. Popping an empty stack is a no-op.
    pub fn drain(&mut self, count: usize) -> Vec<Move> {
        std::iter::from_fn(|| self.stack.pop()).take(count).collect()
    }
}
