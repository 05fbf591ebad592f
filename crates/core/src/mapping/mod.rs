use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::{
    timeline::{MoveOrigin, ScheduledMove},
    Direction, Face, Move, Scheduler,
};

/// Maps a key press to a trigger: `r l u d f b` pick the face, lowercase is
/// clockwise and uppercase counter-clockwise. Any other key is ignored.
pub fn key_to_move(key: char) -> Option<Move> {
    if !key.is_ascii_alphabetic() {
        return None;
    }
    let face = Face::from_letter(key)?;
    Some(Move::new(
        face,
        Direction::from_clockwise(key.is_ascii_lowercase()),
    ))
}

/// Per-face and total move counters shown by the overlay.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveStats {
    pub total: u64,
    per_face: [u64; 6],
}

impl MoveStats {
    pub fn count(&self, face: Face) -> u64 {
        self.per_face[face.index()]
    }

    /// Faces that have moved at least once, in table order.
    pub fn faces(&self) -> impl Iterator<Item = (Face, u64)> + '_ {
        Face::ALL
            .into_iter()
            .map(|face| (face, self.count(face)))
            .filter(|&(_, count)| count > 0)
    }

    fn record(&mut self, face: Face) {
        self.total += 1;
        self.per_face[face.index()] += 1;
    }
}

/// Turns external triggers into queued moves and keeps the bounded history
/// and counters for the overlay.
#[derive(Debug, Clone)]
pub struct StimulusMapper {
    history: VecDeque<ScheduledMove>,
    history_limit: usize,
    stats: MoveStats,
    last_trigger: Option<String>,
}

impl StimulusMapper {
    pub fn new(history_limit: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(history_limit.min(1024)),
            history_limit,
            stats: MoveStats::default(),
            last_trigger: None,
        }
    }

    /// Queues exactly one stimulus move and returns it.
    pub fn trigger(&mut self, scheduler: &mut Scheduler, face: Face, clockwise: bool) -> Move {
        let mv = Move::new(face, Direction::from_clockwise(clockwise));
        self.submit(scheduler, mv, MoveOrigin::Stimulus);
        mv
    }

    /// Queues a move on behalf of `origin` and logs it.
    pub fn submit(&mut self, scheduler: &mut Scheduler, mv: Move, origin: MoveOrigin) {
        scheduler.enqueue(mv, origin);
        self.log(mv, origin);
    }

    /// Logs a move that bypassed the queue.
    pub fn log(&mut self, mv: Move, origin: MoveOrigin) {
        if self.history_limit > 0 {
            while self.history.len() >= self.history_limit {
                self.history.pop_front();
            }
            self.history.push_back(ScheduledMove::new(mv, origin));
        }
        self.stats.record(mv.face);
    }

    pub fn set_last_trigger(&mut self, label: impl Into<String>) {
        self.last_trigger = Some(label.into());
    }

    pub fn last_trigger(&self) -> Option<&str> {
        self.last_trigger.as_deref()
    }

    /// Oldest first.
    pub fn history(&self) -> impl Iterator<Item = &ScheduledMove> {
        self.history.iter()
    }

    pub fn stats(&self) -> &MoveStats {
        &self.stats
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.stats = MoveStats::default();
        self.last_trigger = None;
    }
}
