//! Quarter-turn animation state machine.
//!
//! At most one layer turns at a time. A move is started with
//! [`RotationEngine::begin`], advanced with [`RotationEngine::tick`], and
//! committed to the [`Cube`] once the angle reaches a quarter turn.

use std::f32::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::{Axis, Cube, Direction, Face, Move};

/// Angle of a quarter turn in radians.
pub const QUARTER_TURN: f32 = FRAC_PI_2;

/// The layer a face move turns, with the direction actually applied to the
/// cube after the per-face sign correction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerTurn {
    pub axis: Axis,
    pub layer: i8,
    pub direction: Direction,
}

impl LayerTurn {
    pub fn for_move(mv: Move) -> Self {
        let (axis, layer) = match mv.face {
            Face::Right => (Axis::X, 1),
            Face::Left => (Axis::X, -1),
            Face::Up => (Axis::Y, -1),
            Face::Down => (Axis::Y, 1),
            Face::Front => (Axis::Z, 1),
            Face::Back => (Axis::Z, -1),
        };
        // Back, Left and Up look the other way round on screen.
        let direction = match mv.face {
            Face::Back | Face::Left | Face::Up => mv.direction.reversed(),
            _ => mv.direction,
        };
        Self {
            axis,
            layer,
            direction,
        }
    }

    pub fn sign(&self) -> f32 {
        f32::from(self.direction.sign())
    }
}

/// The turn currently being animated.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveRotation {
    pub mv: Move,
    pub turn: LayerTurn,
    /// Signed angle in radians; its magnitude grows towards [`QUARTER_TURN`].
    pub angle: f32,
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub enum RotationState {
    #[default]
    Idle,
    Animating(ActiveRotation),
}

/// Owns the [`RotationState`] and enforces that only one turn animates.
#[derive(Debug, Default, Clone)]
pub struct RotationEngine {
    state: RotationState,
}

impl RotationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RotationState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, RotationState::Idle)
    }

    pub fn active(&self) -> Option<&ActiveRotation> {
        match &self.state {
            RotationState::Idle => None,
            RotationState::Animating(active) => Some(active),
        }
    }

    /// Starts animating `mv`. Returns `false` and changes nothing if another
    /// turn is still in flight.
    pub fn begin(&mut self, mv: Move) -> bool {
        if !self.is_idle() {
            tracing::trace!(%mv, "rotation busy, move refused");
            return false;
        }

        let turn = LayerTurn::for_move(mv);
        tracing::debug!(%mv, axis = %turn.axis, layer = turn.layer, "rotation started");
        self.state = RotationState::Animating(ActiveRotation {
            mv,
            turn,
            angle: 0.0,
        });
        true
    }

    /// Advances the active turn by `delta_angle` radians. When the quarter
    /// turn is reached the layer permutation is applied to `cube`, the engine
    /// returns to idle and the finished move is returned.
    pub fn tick(&mut self, cube: &mut Cube, delta_angle: f32) -> Option<Move> {
        let RotationState::Animating(active) = &mut self.state else {
            return None;
        };

        active.angle += delta_angle.max(0.0) * active.turn.sign();
        if active.angle.abs() < QUARTER_TURN {
            return None;
        }

        let ActiveRotation { mv, turn, .. } = *active;
        cube.apply_layer_permutation(turn.axis, turn.layer, turn.direction);
        self.state = RotationState::Idle;
        tracing::debug!(%mv, "rotation completed");
        Some(mv)
    }

    /// Drops any in-flight turn without touching the cube.
    pub fn reset(&mut self) {
        self.state = RotationState::Idle;
    }
}
