//! Core library for the audio-driven cube.
//!
//! The crate owns the puzzle model and everything that moves it: the
//! quarter-turn animation state machine, the move queue, the mapping from
//! keyboard and audio triggers to moves, and the undo-stack solver that
//! winds the scramble back. Rendering, audio capture and input handling live
//! outside and talk to [`CubeEngine`] through plain values.

pub mod analysis;
pub mod config;
pub mod cube;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod notation;
pub mod render;
pub mod rotation;
pub mod solver;
pub mod timeline;

pub use analysis::{Band, BandHit, BandTrigger, SpectrumAnalyzer};
pub use config::{AppConfig, AudioConfig, SolverConfig, TriggerConfig};
pub use cube::{Axis, Color, Cube, Cubelet, Position, Stickers};
pub use engine::{CubeEngine, TickReport};
pub use error::{CubeError, Result};
pub use mapping::{key_to_move, MoveStats, StimulusMapper};
pub use notation::{Direction, Face, Move};
pub use render::{render_net, HudSnapshot, RenderSnapshot};
pub use rotation::{RotationEngine, RotationState};
pub use solver::{SolverPhase, UndoSolver, UndoStack};
pub use timeline::{MoveOrigin, PlaybackClock, ScheduledMove, Scheduler};
