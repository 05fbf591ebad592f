use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{rotation::QUARTER_TURN, Result};

/// Top-level configuration structure for the application.
///
/// Every section falls back to its defaults, so a partial JSON file only
/// needs the values it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub animation: AnimationConfig,
    pub solver: SolverConfig,
    pub trigger: TriggerConfig,
    pub history: HistoryConfig,
    pub audio: AudioConfig,
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Frame pacing of the quarter-turn animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Radians added to the active turn per frame.
    pub angle_step: f32,
    /// Seconds per frame used when the driver does not measure time itself.
    pub frame_seconds: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            angle_step: QUARTER_TURN / 10.0,
            frame_seconds: 1.0 / 60.0,
        }
    }
}

/// Undo-stack solver timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Seconds after start (or rebuild) before the solver starts draining.
    pub warmup_seconds: f32,
    /// Frames to wait between drain steps before any speed-up applies.
    pub cooldown_frames: u32,
    /// Speed-ups keyed by seconds spent in the active phase. The last step
    /// whose threshold has been passed wins.
    pub pace: Vec<PaceStep>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            warmup_seconds: 20.0,
            cooldown_frames: 10,
            pace: vec![
                PaceStep::new(20.0, 2, 2),
                PaceStep::new(30.0, 3, 3),
                PaceStep::new(40.0, 4, 4),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaceStep {
    pub after_seconds: f32,
    /// Moves popped per drain step.
    pub batch: usize,
    /// Divides [`SolverConfig::cooldown_frames`].
    pub cooldown_divisor: u32,
}

impl PaceStep {
    pub fn new(after_seconds: f32, batch: usize, cooldown_divisor: u32) -> Self {
        Self {
            after_seconds,
            batch,
            cooldown_divisor,
        }
    }
}

/// Adaptive thresholds of the audio band trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Smoothing factor of the per-band moving average.
    pub ema_alpha: f32,
    /// A band fires when its level exceeds its average times this.
    pub multiplier: f32,
    /// Levels at or below this never fire.
    pub floor: f32,
    /// Frames to stay quiet after a trigger.
    pub cooldown_frames: u32,
    /// Seed for the clockwise/counter-clockwise coin.
    pub seed: u64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            ema_alpha: 0.08,
            multiplier: 1.5,
            floor: 0.003,
            cooldown_frames: 10,
            seed: 0x5eed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Number of trailing moves kept for the overlay.
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { limit: 200 }
    }
}

/// Configuration specific to the audio subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub block_size: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            block_size: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config =
            AppConfig::from_json_str(r#"{ "solver": { "warmup_seconds": 5.0 }, "history": {} }"#)
                .unwrap();

        assert_eq!(config.solver.warmup_seconds, 5.0);
        assert_eq!(config.solver.cooldown_frames, 10);
        assert_eq!(config.solver.pace.len(), 3);
        assert_eq!(config.history.limit, 200);
        assert_eq!(config.trigger, TriggerConfig::default());
        assert_eq!(config.audio.sample_rate, 48_000);
    }

    #[test]
    fn rejects_malformed_json() {
        let err = AppConfig::from_json_str("{ solver: 1 }").unwrap_err();
        assert!(matches!(err, crate::CubeError::Json(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = AppConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, crate::CubeError::Io(_)));
    }
}
