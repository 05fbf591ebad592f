use std::{f32::consts::PI, fmt, ops::Range, sync::Arc};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use realfft::{num_complex::Complex32, RealFftPlanner, RealToComplex};
use serde::{Deserialize, Serialize};

use crate::{config::TriggerConfig, CubeError, Face, Result};

/// Upper edges of the six bands as fractions of the spectrum length.
const BAND_EDGES: [f32; 6] = [0.04, 0.10, 0.20, 0.35, 0.55, 0.80];
const EMA_MIN: f32 = 1e-6;

/// One of the six frequency bands, each wired to a face.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    SubBass,
    Bass,
    LowMids,
    Mids,
    UpperMids,
    Highs,
}

impl Band {
    pub const ALL: [Band; 6] = [
        Band::SubBass,
        Band::Bass,
        Band::LowMids,
        Band::Mids,
        Band::UpperMids,
        Band::Highs,
    ];

    pub fn face(self) -> Face {
        match self {
            Band::SubBass => Face::Front,
            Band::Bass => Face::Back,
            Band::LowMids => Face::Up,
            Band::Mids => Face::Down,
            Band::UpperMids => Face::Left,
            Band::Highs => Face::Right,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Band::SubBass => "Sub-bass",
            Band::Bass => "Bass",
            Band::LowMids => "Low mids",
            Band::Mids => "Mids",
            Band::UpperMids => "Upper mids",
            Band::Highs => "Highs",
        }
    }
}

/// Bin range of each band for a spectrum of `len` bins. Every band spans at
/// least one bin as long as the spectrum is long enough to hold them.
pub fn band_ranges(len: usize) -> [Range<usize>; 6] {
    let mut start = 0;
    BAND_EDGES.map(|fraction| {
        let end = ((len as f32 * fraction) as usize).max(start + 1).min(len);
        let range = start..end.max(start);
        start = range.end;
        range
    })
}

/// Mean magnitude of each band; empty bands read as zero.
pub fn band_levels(spectrum: &[f32]) -> [f32; 6] {
    band_ranges(spectrum.len()).map(|range| {
        let band = &spectrum[range];
        if band.is_empty() {
            0.0
        } else {
            band.iter().sum::<f32>() / band.len() as f32
        }
    })
}

/// A band crossing its adaptive threshold.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandHit {
    pub band: Band,
    pub clockwise: bool,
    pub level: f32,
}

impl BandHit {
    pub fn face(&self) -> Face {
        self.band.face()
    }

    /// Overlay text, e.g. `Highs → R`.
    pub fn label(&self) -> String {
        format!("{} → {}", self.band.label(), self.band.face())
    }
}

/// Adaptive six-band onset detector. Each band fires when it jumps above a
/// multiple of its own moving average, so quiet and loud passages both
/// produce moves.
#[derive(Debug, Clone)]
pub struct BandTrigger {
    config: TriggerConfig,
    averages: [f32; 6],
    levels: [f32; 6],
    cooldown: u32,
    rng: ChaCha8Rng,
}

impl BandTrigger {
    pub fn new(config: TriggerConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            averages: [1.0; 6],
            levels: [0.0; 6],
            cooldown: 0,
            rng,
        }
    }

    /// Latest band levels.
    pub fn levels(&self) -> [f32; 6] {
        self.levels
    }

    /// Moving averages the levels are compared against.
    pub fn averages(&self) -> [f32; 6] {
        self.averages
    }

    pub fn reset(&mut self) {
        self.averages = [1.0; 6];
        self.levels = [0.0; 6];
        self.cooldown = 0;
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
    }

    /// Feeds one spectrum frame. `idle` is whether the cube can take a move
    /// right now; when it cannot, averages still update but nothing fires.
    pub fn observe(&mut self, spectrum: &[f32], idle: bool) -> Option<BandHit> {
        let alpha = self.config.ema_alpha;
        self.levels = band_levels(spectrum);
        for (average, level) in self.averages.iter_mut().zip(self.levels) {
            *average = (*average + (level - *average) * alpha).max(EMA_MIN);
        }

        self.cooldown = self.cooldown.saturating_sub(1);
        if !idle || self.cooldown > 0 {
            return None;
        }

        let band = Band::ALL.into_iter().find(|band| {
            let i = *band as usize;
            let level = self.levels[i];
            level > self.config.floor && level > self.averages[i] * self.config.multiplier
        })?;

        self.cooldown = self.config.cooldown_frames;
        let hit = BandHit {
            band,
            clockwise: self.rng.random_bool(0.5),
            level: self.levels[band as usize],
        };
        tracing::debug!(band = band.label(), face = %hit.face(), level = hit.level, "band trigger");
        Some(hit)
    }
}

/// Turns blocks of PCM samples into a magnitude spectrum normalised to
/// roughly `0.0..=1.0`, the input expected by [`BandTrigger`].
pub struct SpectrumAnalyzer {
    fft_planner: RealFftPlanner<f32>,
    fft: Option<FftResources>,
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumAnalyzer {
    pub fn new() -> Self {
        Self {
            fft_planner: RealFftPlanner::new(),
            fft: None,
        }
    }

    /// Hann-windowed magnitude spectrum of `samples`, `len / 2 + 1` bins.
    pub fn process_block(&mut self, samples: &[f32]) -> Result<Vec<f32>> {
        if samples.len() < 2 {
            return Err(CubeError::InvalidInput(
                "spectrum analysis requires blocks with at least two samples",
            ));
        }

        let len = samples.len();
        let fft = self.prepare_fft(len);

        for (index, value) in samples.iter().enumerate() {
            fft.input[index] = *value * hann_value(index, len);
        }

        fft.plan
            .process_with_scratch(&mut fft.input, &mut fft.spectrum, &mut fft.scratch)?;

        // A full-scale sine under a Hann window peaks at len / 4.
        let scale = 4.0 / len as f32;
        Ok(fft
            .spectrum
            .iter()
            .map(|bin| (bin.norm() * scale).min(1.0))
            .collect())
    }

    fn prepare_fft(&mut self, size: usize) -> &mut FftResources {
        if self.fft.as_ref().map_or(true, |fft| fft.size != size) {
            self.fft = None;
        }
        let planner = &mut self.fft_planner;
        self.fft
            .get_or_insert_with(|| FftResources::new(planner, size))
    }
}

struct FftResources {
    size: usize,
    plan: Arc<dyn RealToComplex<f32>>,
    scratch: Vec<Complex32>,
    spectrum: Vec<Complex32>,
    input: Vec<f32>,
}

impl FftResources {
    fn new(planner: &mut RealFftPlanner<f32>, size: usize) -> Self {
        let plan = planner.plan_fft_forward(size);
        Self {
            size,
            scratch: plan.make_scratch_vec(),
            spectrum: plan.make_output_vec(),
            input: plan.make_input_vec(),
            plan,
        }
    }
}

impl fmt::Debug for SpectrumAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectrumAnalyzer")
            .field("fft", &self.fft)
            .finish()
    }
}

impl fmt::Debug for FftResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftResources")
            .field("size", &self.size)
            .finish()
    }
}

fn hann_value(index: usize, len: usize) -> f32 {
    if len <= 1 {
        return 1.0;
    }

    0.5 - 0.5 * ((2.0 * PI * index as f32) / (len as f32 - 1.0)).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger() -> BandTrigger {
        BandTrigger::new(TriggerConfig::default())
    }

    /// A flat spectrum of `base` with one band raised to `peak`.
    fn spectrum_with(band: Option<Band>, base: f32, peak: f32) -> Vec<f32> {
        let mut spectrum = vec![base; 512];
        if let Some(band) = band {
            spectrum[band_ranges(512)[band as usize].clone()].fill(peak);
        }
        spectrum
    }

    #[test]
    fn splits_the_spectrum_into_six_bands() {
        let spectrum: Vec<f32> = (0..100).map(|i| i as f32).collect();
        assert_eq!(band_ranges(100), [0..4, 4..10, 10..20, 20..35, 35..55, 55..80]);
        assert_eq!(band_levels(&spectrum), [1.5, 6.5, 14.5, 27.0, 44.5, 67.0]);
    }

    #[test]
    fn tiny_spectra_still_get_distinct_bands() {
        assert_eq!(band_ranges(3), [0..1, 1..2, 2..3, 3..3, 3..3, 3..3]);
        let levels = band_levels(&[1.0, 2.0, 3.0]);
        assert_eq!(levels, [1.0, 2.0, 3.0, 0.0, 0.0, 0.0]);
        assert_eq!(band_levels(&[]), [0.0; 6]);
    }

    #[test]
    fn silence_never_fires() {
        let mut trigger = trigger();
        for _ in 0..200 {
            assert_eq!(trigger.observe(&[0.0; 512], true), None);
        }
        assert!(trigger.averages().iter().all(|average| *average >= EMA_MIN));
    }

    #[test]
    fn spike_fires_its_face_then_cools_down() {
        let mut trigger = trigger();
        let quiet = spectrum_with(None, 0.01, 0.01);
        for _ in 0..200 {
            trigger.observe(&quiet, true);
        }

        let loud = spectrum_with(Some(Band::Highs), 0.01, 0.5);
        let hit = trigger.observe(&loud, true).expect("spike should fire");
        assert_eq!(hit.band, Band::Highs);
        assert_eq!(hit.face(), Face::Right);
        assert_eq!(hit.label(), "Highs → R");

        for _ in 0..9 {
            assert_eq!(trigger.observe(&loud, true), None);
        }
    }

    #[test]
    fn busy_cube_suppresses_triggers() {
        let mut trigger = trigger();
        let quiet = spectrum_with(None, 0.01, 0.01);
        for _ in 0..200 {
            trigger.observe(&quiet, true);
        }
        let loud = spectrum_with(Some(Band::Bass), 0.01, 0.5);
        assert_eq!(trigger.observe(&loud, false), None);
        assert_eq!(trigger.observe(&loud, true).map(|hit| hit.face()), Some(Face::Back));
    }

    #[test]
    fn same_seed_same_directions() {
        let quiet = spectrum_with(None, 0.01, 0.01);
        let loud = spectrum_with(Some(Band::Mids), 0.01, 0.9);
        let run = || {
            let mut trigger = trigger();
            let mut directions = Vec::new();
            for frame in 0..400 {
                let spectrum = if frame % 40 == 39 { &loud } else { &quiet };
                if let Some(hit) = trigger.observe(spectrum, true) {
                    directions.push(hit.clockwise);
                }
            }
            directions
        };
        let first = run();
        assert!(!first.is_empty());
        assert_eq!(first, run());
    }

    #[test]
    fn analyzer_finds_a_pure_tone() {
        let mut analyzer = SpectrumAnalyzer::new();
        let len = 1024;
        let bin = 64;
        let samples: Vec<f32> = (0..len)
            .map(|i| (2.0 * PI * bin as f32 * i as f32 / len as f32).sin())
            .collect();

        let spectrum = analyzer.process_block(&samples).unwrap();
        assert_eq!(spectrum.len(), len / 2 + 1);
        let peak = spectrum
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(index, _)| index)
            .unwrap();
        assert_eq!(peak, bin);
        assert!(spectrum[bin] > 0.9);
    }

    #[test]
    fn analyzer_replans_when_block_size_changes() {
        let mut analyzer = SpectrumAnalyzer::new();
        let tone = |len: usize| -> Vec<f32> {
            (0..len)
                .map(|i| (2.0 * PI * 16.0 * i as f32 / len as f32).sin())
                .collect()
        };

        assert_eq!(analyzer.process_block(&tone(1024)).unwrap().len(), 513);
        assert_eq!(analyzer.fft.as_ref().map(|fft| fft.size), Some(1024));

        let spectrum = analyzer.process_block(&tone(512)).unwrap();
        assert_eq!(spectrum.len(), 257);
        assert!(spectrum[16] > 0.9);
        assert_eq!(analyzer.fft.as_ref().map(|fft| fft.size), Some(512));

        assert_eq!(analyzer.process_block(&tone(1024)).unwrap().len(), 513);
        assert_eq!(analyzer.fft.as_ref().map(|fft| fft.size), Some(1024));
    }

    #[test]
    fn analyzer_rejects_short_blocks() {
        let mut analyzer = SpectrumAnalyzer::new();
        assert!(matches!(
            analyzer.process_block(&[0.5]),
            Err(CubeError::InvalidInput(_))
        ));
    }
}
