use std::{f32::consts::PI, path::PathBuf};

use audio_cube_core::{
    analysis::band_ranges, render_net, AppConfig, Band, CubeEngine, Face, SpectrumAnalyzer,
    TickReport,
};
use clap::{Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

/// Upper bound on frames for any run, so a misconfigured solver cannot hang.
const MAX_FRAMES: usize = 1_000_000;

fn main() -> audio_cube_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Play { moves, keys } => run_play(config, &moves, keys),
        Commands::Scramble {
            count,
            seed,
            warmup,
        } => run_scramble(config, count, seed, warmup),
        Commands::Listen { seconds, seed } => run_listen(config, seconds, seed),
    }
}

fn run_play(config: AppConfig, moves: &str, keys: bool) -> audio_cube_core::Result<()> {
    let mut engine = CubeEngine::new(config);

    if keys {
        for key in moves.chars().filter(|c| !c.is_whitespace()) {
            if engine.trigger_key(key).is_none() {
                tracing::warn!(%key, "ignoring key that is not a face letter");
            }
        }
    } else {
        engine.trigger_notation(moves)?;
    }

    let frames = run_while(&mut engine, |engine| !engine.is_settled());
    tracing::info!(frames, solved = engine.cube().is_solved(), "moves played");

    print!("{}", render_net(engine.cube()));
    println!("{}", engine.hud().to_text());
    Ok(())
}

fn run_scramble(
    mut config: AppConfig,
    count: usize,
    seed: u64,
    warmup: Option<f32>,
) -> audio_cube_core::Result<()> {
    if let Some(warmup) = warmup {
        config.solver.warmup_seconds = warmup;
    }
    let mut engine = CubeEngine::new(config);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    for _ in 0..count {
        let face = Face::ALL[rng.random_range(0..Face::ALL.len())];
        engine.trigger_move(face, rng.random_bool(0.5));
    }
    tracing::info!(count, seed, backlog = engine.undo_stack().len(), "scramble queued");

    run_while(&mut engine, |engine| !engine.is_settled());
    println!("Scrambled:");
    print!("{}", render_net(engine.cube()));

    let frames = run_while(&mut engine, |engine| {
        !engine.is_settled() || !engine.undo_stack().is_empty()
    });
    tracing::info!(
        frames,
        seconds = engine.elapsed_seconds(),
        solved = engine.cube().is_solved(),
        "undo stack drained"
    );

    println!("Unwound:");
    print!("{}", render_net(engine.cube()));
    println!("{}", engine.hud().to_text());
    Ok(())
}

fn run_listen(config: AppConfig, seconds: f32, seed: u64) -> audio_cube_core::Result<()> {
    let sample_rate = config.audio.sample_rate.max(1);
    let block_size = config.audio.block_size.max(2);
    let angle_step = config.animation.angle_step;
    let block_seconds = block_size as f32 / sample_rate as f32;

    let mut engine = CubeEngine::new(config);
    let mut analyzer = SpectrumAnalyzer::new();
    let mut signal = SyntheticSignal::new(seed, block_size);

    let blocks = (seconds / block_seconds).ceil() as usize;
    tracing::info!(blocks, sample_rate, block_size, "listening to synthetic signal");

    for _ in 0..blocks {
        let samples = signal.next_block();
        let spectrum = analyzer.process_block(&samples)?;
        if let Some(hit) = engine.observe_spectrum(&spectrum) {
            tracing::info!(trigger = %hit.label(), clockwise = hit.clockwise, "music move");
        }
        log_tick(&engine.advance(angle_step, block_seconds));
    }

    print!("{}", render_net(engine.cube()));
    println!("{}", engine.hud().to_text());
    Ok(())
}

/// Steps the engine at its configured pace while `busy` holds.
fn run_while(engine: &mut CubeEngine, busy: impl Fn(&CubeEngine) -> bool) -> usize {
    let mut frames = 0;
    while busy(engine) && frames < MAX_FRAMES {
        log_tick(&engine.step());
        frames += 1;
    }
    if frames == MAX_FRAMES {
        tracing::warn!(frames, "gave up waiting for the engine");
    }
    frames
}

fn log_tick(report: &TickReport) {
    if report.solver_latched {
        tracing::info!("solver took over");
    }
    if !report.solver_moves.is_empty() {
        let moves: Vec<String> = report.solver_moves.iter().map(|mv| mv.to_string()).collect();
        tracing::debug!(moves = %moves.join(" "), "solver step");
    }
}

/// Quiet noise with occasional tone bursts, each centred in one of the six
/// trigger bands.
struct SyntheticSignal {
    rng: ChaCha8Rng,
    block_size: usize,
}

impl SyntheticSignal {
    const NOISE: f32 = 0.02;
    const BURST_CHANCE: f64 = 0.08;
    const BURST_LEVEL: f32 = 0.6;

    fn new(seed: u64, block_size: usize) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            block_size,
        }
    }

    fn next_block(&mut self) -> Vec<f32> {
        let len = self.block_size;
        let mut block: Vec<f32> = (0..len)
            .map(|_| self.rng.random_range(-1.0f32..1.0) * Self::NOISE)
            .collect();

        if self.rng.random_bool(Self::BURST_CHANCE) {
            let band = Band::ALL[self.rng.random_range(0..Band::ALL.len())];
            let bin = band_centre_bin(band, len / 2 + 1);
            for (i, sample) in block.iter_mut().enumerate() {
                *sample += Self::BURST_LEVEL * (2.0 * PI * bin as f32 * i as f32 / len as f32).sin();
            }
        }

        block
    }
}

fn band_centre_bin(band: Band, bins: usize) -> usize {
    let range = band_ranges(bins)[band as usize].clone();
    ((range.start + range.end) / 2).max(1)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Audio-driven Rubik's cube engine", long_about = None)]
struct Cli {
    /// JSON configuration file; missing fields use the defaults.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a sequence of moves and print the resulting cube.
    Play {
        /// Moves in notation (`"R U' F"`), or key presses with `--keys`.
        moves: String,
        /// Read `moves` as key presses: lowercase clockwise, uppercase
        /// counter-clockwise.
        #[arg(short, long)]
        keys: bool,
    },
    /// Scramble with random moves, then let the solver wind them back.
    Scramble {
        /// Number of random moves.
        #[arg(short = 'n', long, default_value_t = 20)]
        count: usize,
        /// Seed for the random scramble.
        #[arg(short, long, default_value_t = 1)]
        seed: u64,
        /// Override the solver warm-up in seconds.
        #[arg(short, long)]
        warmup: Option<f32>,
    },
    /// Drive the cube from a synthetic audio signal.
    Listen {
        /// Length of the signal in seconds.
        #[arg(short = 't', long, default_value_t = 60.0)]
        seconds: f32,
        /// Seed for the synthetic signal.
        #[arg(short, long, default_value_t = 7)]
        seed: u64,
    },
}
