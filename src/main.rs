//! Echolocation headless entry point
//!
//! Runs one scripted session against a synthetic microphone and prints the
//! terminal summary as JSON. Real hosts drive [`Runtime`] from their own
//! sensor, audio and frame callbacks instead.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use anyhow::Context;
    use clap::Parser;
    use echolocation::Tuning;
    use echolocation::platform::{HostEvent, Runtime, SyntheticMic};
    use echolocation::sim::{Arena, GameEvent, GameState};

    env_logger::init();

    let args = DemoArgs::parse();
    let mut tuning = match &args.tuning {
        Some(path) => Tuning::load(path)
            .with_context(|| format!("loading tuning from {}", path.display()))?,
        None => Tuning::default(),
    };
    if let Some(difficulty) = args.difficulty {
        tuning.apply_difficulty(difficulty);
    }
    tuning.validate()?;

    log::info!("Echolocation (headless) starting, seed {}", args.seed);

    let arena = Arena::new(1080.0, 1920.0);
    let state = GameState::new(arena, tuning, args.seed);
    // Quiet room with the odd loud burst
    let mic = SyntheticMic::with_window(
        args.seed,
        MIC_WINDOW_MS,
        vec![300, 900, 3_000, 12_000, 600, 25_000],
    );
    let mut runtime = Runtime::new(state, mic);
    let sensor = runtime.sender();

    runtime.start_with_countdown(3);

    let limit_ms = args.seconds.saturating_mul(1_000);
    let mut t_ms = 0u64;
    let mut summary = None;
    while t_ms < limit_ms && summary.is_none() {
        // Lazy figure-eight lean
        let phase = t_ms as f32 / 1_000.0;
        let tilt = HostEvent::Tilt {
            x: (phase * 0.7).sin() * 2.0,
            y: (phase * 1.3).cos() * 2.0,
        };
        sensor.send(tilt).context("sensor queue closed")?;

        runtime.advance(FRAME_MS);
        t_ms += FRAME_MS;

        for event in runtime.drain_events() {
            match event {
                GameEvent::GameOver(s) => summary = Some(s),
                GameEvent::SoundSampled { level, opacity } => {
                    log::info!("Sound level {:.0} dB, corals at {}", level, opacity)
                }
                other => log::debug!("{:?}", other),
            }
        }
    }

    match summary {
        Some(summary) => println!("{}", serde_json::to_string_pretty(&summary)?),
        None => {
            let view = runtime.render_state();
            log::info!("Survived the whole run");
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser hosts embed the library directly
}

/// Simulation step per loop iteration (ms)
#[cfg(not(target_arch = "wasm32"))]
const FRAME_MS: u64 = 20;

/// Length of each synthetic microphone block (ms of audio)
#[cfg(not(target_arch = "wasm32"))]
const MIC_WINDOW_MS: u64 = 50;

/// Command-line arguments for a headless session
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, clap::Parser)]
#[command(name = "echolocation", version, about)]
struct DemoArgs {
    /// Seed for coral placement and synthetic microphone noise
    #[arg(long, default_value_t = 2024)]
    seed: u64,

    /// Stop after this many seconds of simulated time
    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = 120,
        value_parser = clap::value_parser!(u64).range(1..=86_400)
    )]
    seconds: u64,

    /// Difficulty preset applied on top of the tuning file
    #[arg(long, value_name = "easy|normal|hard", value_parser = parse_difficulty)]
    difficulty: Option<echolocation::Difficulty>,

    /// JSON tuning file
    #[arg(long, value_name = "PATH")]
    tuning: Option<std::path::PathBuf>,
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_difficulty(s: &str) -> Result<echolocation::Difficulty, String> {
    echolocation::Difficulty::from_str(s).ok_or_else(|| format!("unknown difficulty `{}`", s))
}
