//! Tether Dive entry point
//!
//! Runs a headless session against the built-in physics world with a simple
//! autopilot at the controls, then prints the run summary as JSON.
//!
//! Usage: `tether-dive [TUNING] [--seed N] [--settings PATH] [--max-ticks N]`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use glam::Vec2;

use tether_dive::consts::BASE_STEP_MS;
use tether_dive::renderer::{VertexBatch, camera_offset, draw_scene};
use tether_dive::sim::{GameSession, PhysicsWorld, SessionSummary, SimpleWorld, TickInput, tick};
use tether_dive::{SimError, Settings, Tuning};

const DEFAULT_MAX_TICKS: u64 = 60 * 60 * 3;
const RENDER_EVERY: u64 = 60;

#[derive(Parser, Debug)]
#[command(about = "Run a headless tether dive and print its summary as JSON")]
struct Args {
    /// Tuning JSON file (defaults apply to missing keys)
    tuning: Option<PathBuf>,
    /// Session seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Settings JSON file
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Stop after this many ticks even if the diver is alive
    #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
    max_ticks: u64,
}

/// Hold the ascend key below the middle of the area and sweep the pointer
fn autopilot(session: &GameSession, world: &SimpleWorld, tick_index: u64) -> TickInput {
    let diver = session.diver_position(world);
    let (w, h) = (session.tuning.area_width, session.tuning.area_height);
    let sweep = (tick_index as f32 * 0.01).sin();
    TickInput {
        dt: BASE_STEP_MS,
        elapsed_ms: tick_index as f64 * BASE_STEP_MS as f64,
        pointer: Vec2::new(w / 2.0 + sweep * w * 0.4, h * 0.4),
        action_held: diver.y > h * 0.5,
    }
}

fn run(args: Args) -> Result<SessionSummary, SimError> {
    let tuning = match &args.tuning {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let settings = args
        .settings
        .as_deref()
        .map(Settings::load)
        .unwrap_or_default();
    let seed = args.seed.unwrap_or_else(rand::random);
    let max_ticks = args.max_ticks;

    let mut world = SimpleWorld::new(Vec2::new(0.0, tuning.gravity_y), tuning.body_density);
    let spawn = Vec2::new(tuning.area_width / 2.0, 100.0);
    let viewport = Vec2::new(tuning.area_width, tuning.area_height);
    let mut session = GameSession::new(&mut world, seed, tuning, settings, spawn)?;
    let mut batch = VertexBatch::new(viewport, session.settings.quality.circle_segments());
    log::info!(
        "Running seed {} for up to {} ticks ({} bodies)",
        seed,
        max_ticks,
        world.body_count()
    );

    let mut phase = session.phase.label();
    for i in 1..=max_ticks {
        let input = autopilot(&session, &world, i);
        tick(&mut session, &mut world, &input);

        if session.phase.label() != phase {
            phase = session.phase.label();
            log::info!("Tick {}: phase -> {}", i, phase);
        }
        for event in &session.events {
            log::debug!("Tick {}: {:?}", i, event);
        }

        if i % RENDER_EVERY == 0 {
            batch.clear();
            let translation = match session.tuning.bubble_camera_radius {
                Some(_) => camera_offset(session.diver_position(&world), viewport),
                None => Vec2::ZERO,
            };
            draw_scene(&session, &world, &mut batch, translation, input.elapsed_ms);
            log::trace!("Frame {}: {} vertices, {} bytes", i, batch.len(), batch.as_bytes().len());
        }

        if !session.is_running() {
            break;
        }
    }

    Ok(session.summary())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Tether Dive (headless) starting...");

    match run(Args::parse()) {
        Ok(summary) => match serde_json::to_string_pretty(&summary) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(err) => {
                log::error!("Failed to encode summary: {}", err);
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
