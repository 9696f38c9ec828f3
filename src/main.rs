//! Shift Runner headless demo
//!
//! Builds a generated level, then flies it on the real-time loop with a
//! simple autopilot and logs HUD lines. Pass a tuning JSON path to try
//! different balance values: `shift-runner tuning.json`.

use std::process::ExitCode;
use std::time::Duration;

use shift_runner::clock::{ClockConfig, LoopEvent, SystemTimeSource, TickClock};
use shift_runner::input::{HeldActions, InputTracker};
use shift_runner::level::{GenerateParams, LevelDef, LevelError, ScriptTrigger, SectionLibrary, SectionMask, assemble};
use shift_runner::script::{ScriptCue, ScriptStep};
use shift_runner::sim::{GameEvent, GamePhase, GameState, tick};
use shift_runner::tuning::Tuning;

/// Demo length in ticks
const DEMO_TICKS: u64 = 60 * 30;
/// Autopilot cruising speed (pixels/second)
const CRUISE_SPEED: f32 = 320.0;
/// Frames between HUD lines
const HUD_EVERY: u64 = 60;

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Shift Runner (headless) starting...");

    let tuning = load_tuning(std::env::args().nth(1));
    let level = match demo_library(&tuning).and_then(|lib| assemble(demo_level(), &lib, &tuning)) {
        Ok(level) => level,
        Err(e) => {
            log::error!("Could not build demo level: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut state = GameState::new(level, tuning);
    let config = ClockConfig::with_tick_seconds(state.tuning.tick_duration);
    let mut clock = TickClock::new(config, Duration::ZERO);
    let mut time = SystemTimeSource::new();
    let mut tracker = InputTracker::new();
    let mut frames = 0u64;

    while clock.ticks() < DEMO_TICKS {
        match clock.next_event(&mut time) {
            LoopEvent::Tick => {
                let input = tracker.sync(autopilot(&state));
                tick(&mut state, &input);
                for event in state.drain_events() {
                    log_event(&event);
                }
                if matches!(state.phase, GamePhase::Complete { .. }) {
                    break;
                }
            }
            LoopEvent::Frame { interp } => {
                frames += 1;
                if frames % HUD_EVERY == 0 {
                    let hud = state.hud();
                    let snap = state.interpolated(interp);
                    log::info!(
                        "score {:>5} | speed {:>5.1} px/s | distance {:>6.1} | hull y {:>5.1} | parts {} | warnings {}",
                        hud.score,
                        hud.speed,
                        hud.distance,
                        snap.hull.y,
                        state.vehicle.alive_parts(),
                        state.warnings().len()
                    );
                }
            }
        }
    }

    log::info!(
        "Demo finished after {} ticks, {} frames ({:.1} ms dropped): score {}, attempts {}",
        clock.ticks(),
        frames,
        clock.dropped().as_secs_f64() * 1000.0,
        state.score,
        state.attempts + 1
    );
    ExitCode::SUCCESS
}

fn load_tuning(path: Option<String>) -> Tuning {
    let Some(path) = path else {
        return Tuning::default();
    };
    let loaded = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()));
    match loaded {
        Ok(tuning) => {
            log::info!("Loaded tuning from {}", path);
            tuning
        }
        Err(e) => {
            log::warn!("Failed to load tuning from {}: {}, using defaults", path, e);
            Tuning::default()
        }
    }
}

/// Hold cruise speed, and flex the formation now and then
fn autopilot(state: &GameState) -> HeldActions {
    let phase_tick = state.time_ticks % 600;
    HeldActions {
        accelerate: state.vehicle.h_speed < CRUISE_SPEED,
        shape_up: phase_tick == 200,
        shape_down: phase_tick == 400,
        ..Default::default()
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::Bump { part, correction } => {
            log::debug!("Bump ({:?}) correction {:.2}", part, correction)
        }
        GameEvent::PartLost { part } => log::info!("Lost part {}", part),
        GameEvent::HullCrashed => log::info!("Hull crashed"),
        GameEvent::PickupCollected { points } => log::debug!("Pickup +{}", points),
        GameEvent::PickupCue => {}
        GameEvent::LevelRestarted => log::info!("Restarting level"),
        GameEvent::LevelComplete { passed, score } => {
            log::info!("Level complete (passed: {}, score {})", passed, score)
        }
        GameEvent::Script(ScriptCue::Say { text, .. }) => log::info!("\"{}\"", text),
        GameEvent::Script(_) => {}
    }
}

/// Build a mask from a per-cell rule over (column, grid row)
fn section(width: usize, rows: usize, cell: impl Fn(usize, usize) -> char) -> Result<SectionMask, LevelError> {
    let text = (0..rows)
        .map(|y| (0..width).map(|x| cell(x, rows - 1 - y)).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n");
    SectionMask::from_ascii(&text)
}

/// Rows 8 to 13 stay open everywhere so the default formation fits through
fn demo_library(tuning: &Tuning) -> Result<SectionLibrary, LevelError> {
    let rows = tuning.level_rows.max(1) as usize;
    let mut lib = SectionLibrary::new();
    lib.register(
        "open",
        section(20, rows, |x, row| if row == 10 && x % 4 == 2 { 'o' } else { '.' })?,
    );
    lib.register(
        "pillars",
        section(24, rows, |x, row| {
            if x % 8 == 4 && (row <= 6 || row >= 15) {
                '#'
            } else if x % 8 == 0 && row == 11 {
                'o'
            } else {
                '.'
            }
        })?,
    );
    lib.register(
        "canyon",
        section(16, rows, |x, row| {
            if row < 5 + x % 3 || row > 16 - x % 2 {
                '#'
            } else if row == 12 && x % 5 == 0 {
                'o'
            } else {
                '.'
            }
        })?,
    );
    Ok(lib)
}

fn demo_level() -> LevelDef {
    LevelDef {
        name: String::from("demo"),
        generate: Some(GenerateParams {
            seed: 7,
            min_length: 240,
            difficulty: 0.2,
            variance: 0.3,
        }),
        triggers: vec![ScriptTrigger {
            distance: 10.0,
            script: vec![ScriptStep::Say {
                text: String::from("Keep the formation tight."),
                seconds: 2.0,
            }],
        }],
        min_score: 200,
        ..Default::default()
    }
}
