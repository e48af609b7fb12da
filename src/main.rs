//! Glitch Platformer headless runner
//!
//! Builds a level, lets the autopilot play it for a while at a fixed
//! timestep and prints the final progression stats as JSON.

use std::path::PathBuf;

use clap::Parser;
use env_logger::{Builder, Env};
use log::LevelFilter;

use glitch_platformer::consts::{MAX_SUBSTEPS, SIM_DT};
use glitch_platformer::headless::{BlockWorld, autopilot_input};
use glitch_platformer::sim::{LevelLayout, SessionState, tick};
use glitch_platformer::{ControllerPreset, Settings};

/// Below this height the character is considered lost and respawned
const RESPAWN_HEIGHT: f32 = -20.0;
/// Seconds between progress log lines
const REPORT_INTERVAL: f64 = 5.0;

/// Run the platformer simulation without a renderer
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings JSON file (defaults are used when absent or invalid)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Controller preset: dreamscape or castle (overrides the settings file)
    #[arg(short, long)]
    preset: Option<String>,

    /// Level layout: procedural or castle (overrides the settings file)
    #[arg(short, long)]
    layout: Option<String>,

    /// Simulated seconds to play
    #[arg(long, default_value_t = 60.0)]
    seconds: f64,

    /// Seed for the runtime RNG
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Rebuild the level every N simulated seconds (0 disables)
    #[arg(long, default_value_t = 20.0)]
    rebuild_every: f64,

    /// Host frame length in milliseconds, fed through the fixed-step accumulator
    #[arg(long, default_value_t = 16.0)]
    frame_ms: f32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let env = Env::default().default_filter_or(level.to_string());
    let _ = Builder::from_env(env).try_init();
}

/// Host frame length in seconds, kept within [1 ms, 100 ms].
///
/// Non-finite values fall back to one simulation step, otherwise the
/// accumulator never fills and the run never ends.
fn frame_seconds(frame_ms: f32) -> f32 {
    let dt = frame_ms / 1000.0;
    if dt.is_finite() { dt.clamp(0.001, 0.1) } else { SIM_DT }
}

/// Simulated seconds to play; negative or non-finite requests play nothing
fn play_seconds(seconds: f64) -> f64 {
    if seconds.is_finite() { seconds.max(0.0) } else { 0.0 }
}

fn resolve_settings(args: &Args) -> Settings {
    let mut settings = match &args.settings {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };

    if let Some(name) = &args.preset {
        match ControllerPreset::from_str(name) {
            Some(preset) => settings.controller = preset.config(),
            None => log::warn!("Unknown preset '{}', keeping the current controller", name),
        }
    }
    if let Some(name) = &args.layout {
        match LevelLayout::from_str(name) {
            Some(layout) => settings.layout = layout,
            None => log::warn!("Unknown layout '{}', keeping {}", name, settings.layout.as_str()),
        }
    }
    settings
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    log::info!("Glitch Platformer (headless) starting...");

    let settings = resolve_settings(&args);
    let mut state = SessionState::new(&settings, args.seed);
    let mut world = BlockWorld::from_level(state.rebuild(0.0));
    let spawn = state.respawn(&world);
    log::info!(
        "Spawned at {:?} ({})",
        state.controller.position(),
        if spawn.hit { "on ground" } else { "fallback height" }
    );

    let seconds = play_seconds(args.seconds);
    let frame_dt = frame_seconds(args.frame_ms);
    let mut accumulator = 0.0f32;
    let mut next_rebuild = args.rebuild_every;
    let mut next_report = REPORT_INTERVAL;

    while state.stats.time_spent < seconds {
        accumulator += frame_dt;
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = autopilot_input(&state);
            tick(&mut state, &world, &input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;
        }

        if state.controller.position().y < RESPAWN_HEIGHT {
            log::info!("Fell out of the world, respawning");
            state.respawn(&world);
        }

        let elapsed = state.stats.time_spent;
        if args.rebuild_every > 0.0 && elapsed >= next_rebuild {
            // Simulated time stands in for the wall clock so runs are repeatable
            world = BlockWorld::from_level(state.rebuild(elapsed));
            state.respawn(&world);
            next_rebuild += args.rebuild_every;
        }
        if elapsed >= next_report {
            log::info!(
                "t={:.0}s moves={} jumps={} stars={} glitches={}",
                elapsed,
                state.stats.moves,
                state.stats.jumps,
                state.stats.total_stars(),
                state.stats.glitches
            );
            next_report += REPORT_INTERVAL;
        }
    }

    match serde_json::to_string_pretty(&state.stats) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize stats: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_seconds_is_always_usable() {
        assert!((frame_seconds(16.0) - 0.016).abs() < 1e-6);
        assert_eq!(frame_seconds(0.0), 0.001);
        assert_eq!(frame_seconds(-5.0), 0.001);
        assert_eq!(frame_seconds(5000.0), 0.1);
        assert_eq!(frame_seconds(f32::NAN), SIM_DT);
        assert_eq!(frame_seconds(f32::INFINITY), SIM_DT);
        assert_eq!(frame_seconds(f32::NEG_INFINITY), SIM_DT);
    }

    #[test]
    fn test_play_seconds() {
        assert_eq!(play_seconds(12.5), 12.5);
        assert_eq!(play_seconds(-1.0), 0.0);
        assert_eq!(play_seconds(f64::NAN), 0.0);
        assert_eq!(play_seconds(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_nan_frame_length_still_finishes() {
        let settings = Settings::default();
        let mut state = SessionState::new(&settings, 0);
        let world = BlockWorld::from_level(state.rebuild(0.0));
        state.respawn(&world);

        let frame_dt = frame_seconds(f32::NAN);
        let mut accumulator = 0.0f32;
        let mut frames = 0;
        while state.stats.time_spent < 1.0 && frames < 10_000 {
            accumulator += frame_dt;
            while accumulator >= SIM_DT {
                let input = autopilot_input(&state);
                tick(&mut state, &world, &input, SIM_DT);
                accumulator -= SIM_DT;
            }
            frames += 1;
        }
        assert!(state.stats.time_spent >= 1.0);
        assert!(frames < 10_000);
    }
}
