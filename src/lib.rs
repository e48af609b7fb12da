//! Glitch Platformer - simulation core for a glitchy block-world platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, jumps, level generation, pickups)
//! - `settings`: Typed controller/generator tuning with presets
//! - `headless`: Reference ray caster for running the core without an engine

pub mod headless;
pub mod settings;
pub mod sim;

pub use settings::{ControllerConfig, ControllerPreset, GeneratorConfig, Settings};

/// Simulation constants shared by the core and its hosts
pub mod consts {
    /// Fixed step used by the headless runner (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Jump chain length before the cooldown kicks in
    pub const MAX_CHAIN: u8 = 3;
    /// Extra impulse per chained jump
    pub const CHAIN_STEP: f32 = 0.25;
    /// Chained jumps beyond this many steps stop adding impulse
    pub const CHAIN_STEP_CAP: u8 = 2;

    /// Total stars needed before the HUD shows its bonus banner
    pub const BONUS_STAR_THRESHOLD: u64 = 50;
}

/// Wrap an angle in degrees to [-180, 180)
#[inline]
pub fn wrap_degrees(mut angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    angle = angle.rem_euclid(360.0);
    if angle >= 180.0 {
        angle -= 360.0;
    }
    angle
}

/// Heading in degrees for a planar direction (x = right, y = forward).
///
/// Forward (+Z) is 0°, right (+X) is 90°.
#[inline]
pub fn heading_degrees(x: f32, forward: f32) -> f32 {
    x.atan2(forward).to_degrees()
}
