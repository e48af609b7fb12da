//! Simulation settings and presets
//!
//! Every tunable of the controller and the level generator lives in a typed
//! record. Controller variants are presets of the same record.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sim::jump::{DEFAULT_CHAIN_COOLDOWN, DEFAULT_COMMIT_WINDOW};
use crate::sim::level::LevelLayout;

/// Named controller tunings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ControllerPreset {
    /// Fast, floaty, jittery movement with floor clipping
    #[default]
    Dreamscape,
    /// Heavier, snappier movement with a long ground probe and no glitches
    Castle,
}

impl ControllerPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControllerPreset::Dreamscape => "Dreamscape",
            ControllerPreset::Castle => "Castle",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dreamscape" | "dream" => Some(ControllerPreset::Dreamscape),
            "castle" => Some(ControllerPreset::Castle),
            _ => None,
        }
    }

    /// Full controller tuning for this preset
    pub fn config(&self) -> ControllerConfig {
        match self {
            ControllerPreset::Dreamscape => ControllerConfig::default(),
            ControllerPreset::Castle => ControllerConfig {
                speed: 6.0,
                jump_impulse: 8.0,
                gravity: 20.0,
                half_height: 0.5,
                probe_lift: 0.5,
                probe_distance: 2.0,
                jump_jitter: 0.0,
                yaw_turn_rate: 10.0,
                yaw_wobble: 0.0,
                glitch_probability: 0.0,
                ..ControllerConfig::default()
            },
        }
    }
}

/// Character controller tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Horizontal speed (units/s)
    pub speed: f32,
    /// Base vertical velocity of a jump
    pub jump_impulse: f32,
    /// Downward acceleration (units/s²)
    pub gravity: f32,
    /// Half the character's vertical extent; position is the body centre
    pub half_height: f32,
    /// Probe origin height above the feet
    pub probe_lift: f32,
    /// Probe ray length
    pub probe_distance: f32,

    // === Jumping ===
    /// Max random offset added to each jump impulse
    pub jump_jitter: f32,
    /// Seconds a jump blocks further jumps, independent of landing
    pub commit_window: f32,
    /// Seconds new chains are blocked after a full triple jump
    pub chain_cooldown: f32,

    // === Facing ===
    /// Exponential easing rate toward the movement heading (1/s)
    pub yaw_turn_rate: f32,
    /// Max random wobble added to the target heading (degrees)
    pub yaw_wobble: f32,

    // === Glitch fallback ===
    /// Per-tick chance of clipping through the floor during a fast fall
    pub glitch_probability: f32,
    /// Falls faster than this (negative) velocity can glitch
    pub glitch_velocity: f32,
    /// Distance dropped per glitch
    pub glitch_drop: f32,

    // === Spawn ===
    /// Height the initial spawn probe starts above the body centre
    pub spawn_probe_lift: f32,
    /// Length of the initial spawn probe
    pub spawn_probe_distance: f32,
    /// Centre height used when the spawn probe finds nothing
    pub spawn_fallback_height: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            speed: 11.0,
            jump_impulse: 2.7,
            gravity: 1.3,
            half_height: 0.85,
            probe_lift: 0.1,
            probe_distance: 0.55,

            jump_jitter: 0.3,
            commit_window: DEFAULT_COMMIT_WINDOW,
            chain_cooldown: DEFAULT_CHAIN_COOLDOWN,

            yaw_turn_rate: 9.0,
            yaw_wobble: 5.0,

            glitch_probability: 0.01,
            glitch_velocity: -5.0,
            glitch_drop: 0.5,

            spawn_probe_lift: 5.0,
            spawn_probe_distance: 20.0,
            spawn_fallback_height: 1.0,
        }
    }
}

/// Procedural level tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Ground grid spans [-n, n] on both axes
    pub ground_half_extent: i32,
    /// Towers and stars are placed in [-n, n] on both axes
    pub placement_half_extent: i32,

    // === Towers ===
    pub tower_base_count: u32,
    /// Tower count cycles through `base .. base + modulus`
    pub tower_count_modulus: u32,
    /// Towers added per second of play (before the modulus)
    pub towers_per_second: f64,
    pub tower_base_height: i32,
    /// Jumps needed for each extra level of max tower height
    pub jumps_per_tower_level: u64,
    /// Horizontal jitter of stacked tower blocks
    pub tower_horizontal_jitter: f32,
    /// Vertical jitter of stacked tower blocks
    pub tower_vertical_jitter: f32,

    // === Stars ===
    pub yellow_stars: u32,
    pub red_stars: u32,
    pub green_stars: u32,
    pub star_base_height: i32,
    /// Yellow stars needed for each extra unit of max star height
    pub yellow_per_star_level: u64,
    pub star_jitter: f32,
    pub star_min_spin: f32,
    pub star_max_spin: f32,

    // === Block glitching ===
    /// Chance a block is nudged out of place
    pub block_jitter_probability: f32,
    pub block_jitter_offset: f32,
    pub block_jitter_scale: f32,
    pub block_saturation: f32,
    pub block_value: f32,
    pub block_value_jitter: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            ground_half_extent: 18,
            placement_half_extent: 15,

            tower_base_count: 4,
            tower_count_modulus: 12,
            towers_per_second: 2.5,
            tower_base_height: 7,
            jumps_per_tower_level: 20,
            tower_horizontal_jitter: 0.2,
            tower_vertical_jitter: 0.1,

            yellow_stars: 50,
            red_stars: 14,
            green_stars: 14,
            star_base_height: 15,
            yellow_per_star_level: 120,
            star_jitter: 0.3,
            star_min_spin: 45.0,
            star_max_spin: 75.0,

            block_jitter_probability: 0.05,
            block_jitter_offset: 0.1,
            block_jitter_scale: 0.05,
            block_saturation: 0.9,
            block_value: 0.7,
            block_value_jitter: 0.1,
        }
    }
}

/// Complete simulation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub controller: ControllerConfig,
    pub generator: GeneratorConfig,
    pub layout: LevelLayout,
}

impl Settings {
    /// Settings with the controller tuned by a preset
    pub fn from_preset(preset: ControllerPreset) -> Self {
        Self {
            controller: preset.config(),
            ..Self::default()
        }
    }

    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings in {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_names() {
        assert_eq!(ControllerPreset::from_str("CASTLE"), Some(ControllerPreset::Castle));
        assert_eq!(ControllerPreset::from_str("dream"), Some(ControllerPreset::Dreamscape));
        assert_eq!(ControllerPreset::from_str("mario"), None);
        for preset in [ControllerPreset::Dreamscape, ControllerPreset::Castle] {
            assert_eq!(ControllerPreset::from_str(preset.as_str()), Some(preset));
        }
    }

    #[test]
    fn test_castle_preset_disables_glitches() {
        let config = ControllerPreset::Castle.config();
        assert_eq!(config.glitch_probability, 0.0);
        assert_eq!(config.jump_jitter, 0.0);
        assert_eq!(config.probe_distance, 2.0);
        // Untouched fields keep the reference values
        assert_eq!(config.commit_window, DEFAULT_COMMIT_WINDOW);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "controller": { "speed": 4.0 } }"#).unwrap();
        assert_eq!(settings.controller.speed, 4.0);
        assert_eq!(settings.controller.gravity, ControllerConfig::default().gravity);
        assert_eq!(settings.generator, GeneratorConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings::from_preset(ControllerPreset::Castle);
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(Settings::from_json("{ not json").is_err());
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let settings = Settings::load(Path::new("/nonexistent/glitch-platformer.json"));
        assert_eq!(settings, Settings::default());
    }
}
