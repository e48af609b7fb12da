//! Session state
//!
//! Everything one play session owns: statistics, the character, the live
//! collectibles, the current level and the runtime RNG.

use super::collectible::{CollectibleRegistry, DEFAULT_PICKUP_RADIUS};
use super::controller::CharacterController;
use super::level::{Level, LevelGenerator, LevelLayout};
use super::probe::{GroundProbeResult, RayCaster};
use super::rng::RngSource;
use super::stats::ProgressionStats;
use crate::settings::Settings;

/// Complete simulation session
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Seed of the runtime RNG (jump jitter, yaw wobble, glitch rolls)
    pub seed: u64,
    pub stats: ProgressionStats,
    pub controller: CharacterController,
    pub collectibles: CollectibleRegistry,
    /// Layout used by `rebuild`
    pub layout: LevelLayout,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) rng: RngSource,
    generator: LevelGenerator,
    level: Option<Level>,
}

impl SessionState {
    /// Create a session with no level yet
    pub fn new(settings: &Settings, seed: u64) -> Self {
        let layout = settings.layout;
        log::info!(
            "Session started (seed {}, layout {})",
            seed,
            layout.as_str()
        );
        Self {
            seed,
            stats: ProgressionStats::new(),
            controller: CharacterController::new(settings.controller.clone(), layout.spawn_point()),
            collectibles: CollectibleRegistry::new(DEFAULT_PICKUP_RADIUS),
            layout,
            time_ticks: 0,
            rng: RngSource::new(seed),
            generator: LevelGenerator::new(settings.generator.clone()),
            level: None,
        }
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    /// Build a fresh level from the current stats and hand its stars to the
    /// registry. The previous level's stars are discarded.
    pub fn rebuild(&mut self, wall_clock_seed: f64) -> &Level {
        let level = self
            .generator
            .build_layout(self.layout, &self.stats, wall_clock_seed);
        self.collectibles.replace(level.collectibles.clone());
        self.level.insert(level)
    }

    /// Put the character at the layout's spawn point and settle it on the ground
    pub fn respawn<C: RayCaster + ?Sized>(&mut self, caster: &C) -> GroundProbeResult {
        let motion = self.controller.motion_mut();
        motion.position = self.layout.spawn_point();
        motion.vertical_velocity = 0.0;
        self.controller.spawn_snap(caster)
    }
}
