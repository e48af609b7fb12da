//! Player telemetry accumulated over a session
//!
//! Written by the controller and the collectible registry, read by the level
//! generator and the HUD.

use serde::{Deserialize, Serialize};

use crate::consts::BONUS_STAR_THRESHOLD;

/// Star (collectible) categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StarKind {
    Yellow,
    Red,
    Green,
}

impl StarKind {
    /// All kinds in generation order
    pub const ALL: [StarKind; 3] = [StarKind::Yellow, StarKind::Red, StarKind::Green];

    pub fn as_str(&self) -> &'static str {
        match self {
            StarKind::Yellow => "yellow",
            StarKind::Red => "red",
            StarKind::Green => "green",
        }
    }
}

/// Per-kind star counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarTally {
    pub yellow: u64,
    pub red: u64,
    pub green: u64,
}

impl StarTally {
    pub fn get(&self, kind: StarKind) -> u64 {
        match kind {
            StarKind::Yellow => self.yellow,
            StarKind::Red => self.red,
            StarKind::Green => self.green,
        }
    }

    /// Count one pickup of `kind`
    pub fn add(&mut self, kind: StarKind) {
        let slot = match kind {
            StarKind::Yellow => &mut self.yellow,
            StarKind::Red => &mut self.red,
            StarKind::Green => &mut self.green,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn total(&self) -> u64 {
        self.yellow + self.red + self.green
    }
}

/// Accumulated player statistics for one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionStats {
    /// Ticks with non-zero horizontal input
    pub moves: u64,
    /// Successful jump triggers
    pub jumps: u64,
    pub stars: StarTally,
    /// Seconds of simulated time
    pub time_spent: f64,
    /// Glitch-fallback events
    pub glitches: u64,
}

impl ProgressionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add elapsed time; non-positive or non-finite values are ignored
    pub fn add_time(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.time_spent += dt as f64;
        }
    }

    pub fn total_stars(&self) -> u64 {
        self.stars.total()
    }

    /// HUD bonus banner condition
    pub fn bonus_unlocked(&self) -> bool {
        self.total_stars() >= BONUS_STAR_THRESHOLD
    }

    /// Sky tint hue in degrees, drifting with play time
    pub fn sky_hue(&self) -> f32 {
        ((self.time_spent * 2.0) % 360.0) as f32
    }
}
