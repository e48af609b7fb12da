//! Star collectibles and pickup detection

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::stats::{ProgressionStats, StarKind};

/// Reference pickup distance
pub const DEFAULT_PICKUP_RADIUS: f32 = 1.5;

/// Bob amplitude of the idle animation
const BOB_HEIGHT: f32 = 0.25;
/// Bob frequency (radians per second)
const BOB_RATE: f32 = 4.0;
/// Base render scale of a star
const BASE_SCALE: f32 = 0.5;
/// Scale pulse amplitude (fraction of base scale)
const PULSE_AMOUNT: f32 = 0.1;
/// Seconds for one full grow/shrink pulse
const PULSE_PERIOD: f32 = 1.2;

/// A spawned star
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    /// Rest position (the bob animation is presentation only)
    pub position: Vec3,
    pub kind: StarKind,
    /// Offset into the bob cycle
    pub animation_phase: f32,
    /// Degrees per second
    pub spin_speed: f32,
}

/// Render transform of a collectible at a point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectiblePose {
    pub position: Vec3,
    pub yaw: f32,
    pub scale: f32,
}

impl Collectible {
    /// Animated transform for the host renderer
    pub fn pose(&self, time: f32) -> CollectiblePose {
        let bob = (time * BOB_RATE + self.animation_phase).sin() * BOB_HEIGHT;

        // Triangle wave in [-1, 1]
        let t = (time / PULSE_PERIOD).rem_euclid(1.0);
        let wave = if t < 0.5 { 4.0 * t - 1.0 } else { 3.0 - 4.0 * t };

        CollectiblePose {
            position: self.position + Vec3::Y * bob,
            yaw: (self.spin_speed * time).rem_euclid(360.0),
            scale: BASE_SCALE * (1.0 + PULSE_AMOUNT * wave),
        }
    }
}

/// A pickup that happened this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collected {
    /// Host entity to despawn
    pub id: u32,
    pub kind: StarKind,
}

/// Live collectibles of the current level
#[derive(Debug, Clone)]
pub struct CollectibleRegistry {
    items: Vec<Collectible>,
    pickup_radius: f32,
}

impl Default for CollectibleRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_PICKUP_RADIUS)
    }
}

impl CollectibleRegistry {
    pub fn new(pickup_radius: f32) -> Self {
        Self {
            items: Vec::new(),
            pickup_radius: pickup_radius.max(0.0),
        }
    }

    /// Drop every current collectible and take over a new set (level rebuild)
    pub fn replace(&mut self, collectibles: Vec<Collectible>) {
        self.items = collectibles;
    }

    pub fn pickup_radius(&self) -> f32 {
        self.pickup_radius
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collectible> {
        self.items.iter()
    }

    /// Collect everything strictly within the pickup radius of `player`.
    ///
    /// Collected entries are removed before returning, so a star is counted
    /// exactly once no matter how often this runs.
    pub fn check_pickups(&mut self, player: Vec3, stats: &mut ProgressionStats) -> Vec<Collected> {
        if !player.is_finite() {
            return Vec::new();
        }

        let radius = self.pickup_radius;
        let mut collected = Vec::new();
        self.items.retain(|item| {
            if item.position.distance(player) < radius {
                stats.stars.add(item.kind);
                collected.push(Collected {
                    id: item.id,
                    kind: item.kind,
                });
                false
            } else {
                true
            }
        });
        collected
    }
}
