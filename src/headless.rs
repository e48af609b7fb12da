//! Headless host world
//!
//! Axis-aligned boxes built from a generated level, with a slab-test ray cast.
//! Stands in for the engine's collision scene when the simulation runs without
//! a renderer (the bundled binary, tests). Also hosts the
//! autopilot that plays in place of a keyboard.

use glam::{Vec2, Vec3};

use crate::sim::level::Level;
use crate::sim::probe::{RayCaster, RayHit};
use crate::sim::state::SessionState;
use crate::sim::tick::TickInput;

/// Stars higher than this above the character's centre trigger a jump
const AUTOPILOT_JUMP_HEIGHT: f32 = 1.0;
/// Horizontal range inside which the autopilot jumps for a star
const AUTOPILOT_JUMP_RANGE: f32 = 3.0;

/// Solid box of one level block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockBox {
    pub id: u32,
    pub min: Vec3,
    pub max: Vec3,
}

impl BlockBox {
    pub fn new(id: u32, center: Vec3, size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Self {
            id,
            min: center - half,
            max: center + half,
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Entry distance of a ray into this box, if it enters within `max_distance`.
    ///
    /// Rays that start inside the box do not hit it.
    pub fn ray_entry(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() < f32::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (t0, t1) = {
                let a = (lo - o) * inv;
                let b = (hi - o) * inv;
                if a < b { (a, b) } else { (b, a) }
            };
            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }

        if t_enter < 0.0 || t_enter > max_distance {
            return None;
        }
        Some(t_enter)
    }
}

/// Collision scene for a level
#[derive(Debug, Clone, Default)]
pub struct BlockWorld {
    boxes: Vec<BlockBox>,
}

impl BlockWorld {
    pub fn new(boxes: Vec<BlockBox>) -> Self {
        Self { boxes }
    }

    /// One box per block, at its jittered position and scale
    pub fn from_level(level: &Level) -> Self {
        let boxes = level
            .blocks
            .iter()
            .map(|block| BlockBox::new(block.id, block.world_position(), block.scale))
            .collect();
        Self { boxes }
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

impl RayCaster for BlockWorld {
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32, ignore: &[u32]) -> RayHit {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO || !(max_distance > 0.0) {
            return RayHit::miss();
        }

        self.boxes
            .iter()
            .filter(|b| !ignore.contains(&b.id))
            .filter_map(|b| b.ray_entry(origin, direction, max_distance))
            .min_by(|a, b| a.total_cmp(b))
            .map(|t| RayHit::at(origin + direction * t, t))
            .unwrap_or_else(RayHit::miss)
    }
}

/// Input that walks toward the nearest star, jumping for ones overhead.
///
/// Holds still when the level has no stars left.
pub fn autopilot_input(state: &SessionState) -> TickInput {
    let position = state.controller.position();
    let nearest = state.collectibles.iter().min_by(|a, b| {
        a.position
            .distance_squared(position)
            .total_cmp(&b.position.distance_squared(position))
    });

    let Some(target) = nearest else {
        return TickInput::default();
    };

    let to_target = target.position - position;
    let planar = Vec2::new(to_target.x, to_target.z);
    TickInput {
        movement: planar.normalize_or_zero(),
        jump: to_target.y > AUTOPILOT_JUMP_HEIGHT && planar.length() < AUTOPILOT_JUMP_RANGE,
    }
}
