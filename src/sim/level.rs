//! Level generation
//!
//! A layout first produces a `Blueprint`, a declarative list of block and
//! star descriptors. One generic `assemble` pass then turns the blueprint into
//! a `Level`, giving every glitch-styled block its shade and a small chance of
//! being knocked out of place.
//!
//! Builds are deterministic: the RNG is seeded once per build from the
//! player's statistics and a wall-clock value, and every draw happens in a
//! fixed order.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collectible::Collectible;
use super::rng::RngSource;
use super::stats::{ProgressionStats, StarKind};
use crate::settings::GeneratorConfig;

/// Which descriptor list a build uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LevelLayout {
    /// Stat-driven block field with towers and scattered stars
    #[default]
    Procedural,
    /// Fixed castle courtyard
    Castle,
}

impl LevelLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelLayout::Procedural => "Procedural",
            LevelLayout::Castle => "Castle",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "procedural" | "proc" => Some(LevelLayout::Procedural),
            "castle" => Some(LevelLayout::Castle),
            _ => None,
        }
    }

    /// Where the character should be spawned (before the spawn snap)
    pub fn spawn_point(&self) -> Vec3 {
        match self {
            LevelLayout::Procedural => Vec3::new(0.0, 3.0, 0.0),
            LevelLayout::Castle => Vec3::new(0.0, 5.0, -5.0),
        }
    }
}

/// HSV colour (hue in degrees, saturation/value in [0, 1])
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockColor {
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
}

impl BlockColor {
    pub const fn hsv(hue: f32, saturation: f32, value: f32) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }
}

/// How a block gets its colour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BlockStyle {
    /// Shared hue with a randomised value; may be jittered out of place
    Glitched { hue: f32 },
    /// Fixed colour, never jittered
    Solid(BlockColor),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockDescriptor {
    pub position: Vec3,
    pub scale: Vec3,
    pub style: BlockStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollectibleDescriptor {
    pub position: Vec3,
    pub kind: StarKind,
    pub animation_phase: f32,
    pub spin_speed: f32,
}

/// Declarative level content, before per-block jitter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub blocks: Vec<BlockDescriptor>,
    pub collectibles: Vec<CollectibleDescriptor>,
    /// Number of platform towers laid out
    pub towers: usize,
}

/// A placed block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelBlock {
    pub id: u32,
    /// Grid position before jitter
    pub position: Vec3,
    pub color: BlockColor,
    pub scale: Vec3,
    /// Glitch nudge, zero for most blocks
    pub jitter_offset: Vec3,
}

impl LevelBlock {
    /// Where the host should actually draw and collide the block
    pub fn world_position(&self) -> Vec3 {
        self.position + self.jitter_offset
    }

    pub fn is_jittered(&self) -> bool {
        self.jitter_offset != Vec3::ZERO
    }
}

/// Output of one build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub seed: u64,
    pub layout: LevelLayout,
    pub blocks: Vec<LevelBlock>,
    pub collectibles: Vec<Collectible>,
    pub towers: usize,
}

/// Seed for a build, a pure function of the stats and the wall-clock value
pub fn seed_from_inputs(stats: &ProgressionStats, wall_clock_seed: f64) -> u64 {
    let base = if wall_clock_seed.is_finite() {
        wall_clock_seed
    } else {
        0.0
    };
    let combined = base + stats.moves as f64 + stats.jumps as f64 + stats.glitches as f64;
    combined.to_bits()
}

#[derive(Debug, Clone, Default)]
pub struct LevelGenerator {
    config: GeneratorConfig,
}

impl LevelGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Build the procedural level
    pub fn build(&self, stats: &ProgressionStats, wall_clock_seed: f64) -> Level {
        self.build_layout(LevelLayout::Procedural, stats, wall_clock_seed)
    }

    /// Build any layout with a single seeded RNG pass
    pub fn build_layout(
        &self,
        layout: LevelLayout,
        stats: &ProgressionStats,
        wall_clock_seed: f64,
    ) -> Level {
        let seed = seed_from_inputs(stats, wall_clock_seed);
        let mut rng = RngSource::new(seed);

        let blueprint = self.blueprint(layout, stats, &mut rng);
        let level = self.assemble(layout, blueprint, &mut rng);

        log::info!(
            "Built {} level: {} blocks, {} towers, {} stars (seed {:#018x})",
            layout.as_str(),
            level.blocks.len(),
            level.towers,
            level.collectibles.len(),
            seed
        );
        level
    }

    /// Lay out the descriptors of a layout
    pub fn blueprint(
        &self,
        layout: LevelLayout,
        stats: &ProgressionStats,
        rng: &mut RngSource,
    ) -> Blueprint {
        match layout {
            LevelLayout::Procedural => self.procedural_blueprint(stats, rng),
            LevelLayout::Castle => castle_blueprint(),
        }
    }

    /// Number of towers for the given play time
    pub fn tower_count(&self, stats: &ProgressionStats) -> usize {
        let cfg = &self.config;
        let time = if stats.time_spent.is_finite() {
            stats.time_spent.max(0.0)
        } else {
            0.0
        };
        let cycle = (time * cfg.towers_per_second).floor() as u64;
        let offset = if cfg.tower_count_modulus == 0 {
            0
        } else {
            cycle % cfg.tower_count_modulus as u64
        };
        (cfg.tower_base_count as u64 + offset) as usize
    }

    /// Tallest tower the RNG may produce
    pub fn max_tower_height(&self, stats: &ProgressionStats) -> i32 {
        let cfg = &self.config;
        let extra = stats
            .jumps
            .checked_div(cfg.jumps_per_tower_level)
            .unwrap_or(0);
        cfg.tower_base_height
            .saturating_add(i32::try_from(extra).unwrap_or(i32::MAX))
            .max(1)
    }

    /// Highest star grid height the RNG may produce
    pub fn max_star_height(&self, stats: &ProgressionStats) -> i32 {
        let cfg = &self.config;
        let extra = stats
            .stars
            .yellow
            .checked_div(cfg.yellow_per_star_level)
            .unwrap_or(0);
        cfg.star_base_height
            .saturating_add(i32::try_from(extra).unwrap_or(i32::MAX))
            .max(1)
    }

    fn procedural_blueprint(&self, stats: &ProgressionStats, rng: &mut RngSource) -> Blueprint {
        let cfg = &self.config;
        let style = BlockStyle::Glitched {
            hue: ((stats.moves.wrapping_add(stats.jumps)) % 360) as f32,
        };
        let mut blueprint = Blueprint::default();

        // 1. Ground grid
        let g = cfg.ground_half_extent.max(0);
        for z in -g..=g {
            for x in -g..=g {
                blueprint.blocks.push(BlockDescriptor {
                    position: Vec3::new(x as f32, 0.0, z as f32),
                    scale: Vec3::ONE,
                    style,
                });
            }
        }

        // 2. Towers
        let p = cfg.placement_half_extent.max(0);
        let towers = self.tower_count(stats);
        let max_height = self.max_tower_height(stats);
        let hj = cfg.tower_horizontal_jitter;
        let vj = cfg.tower_vertical_jitter;
        for _ in 0..towers {
            let x = rng.int_inclusive(-p, p) as f32;
            let z = rng.int_inclusive(-p, p) as f32;
            let height = rng.int_inclusive(1, max_height);
            for y in 1..=height {
                let position = Vec3::new(
                    x + rng.uniform(-hj, hj),
                    y as f32 + rng.uniform(-vj, vj),
                    z + rng.uniform(-hj, hj),
                );
                blueprint.blocks.push(BlockDescriptor {
                    position,
                    scale: Vec3::ONE,
                    style,
                });
            }
        }
        blueprint.towers = towers;

        // 3. Stars
        let max_star = self.max_star_height(stats);
        let sj = cfg.star_jitter;
        let counts = [
            (StarKind::Yellow, cfg.yellow_stars),
            (StarKind::Red, cfg.red_stars),
            (StarKind::Green, cfg.green_stars),
        ];
        for (kind, count) in counts {
            for _ in 0..count {
                let x = rng.int_inclusive(-p, p) as f32;
                let z = rng.int_inclusive(-p, p) as f32;
                let y = rng.int_inclusive(1, max_star) as f32;
                let position = Vec3::new(
                    x + rng.uniform(-sj, sj),
                    y + rng.uniform(-sj, sj),
                    z + rng.uniform(-sj, sj),
                );
                blueprint.collectibles.push(CollectibleDescriptor {
                    position,
                    kind,
                    animation_phase: rng.unit(),
                    spin_speed: rng.uniform(cfg.star_min_spin, cfg.star_max_spin),
                });
            }
        }

        blueprint
    }

    /// Turn descriptors into placed blocks and stars.
    ///
    /// Glitch-styled blocks draw their value jitter and then their displacement
    /// roll, in blueprint order.
    pub fn assemble(&self, layout: LevelLayout, blueprint: Blueprint, rng: &mut RngSource) -> Level {
        let cfg = &self.config;
        let mut next_id = 1u32;
        let mut take_id = || {
            let id = next_id;
            next_id += 1;
            id
        };

        let mut blocks = Vec::with_capacity(blueprint.blocks.len());
        for desc in &blueprint.blocks {
            let mut scale = desc.scale;
            let mut jitter_offset = Vec3::ZERO;
            let color = match desc.style {
                BlockStyle::Solid(color) => color,
                BlockStyle::Glitched { hue } => {
                    let value = cfg.block_value
                        + rng.uniform(-cfg.block_value_jitter, cfg.block_value_jitter);
                    if rng.chance(cfg.block_jitter_probability) {
                        let o = cfg.block_jitter_offset;
                        jitter_offset = Vec3::new(
                            rng.uniform(-o, o),
                            rng.uniform(-o, o),
                            rng.uniform(-o, o),
                        );
                        scale += Vec3::splat(
                            rng.uniform(-cfg.block_jitter_scale, cfg.block_jitter_scale),
                        );
                    }
                    BlockColor::hsv(hue, cfg.block_saturation, value.clamp(0.0, 1.0))
                }
            };
            blocks.push(LevelBlock {
                id: take_id(),
                position: desc.position,
                color,
                scale,
                jitter_offset,
            });
        }

        let collectibles = blueprint
            .collectibles
            .iter()
            .map(|desc| Collectible {
                id: take_id(),
                position: desc.position,
                kind: desc.kind,
                animation_phase: desc.animation_phase,
                spin_speed: desc.spin_speed,
            })
            .collect();

        Level {
            seed: rng.seed(),
            layout,
            blocks,
            collectibles,
            towers: blueprint.towers,
        }
    }
}

/// Where the castle's floating star block sits
const CASTLE_STAR_BLOCK: Vec3 = Vec3::new(0.0, 2.0, 6.0);

/// Fixed castle courtyard: lawn, walls, corner towers, door, a floating star
/// block and a collectible star hovering over it
fn castle_blueprint() -> Blueprint {
    const LAWN: BlockColor = BlockColor::hsv(120.0, 0.8, 0.55);
    const LIGHT_STONE: BlockColor = BlockColor::hsv(0.0, 0.0, 0.75);
    const STONE: BlockColor = BlockColor::hsv(0.0, 0.0, 0.5);
    const DOOR: BlockColor = BlockColor::hsv(30.0, 0.6, 0.4);
    const STAR_GOLD: BlockColor = BlockColor::hsv(60.0, 1.0, 1.0);

    let solid = |position: Vec3, scale: Vec3, color: BlockColor| BlockDescriptor {
        position,
        scale,
        style: BlockStyle::Solid(color),
    };

    let mut blocks = vec![solid(Vec3::new(0.0, -0.5, 0.0), Vec3::new(30.0, 1.0, 30.0), LAWN)];

    // Front wall
    for x in -4..=4 {
        for y in 0..=4 {
            blocks.push(solid(Vec3::new(x as f32, y as f32, 5.0), Vec3::ONE, LIGHT_STONE));
        }
    }

    // Side walls
    for z in 4..=8 {
        for y in 0..=4 {
            blocks.push(solid(Vec3::new(-4.0, y as f32, z as f32), Vec3::ONE, STONE));
            blocks.push(solid(Vec3::new(4.0, y as f32, z as f32), Vec3::ONE, STONE));
        }
    }

    // Corner towers
    for x in [-4.0, 4.0] {
        for y in 5..=7 {
            blocks.push(solid(Vec3::new(x, y as f32, 8.0), Vec3::ONE, STONE));
        }
    }

    blocks.push(solid(Vec3::new(0.0, 0.0, 4.0), Vec3::new(2.0, 2.0, 0.2), DOOR));
    blocks.push(solid(CASTLE_STAR_BLOCK, Vec3::splat(0.7), STAR_GOLD));

    Blueprint {
        blocks,
        collectibles: vec![CollectibleDescriptor {
            position: CASTLE_STAR_BLOCK + Vec3::Y,
            kind: StarKind::Yellow,
            animation_phase: 0.0,
            spin_speed: 60.0,
        }],
        towers: 2,
    }
}
