//! Per-frame simulation step
//!
//! Host input and frame time in, character motion, statistics and pickups out.

use glam::Vec2;

use super::collectible::Collected;
use super::jump::JumpLaunch;
use super::probe::RayCaster;
use super::state::SessionState;

/// Input snapshot for a single tick (polled, not buffered)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Planar movement, x = right, y = forward; clamped to unit length
    pub movement: Vec2,
    /// Jump key held
    pub jump: bool,
}

impl TickInput {
    /// Build from WASD + space key states
    pub fn from_keys(forward: bool, left: bool, back: bool, right: bool, jump: bool) -> Self {
        let axis = |pos: bool, neg: bool| pos as i32 as f32 - neg as i32 as f32;
        Self {
            movement: Vec2::new(axis(right, left), axis(forward, back)),
            jump,
        }
    }
}

/// What a tick produced, for the host to present
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub moved: bool,
    pub jump: Option<JumpLaunch>,
    pub glitched: bool,
    /// Stars picked up this tick; despawn these ids
    pub collected: Vec<Collected>,
}

/// Advance the session by one frame of `dt` seconds.
///
/// Non-positive or non-finite `dt` leaves the session untouched.
pub fn tick<C: RayCaster + ?Sized>(
    state: &mut SessionState,
    caster: &C,
    input: &TickInput,
    dt: f32,
) -> TickReport {
    if !dt.is_finite() || dt <= 0.0 {
        return TickReport::default();
    }

    state.time_ticks += 1;
    state.stats.add_time(dt);

    let motion = state.controller.update(
        caster,
        input.movement,
        input.jump,
        dt,
        &mut state.stats,
        &mut state.rng,
    );

    let collected = state
        .collectibles
        .check_pickups(state.controller.position(), &mut state.stats);
    for pickup in &collected {
        log::debug!(
            "Collected {} star #{} ({} total)",
            pickup.kind.as_str(),
            pickup.id,
            state.stats.total_stars()
        );
    }

    TickReport {
        moved: motion.moved,
        jump: motion.launch,
        glitched: motion.glitched,
        collected,
    }
}
