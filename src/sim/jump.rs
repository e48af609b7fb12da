//! Chained jump state machine
//!
//! Up to three jumps in a row, each stronger than the last. The third jump
//! resets the chain and starts a cooldown. A jump "commits" the character for
//! a short window regardless of when it actually lands.

use serde::{Deserialize, Serialize};

use super::rng::RngSource;
use crate::consts::{CHAIN_STEP, CHAIN_STEP_CAP, MAX_CHAIN};

/// Reference commit window (seconds)
pub const DEFAULT_COMMIT_WINDOW: f32 = 0.35;
/// Reference cooldown after a full chain (seconds)
pub const DEFAULT_CHAIN_COOLDOWN: f32 = 0.7;

/// Observable phase of the jump machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpPhase {
    /// Ready for a jump when grounded
    Idle,
    /// Inside the commit window of the last jump
    Airborne,
    /// Full chain completed, new chains blocked
    CooldownActive,
}

/// Jump chain bookkeeping
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JumpCombo {
    /// Jumps in the current chain, always in [0, 3)
    pub chain_count: u8,
    pub cooldown_remaining: f32,
    pub jumping: bool,
    /// Time left before `jumping` clears
    pub commit_remaining: f32,
}

/// A triggered jump
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpLaunch {
    /// Position of this jump in its chain (1..=3)
    pub chain_position: u8,
    pub multiplier: f32,
    /// Vertical velocity to apply
    pub impulse: f32,
}

/// Impulse multiplier for the n-th jump of a chain (1-based)
pub fn chain_multiplier(chain_position: u8) -> f32 {
    let steps = chain_position.saturating_sub(1).min(CHAIN_STEP_CAP);
    1.0 + CHAIN_STEP * steps as f32
}

#[derive(Debug, Clone)]
pub struct JumpStateMachine {
    combo: JumpCombo,
    commit_window: f32,
    cooldown: f32,
}

impl Default for JumpStateMachine {
    fn default() -> Self {
        Self::new(DEFAULT_COMMIT_WINDOW, DEFAULT_CHAIN_COOLDOWN)
    }
}

impl JumpStateMachine {
    pub fn new(commit_window: f32, cooldown: f32) -> Self {
        Self {
            combo: JumpCombo::default(),
            commit_window: commit_window.max(0.0),
            cooldown: cooldown.max(0.0),
        }
    }

    pub fn combo(&self) -> &JumpCombo {
        &self.combo
    }

    pub fn is_jumping(&self) -> bool {
        self.combo.jumping
    }

    pub fn phase(&self) -> JumpPhase {
        if self.combo.cooldown_remaining > 0.0 {
            JumpPhase::CooldownActive
        } else if self.combo.jumping {
            JumpPhase::Airborne
        } else {
            JumpPhase::Idle
        }
    }

    /// Whether a jump would be accepted right now
    pub fn can_trigger(&self, grounded: bool) -> bool {
        grounded && !self.combo.jumping && self.combo.cooldown_remaining <= 0.0
    }

    /// Attempt a jump.
    ///
    /// `jitter` adds a uniform random offset in `[-jitter, jitter]` to the
    /// impulse; a zero jitter draws nothing from `rng`.
    pub fn try_trigger(
        &mut self,
        grounded: bool,
        base_impulse: f32,
        jitter: f32,
        rng: &mut RngSource,
    ) -> Option<JumpLaunch> {
        if !self.can_trigger(grounded) {
            return None;
        }

        self.combo.chain_count += 1;
        let chain_position = self.combo.chain_count;
        let multiplier = chain_multiplier(chain_position);

        let mut impulse = base_impulse * multiplier;
        if jitter > 0.0 {
            impulse += rng.uniform(-jitter, jitter);
        }

        if self.combo.chain_count >= MAX_CHAIN {
            self.combo.chain_count = 0;
            self.combo.cooldown_remaining = self.cooldown;
        }

        self.combo.jumping = true;
        self.combo.commit_remaining = self.commit_window;

        Some(JumpLaunch {
            chain_position,
            multiplier,
            impulse,
        })
    }

    /// Count down the cooldown and commit timers
    pub fn advance(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }

        if self.combo.cooldown_remaining > 0.0 {
            self.combo.cooldown_remaining = (self.combo.cooldown_remaining - dt).max(0.0);
        }

        if self.combo.jumping {
            self.combo.commit_remaining = (self.combo.commit_remaining - dt).max(0.0);
            if self.combo.commit_remaining <= 0.0 {
                self.combo.jumping = false;
            }
        }
    }
}
