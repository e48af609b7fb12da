//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay engine-free:
//! - Frame time comes from the host, nothing reads a clock
//! - Randomness only through `RngSource`
//! - Collision queries only through the `RayCaster` seam
//! - No rendering or platform dependencies

pub mod collectible;
pub mod controller;
pub mod jump;
pub mod level;
pub mod probe;
pub mod rng;
pub mod state;
pub mod stats;
pub mod tick;

pub use collectible::{Collectible, CollectiblePose, CollectibleRegistry, Collected};
pub use controller::{CharacterController, ControllerReport, MotionState, sanitize_input};
pub use jump::{JumpCombo, JumpLaunch, JumpPhase, JumpStateMachine, chain_multiplier};
pub use level::{
    BlockColor, BlockDescriptor, BlockStyle, Blueprint, CollectibleDescriptor, Level, LevelBlock,
    LevelGenerator, LevelLayout, seed_from_inputs,
};
pub use probe::{GroundProbe, GroundProbeResult, RayCaster, RayHit};
pub use rng::RngSource;
pub use state::SessionState;
pub use stats::{ProgressionStats, StarKind, StarTally};
pub use tick::{TickInput, TickReport, tick};
