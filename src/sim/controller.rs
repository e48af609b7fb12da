//! Third-person character controller
//!
//! One controller, parameterised by `ControllerConfig`. Each tick integrates
//! planar movement, gravity, chained jumps and ground contact, and feeds the
//! session's `ProgressionStats`.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::jump::{JumpLaunch, JumpStateMachine};
use super::probe::{GroundProbe, GroundProbeResult, RayCaster};
use super::rng::RngSource;
use super::stats::ProgressionStats;
use crate::settings::ControllerConfig;
use crate::{heading_degrees, wrap_degrees};

/// Inputs shorter than this count as no movement
const MIN_INPUT_LENGTH: f32 = 1e-6;

/// Kinematic state of the character
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    /// Body centre
    pub position: Vec3,
    pub vertical_velocity: f32,
    pub grounded: bool,
    /// Facing in degrees, 0 = +Z
    pub facing_yaw: f32,
}

impl MotionState {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            vertical_velocity: 0.0,
            grounded: false,
            facing_yaw: 0.0,
        }
    }
}

/// What happened during one controller update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerReport {
    /// Horizontal displacement applied this tick
    pub displacement: Vec3,
    pub moved: bool,
    pub launch: Option<JumpLaunch>,
    pub glitched: bool,
}

/// Clamp a planar input to the unit disk; invalid or tiny vectors become zero
pub fn sanitize_input(input: Vec2) -> Vec2 {
    if !input.is_finite() || input.length() < MIN_INPUT_LENGTH {
        return Vec2::ZERO;
    }
    input.clamp_length_max(1.0)
}

#[derive(Debug, Clone)]
pub struct CharacterController {
    config: ControllerConfig,
    motion: MotionState,
    jump: JumpStateMachine,
    probe: GroundProbe,
}

impl CharacterController {
    pub fn new(config: ControllerConfig, position: Vec3) -> Self {
        let jump = JumpStateMachine::new(config.commit_window, config.chain_cooldown);
        Self {
            config,
            motion: MotionState::at(position),
            jump,
            probe: GroundProbe::new(),
        }
    }

    /// Exclude host entities (e.g. the character's own collider) from probing
    pub fn with_probe(mut self, probe: GroundProbe) -> Self {
        self.probe = probe;
        self
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn motion(&self) -> &MotionState {
        &self.motion
    }

    pub fn motion_mut(&mut self) -> &mut MotionState {
        &mut self.motion
    }

    pub fn jump(&self) -> &JumpStateMachine {
        &self.jump
    }

    pub fn position(&self) -> Vec3 {
        self.motion.position
    }

    /// Height of the soles of the feet
    pub fn feet_height(&self) -> f32 {
        self.motion.position.y - self.config.half_height
    }

    /// Place the character on whatever is below its spawn point.
    ///
    /// Uses a long probe from well above the body. When nothing is found the
    /// character is put at the configured fallback height. Either way it
    /// starts grounded and at rest.
    pub fn spawn_snap<C: RayCaster + ?Sized>(&mut self, caster: &C) -> GroundProbeResult {
        let origin = self.motion.position + Vec3::Y * self.config.spawn_probe_lift;
        let result = self
            .probe
            .probe(caster, origin, self.config.spawn_probe_distance);

        if result.hit {
            self.motion.position.y = result.point.y + self.config.half_height;
        } else {
            log::warn!(
                "Spawn probe found no ground below {:?}, using fallback height",
                self.motion.position
            );
            self.motion.position.y = self.config.spawn_fallback_height;
        }
        self.motion.grounded = true;
        self.motion.vertical_velocity = 0.0;
        result
    }

    /// Advance the character by one tick
    pub fn update<C: RayCaster + ?Sized>(
        &mut self,
        caster: &C,
        input: Vec2,
        jump_requested: bool,
        dt: f32,
        stats: &mut ProgressionStats,
        rng: &mut RngSource,
    ) -> ControllerReport {
        let mut report = ControllerReport::default();
        if !dt.is_finite() || dt <= 0.0 {
            return report;
        }

        // Horizontal
        let input = sanitize_input(input);
        if input != Vec2::ZERO {
            let displacement = Vec3::new(input.x, 0.0, input.y) * self.config.speed * dt;
            self.motion.position += displacement;
            report.displacement = displacement;
            report.moved = true;
            stats.moves += 1;
            self.turn_toward(input, dt, rng);
        }

        // Vertical
        self.motion.vertical_velocity -= self.config.gravity * dt;

        if jump_requested {
            if let Some(launch) = self.jump.try_trigger(
                self.motion.grounded,
                self.config.jump_impulse,
                self.config.jump_jitter,
                rng,
            ) {
                self.motion.vertical_velocity = launch.impulse;
                stats.jumps += 1;
                log::debug!(
                    "Jump {} of chain (x{:.2}, impulse {:.2})",
                    launch.chain_position,
                    launch.multiplier,
                    launch.impulse
                );
                report.launch = Some(launch);
            }
        }

        self.motion.position.y += self.motion.vertical_velocity * dt;

        // Ground contact
        self.resolve_ground(caster);
        if !self.motion.grounded {
            report.glitched = self.glitch_fallback(stats, rng);
        }

        self.jump.advance(dt);
        report
    }

    /// Probe below the feet and snap onto the ground when descending
    pub fn resolve_ground<C: RayCaster + ?Sized>(&mut self, caster: &C) -> GroundProbeResult {
        let origin = Vec3::new(
            self.motion.position.x,
            self.feet_height() + self.config.probe_lift,
            self.motion.position.z,
        );
        let result = self.probe.probe(caster, origin, self.config.probe_distance);

        // A rising body passes through the probe range instead of being pulled back down
        if result.hit && self.motion.vertical_velocity <= 0.0 {
            self.motion.grounded = true;
            self.motion.position.y = result.point.y + self.config.half_height;
            self.motion.vertical_velocity = self.motion.vertical_velocity.max(0.0);
        } else {
            self.motion.grounded = false;
        }
        result
    }

    /// Occasionally drop a fast-falling character through the floor.
    ///
    /// Only airborne, uncommitted characters falling faster than the
    /// configured velocity are eligible; each eligible call rolls once.
    pub fn glitch_fallback(&mut self, stats: &mut ProgressionStats, rng: &mut RngSource) -> bool {
        let eligible = !self.motion.grounded
            && !self.jump.is_jumping()
            && self.motion.vertical_velocity < self.config.glitch_velocity
            && self.config.glitch_probability > 0.0;
        if !eligible || !rng.chance(self.config.glitch_probability) {
            return false;
        }

        self.motion.position.y -= self.config.glitch_drop;
        stats.glitches += 1;
        log::debug!("Glitch fallback at {:?}", self.motion.position);
        true
    }

    /// Ease the facing toward the movement heading
    fn turn_toward(&mut self, input: Vec2, dt: f32, rng: &mut RngSource) {
        let mut target = heading_degrees(input.x, input.y);
        if self.config.yaw_wobble > 0.0 {
            target += rng.uniform(-self.config.yaw_wobble, self.config.yaw_wobble);
        }

        let rate = self.config.yaw_turn_rate.max(0.0);
        let alpha = 1.0 - (-rate * dt).exp();
        let delta = wrap_degrees(target - self.motion.facing_yaw);
        self.motion.facing_yaw = wrap_degrees(self.motion.facing_yaw + delta * alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{BlockBox, BlockWorld};
    use crate::settings::ControllerPreset;
    use crate::sim::jump::JumpPhase;
    use crate::sim::probe::RayHit;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    /// Infinite floor at a fixed height
    struct Floor(f32);

    impl RayCaster for Floor {
        fn cast(&self, origin: Vec3, _dir: Vec3, max_distance: f32, _: &[u32]) -> RayHit {
            let distance = origin.y - self.0;
            if (0.0..=max_distance).contains(&distance) {
                RayHit::at(Vec3::new(origin.x, self.0, origin.z), distance)
            } else {
                RayHit::miss()
            }
        }
    }

    struct Void;

    impl RayCaster for Void {
        fn cast(&self, _: Vec3, _: Vec3, _: f32, _: &[u32]) -> RayHit {
            RayHit::miss()
        }
    }

    fn deterministic_config() -> ControllerConfig {
        ControllerConfig {
            jump_jitter: 0.0,
            yaw_wobble: 0.0,
            glitch_probability: 0.0,
            ..ControllerConfig::default()
        }
    }

    fn grounded_controller(config: ControllerConfig) -> CharacterController {
        let mut controller = CharacterController::new(config, Vec3::new(0.0, 3.0, 0.0));
        controller.spawn_snap(&Floor(0.0));
        controller
    }

    #[test]
    fn test_spawn_snap_lands_on_floor() {
        let controller = grounded_controller(ControllerConfig::default());
        assert!(controller.motion().grounded);
        assert!((controller.position().y - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_spawn_snap_fallback() {
        let mut controller = CharacterController::new(ControllerConfig::default(), Vec3::ZERO);
        let result = controller.spawn_snap(&Void);
        assert!(!result.hit);
        assert!(controller.motion().grounded);
        assert_eq!(controller.position().y, 1.0);
    }

    #[test]
    fn test_ground_contact_skips_ignored_entities() {
        // Box 1 stands for the character's own collider, box 2 is the floor below it
        let world = BlockWorld::new(vec![
            BlockBox::new(1, Vec3::ZERO, Vec3::ONE),
            BlockBox::new(2, Vec3::new(0.0, -10.0, 0.0), Vec3::ONE),
        ]);

        let mut plain = CharacterController::new(deterministic_config(), Vec3::new(0.0, 3.0, 0.0));
        plain.spawn_snap(&world);
        assert!((plain.position().y - (0.5 + 0.85)).abs() < 1e-5);

        let mut controller =
            CharacterController::new(deterministic_config(), Vec3::new(0.0, 3.0, 0.0))
                .with_probe(GroundProbe::ignoring(vec![1]));
        let result = controller.spawn_snap(&world);
        assert!(result.hit);
        assert!((result.point.y + 9.5).abs() < 1e-5);
        assert!((controller.position().y - (-9.5 + 0.85)).abs() < 1e-5);

        // Per-tick ground contact honours the same ignore list
        let mut stats = ProgressionStats::new();
        let mut rng = RngSource::new(1);
        for _ in 0..30 {
            controller.update(&world, Vec2::ZERO, false, DT, &mut stats, &mut rng);
        }
        assert!(controller.motion().grounded);
        assert!((controller.position().y - (-9.5 + 0.85)).abs() < 1e-5);
    }

    #[test]
    fn test_ground_snap() {
        let config = deterministic_config();
        let half = config.half_height;
        let mut controller = CharacterController::new(config, Vec3::new(0.0, 2.3 + half, 0.0));
        controller.motion_mut().vertical_velocity = -1.0;

        let mut stats = ProgressionStats::new();
        let mut rng = RngSource::new(1);
        controller.update(&Floor(2.0), Vec2::ZERO, false, DT, &mut stats, &mut rng);

        let motion = controller.motion();
        assert!(motion.grounded);
        assert_eq!(motion.position.y, 2.0 + half);
        assert!(motion.vertical_velocity >= 0.0);
    }

    #[test]
    fn test_standing_still_stays_put() {
        let mut controller = grounded_controller(deterministic_config());
        let mut stats = ProgressionStats::new();
        let mut rng = RngSource::new(1);
        for _ in 0..120 {
            controller.update(&Floor(0.0), Vec2::ZERO, false, DT, &mut stats, &mut rng);
        }
        assert!(controller.motion().grounded);
        assert!((controller.position().y - 0.85).abs() < 1e-6);
        assert_eq!(stats.moves, 0);
    }

    #[test]
    fn test_jump_leaves_ground_and_counts() {
        let mut controller = grounded_controller(ControllerPreset::Castle.config());
        let mut stats = ProgressionStats::new();
        let mut rng = RngSource::new(1);

        let report = controller.update(&Floor(0.0), Vec2::ZERO, true, DT, &mut stats, &mut rng);
        let launch = report.launch.unwrap();
        assert_eq!(launch.multiplier, 1.0);
        assert_eq!(stats.jumps, 1);
        assert!(!controller.motion().grounded);
        assert!(controller.position().y > 0.5);
        assert_eq!(controller.jump().phase(), JumpPhase::Airborne);
        assert_eq!(controller.jump().combo().chain_count, 1);

        // Holding jump while airborne does nothing
        let report = controller.update(&Floor(0.0), Vec2::ZERO, true, DT, &mut stats, &mut rng);
        assert!(report.launch.is_none());
        assert_eq!(stats.jumps, 1);
    }

    #[test]
    fn test_jump_lands_again() {
        let mut controller = grounded_controller(ControllerPreset::Castle.config());
        let mut stats = ProgressionStats::new();
        let mut rng = RngSource::new(1);

        controller.update(&Floor(0.0), Vec2::ZERO, true, DT, &mut stats, &mut rng);
        let mut landed = false;
        for _ in 0..240 {
            controller.update(&Floor(0.0), Vec2::ZERO, false, DT, &mut stats, &mut rng);
            if controller.motion().grounded {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert_eq!(controller.position().y, 0.5);
    }

    #[test]
    fn test_moves_counted_and_yaw_eases() {
        let mut controller = grounded_controller(deterministic_config());
        let mut stats = ProgressionStats::new();
        let mut rng = RngSource::new(1);

        // Right is 90°
        controller.update(&Floor(0.0), Vec2::X, false, DT, &mut stats, &mut rng);
        let yaw = controller.motion().facing_yaw;
        assert_eq!(stats.moves, 1);
        assert!(yaw > 0.0 && yaw < 90.0, "yaw snapped: {yaw}");

        for _ in 0..300 {
            controller.update(&Floor(0.0), Vec2::X, false, DT, &mut stats, &mut rng);
        }
        assert!((controller.motion().facing_yaw - 90.0).abs() < 0.5);

        // Zero input holds yaw
        let before = controller.motion().facing_yaw;
        controller.update(&Floor(0.0), Vec2::ZERO, false, DT, &mut stats, &mut rng);
        assert_eq!(controller.motion().facing_yaw, before);
        assert_eq!(stats.moves, 301);
    }

    #[test]
    fn test_yaw_takes_short_way_round() {
        let mut controller = grounded_controller(deterministic_config());
        controller.motion_mut().facing_yaw = 170.0;
        let mut stats = ProgressionStats::new();
        let mut rng = RngSource::new(1);
        // Heading -170°: 20° away across the wrap
        let input = Vec2::new(-(10f32.to_radians().sin()), -(10f32.to_radians().cos()));
        controller.update(&Floor(0.0), input, false, DT, &mut stats, &mut rng);
        let yaw = controller.motion().facing_yaw;
        assert!(yaw > 170.0 || yaw < -170.0, "went the long way: {yaw}");
    }

    #[test]
    fn test_invalid_dt_has_no_effect() {
        let mut controller = grounded_controller(deterministic_config());
        let before = *controller.motion();
        let mut stats = ProgressionStats::new();
        let mut rng = RngSource::new(1);
        for dt in [0.0, -0.5, f32::NAN, f32::INFINITY] {
            let report = controller.update(&Floor(0.0), Vec2::X, true, dt, &mut stats, &mut rng);
            assert_eq!(report, ControllerReport::default());
        }
        assert_eq!(*controller.motion(), before);
        assert_eq!(stats, ProgressionStats::new());
    }

    #[test]
    fn test_sanitize_input() {
        assert_eq!(sanitize_input(Vec2::ZERO), Vec2::ZERO);
        assert_eq!(sanitize_input(Vec2::new(f32::NAN, 1.0)), Vec2::ZERO);
        let diagonal = sanitize_input(Vec2::new(1.0, 1.0));
        assert!((diagonal.length() - 1.0).abs() < 1e-6);
        assert_eq!(sanitize_input(Vec2::new(0.3, 0.4)), Vec2::new(0.3, 0.4));
    }

    #[test]
    fn test_glitch_rate_is_about_one_percent() {
        let mut controller = CharacterController::new(ControllerConfig::default(), Vec3::ZERO);
        let mut stats = ProgressionStats::new();
        let mut rng = RngSource::new(2024);
        let ticks = 100_000;

        for _ in 0..ticks {
            let motion = controller.motion_mut();
            motion.grounded = false;
            motion.vertical_velocity = -10.0;
            controller.glitch_fallback(&mut stats, &mut rng);
        }

        let rate = stats.glitches as f64 / ticks as f64;
        // ~5 standard deviations of a binomial(100k, 0.01)
        assert!((rate - 0.01).abs() < 0.0016, "glitch rate {rate}");
    }

    #[test]
    fn test_glitch_requires_fast_uncommitted_fall() {
        let config = ControllerConfig {
            glitch_probability: 1.0,
            ..ControllerConfig::default()
        };
        let mut controller = CharacterController::new(config, Vec3::ZERO);
        let mut stats = ProgressionStats::new();
        let mut rng = RngSource::new(3);

        controller.motion_mut().vertical_velocity = -4.0;
        assert!(!controller.glitch_fallback(&mut stats, &mut rng));

        controller.motion_mut().vertical_velocity = -6.0;
        controller.motion_mut().grounded = true;
        assert!(!controller.glitch_fallback(&mut stats, &mut rng));

        controller.motion_mut().grounded = false;
        assert!(controller.glitch_fallback(&mut stats, &mut rng));
        assert_eq!(controller.position().y, -0.5);
        assert_eq!(stats.glitches, 1);
    }

    #[test]
    fn test_free_fall_glitches_in_void() {
        let config = ControllerConfig {
            gravity: 20.0,
            ..ControllerConfig::default()
        };
        let mut controller = CharacterController::new(config, Vec3::ZERO);
        let mut stats = ProgressionStats::new();
        let mut rng = RngSource::new(9);
        for _ in 0..3000 {
            controller.update(&Void, Vec2::ZERO, false, DT, &mut stats, &mut rng);
        }
        assert!(stats.glitches > 0);
        assert!(!controller.motion().grounded);
    }

    proptest! {
        #[test]
        fn displacement_matches_input_magnitude(
            angle in 0.0f32..std::f32::consts::TAU,
            magnitude in 0.0f32..=1.0,
            dt in 0.001f32..0.1,
        ) {
            let mut controller = grounded_controller(deterministic_config());
            let mut stats = ProgressionStats::new();
            let mut rng = RngSource::new(5);
            let input = Vec2::new(angle.cos(), angle.sin()) * magnitude;

            let report = controller.update(&Floor(0.0), input, false, dt, &mut stats, &mut rng);
            let speed = controller.config().speed;
            let expected = if input.length() < MIN_INPUT_LENGTH {
                0.0
            } else {
                speed * dt * input.length().min(1.0)
            };
            prop_assert!((report.displacement.length() - expected).abs() < 1e-4);
            prop_assert!(report.displacement.length() <= speed * dt + 1e-4);
        }

        #[test]
        fn diagonal_input_gets_no_speed_boost(x in -5.0f32..5.0, y in -5.0f32..5.0, dt in 0.001f32..0.1) {
            let mut controller = grounded_controller(deterministic_config());
            let mut stats = ProgressionStats::new();
            let mut rng = RngSource::new(5);

            let report = controller.update(&Floor(0.0), Vec2::new(x, y), false, dt, &mut stats, &mut rng);
            prop_assert!(report.displacement.length() <= controller.config().speed * dt + 1e-4);
        }
    }
}
