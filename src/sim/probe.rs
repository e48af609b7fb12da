//! Ground contact probe
//!
//! The core never owns collision geometry. It asks the host to cast a ray
//! through the `RayCaster` trait and interprets the answer as ground contact.

use glam::Vec3;

/// Result of a host ray cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub hit: bool,
    /// World-space contact point (meaningless on a miss)
    pub point: Vec3,
    /// Distance along the ray to the contact point
    pub distance: f32,
}

impl RayHit {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec3::ZERO,
            distance: 0.0,
        }
    }

    pub fn at(point: Vec3, distance: f32) -> Self {
        Self {
            hit: true,
            point,
            distance,
        }
    }
}

/// Ray-intersection primitive supplied by the host engine
pub trait RayCaster {
    /// Cast from `origin` along `direction` (unit length) for at most
    /// `max_distance`, skipping the entities listed in `ignore`.
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32, ignore: &[u32]) -> RayHit;
}

impl<T: RayCaster + ?Sized> RayCaster for &T {
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32, ignore: &[u32]) -> RayHit {
        (**self).cast(origin, direction, max_distance, ignore)
    }
}

/// Ground contact for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundProbeResult {
    pub hit: bool,
    pub point: Vec3,
}

impl GroundProbeResult {
    pub fn airborne() -> Self {
        Self {
            hit: false,
            point: Vec3::ZERO,
        }
    }
}

/// Downward ray probe
#[derive(Debug, Clone, Default)]
pub struct GroundProbe {
    /// Host entity ids the probe must not hit (usually the character itself)
    pub ignore: Vec<u32>,
}

impl GroundProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignoring(ignore: Vec<u32>) -> Self {
        Self { ignore }
    }

    /// Cast straight down from `origin` for at most `max_distance`
    pub fn probe<C: RayCaster + ?Sized>(
        &self,
        caster: &C,
        origin: Vec3,
        max_distance: f32,
    ) -> GroundProbeResult {
        if !origin.is_finite() || !max_distance.is_finite() || max_distance <= 0.0 {
            return GroundProbeResult::airborne();
        }

        let ray = caster.cast(origin, Vec3::NEG_Y, max_distance, &self.ignore);
        if ray.hit && ray.distance <= max_distance {
            GroundProbeResult {
                hit: true,
                point: ray.point,
            }
        } else {
            GroundProbeResult::airborne()
        }
    }
}
