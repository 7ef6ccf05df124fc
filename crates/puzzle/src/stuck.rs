//! Stuck-box detection.

use physics::{RayCaster, SurfaceTag, Vec3};

/// Decides whether a box is wedged in all four ground-plane directions.
///
/// Holds no state between calls; every query goes straight to the ray caster.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StuckDetector {
    probe_length: f32,
}

impl StuckDetector {
    /// Forward, back, left, right.
    pub const PROBES: [Vec3; 4] = [Vec3::FORWARD, Vec3::BACK, Vec3::LEFT, Vec3::RIGHT];

    #[must_use]
    pub const fn new(probe_length: f32) -> Self {
        Self { probe_length }
    }

    /// A box is stuck only when every probe hits something that is not floor.
    /// Open space or floor in any direction means it can still be moved.
    #[must_use]
    pub fn is_stuck<R: RayCaster + ?Sized>(&self, position: Vec3, caster: &R) -> bool {
        for dir in Self::PROBES {
            match caster.cast_ray(position, dir, self.probe_length) {
                None => return false,
                Some(hit) if hit.tag == SurfaceTag::Floor => return false,
                // Wall, Box and untagged hits block this direction
                Some(_) => continue,
            }
        }
        true
    }
}

impl Default for StuckDetector {
    fn default() -> Self {
        Self::new(1.0)
    }
}
