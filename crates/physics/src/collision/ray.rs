//! Ray casting against tagged axis-aligned volumes

use crate::types::{Aabb, Vec3};

/// Classification of the surface a ray hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceTag {
    Wall,
    Box,
    Floor,
    Untagged,
}

/// Result of a successful ray cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance along the (normalized) ray direction
    pub distance: f32,
    pub tag: SurfaceTag,
}

/// Point-in-time ray intersection queries against the current scene.
///
/// Implementations report the nearest hit within `max_distance`. A ray whose
/// origin lies inside a volume does not report that volume, so probing from a
/// body's own center never hits the body itself.
pub trait RayCaster {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit>;
}

impl<F> RayCaster for F
where
    F: Fn(Vec3, Vec3, f32) -> Option<RayHit>,
{
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        self(origin, direction, max_distance)
    }
}

/// Entry distance of a ray into an AABB using the slab method.
///
/// `direction` must be normalized. Returns `None` when the ray misses, when
/// the box lies behind the origin, or when the origin is inside the box.
#[must_use]
pub fn ray_aabb(origin: Vec3, direction: Vec3, aabb: &Aabb) -> Option<f32> {
    if aabb.contains(origin) {
        return None;
    }

    let min = aabb.min().to_array();
    let max = aabb.max().to_array();
    let o = origin.to_array();
    let d = direction.to_array();

    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for axis in 0..3 {
        if d[axis].abs() < f32::EPSILON {
            // Parallel to this slab: must already be between the planes.
            if o[axis] < min[axis] || o[axis] > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d[axis];
        let mut t0 = (min[axis] - o[axis]) * inv;
        let mut t1 = (max[axis] - o[axis]) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }

    if t_far < 0.0 {
        return None;
    }
    Some(t_near.max(0.0))
}

/// Nearest hit among a set of tagged volumes.
pub fn cast_against<'a, I>(origin: Vec3, direction: Vec3, max_distance: f32, volumes: I) -> Option<RayHit>
where
    I: IntoIterator<Item = (&'a Aabb, SurfaceTag)>,
{
    let direction = direction.normalize();
    if direction == Vec3::ZERO {
        return None;
    }
    volumes
        .into_iter()
        .filter_map(|(aabb, tag)| {
            ray_aabb(origin, direction, aabb)
                .filter(|&t| t <= max_distance)
                .map(|distance| RayHit { distance, tag })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}
