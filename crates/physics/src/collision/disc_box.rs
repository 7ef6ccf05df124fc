//! Planar overlap between the agent disc and axis-aligned boxes

use crate::types::{Aabb, Vec3};

/// Planar penetration of a disc into a box, as the (x, z) push vector that
/// would move the box out of the disc. `None` when they do not touch.
#[must_use]
pub fn detect_disc_box_overlap(center: Vec3, radius: f32, aabb: &Aabb) -> Option<Vec3> {
    // Closest point on the box footprint to the disc center
    let cx = center.x.clamp(aabb.center.x - aabb.half_extents.x, aabb.center.x + aabb.half_extents.x);
    let cz = center.z.clamp(aabb.center.z - aabb.half_extents.z, aabb.center.z + aabb.half_extents.z);
    let dx = cx - center.x;
    let dz = cz - center.z;
    let dist_sq = dx * dx + dz * dz;

    if dist_sq >= radius * radius {
        return None;
    }

    let dist = dist_sq.sqrt();
    if dist > f32::EPSILON {
        let depth = radius - dist;
        return Some(Vec3::new(dx / dist * depth, 0.0, dz / dist * depth));
    }

    // Disc center inside the footprint: push out along the shallowest axis.
    let to_x = aabb.center.x - center.x;
    let to_z = aabb.center.z - center.z;
    let pen_x = aabb.half_extents.x + radius - to_x.abs();
    let pen_z = aabb.half_extents.z + radius - to_z.abs();
    if pen_x < pen_z {
        Some(Vec3::new(pen_x.copysign(to_x), 0.0, 0.0))
    } else {
        Some(Vec3::new(0.0, 0.0, pen_z.copysign(to_z)))
    }
}
