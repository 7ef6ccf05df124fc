//! # World Builder
//!
//! Builder functions for adding boxes and scenery to a [`KinematicWorld`].

use crate::collision::SurfaceTag;
use crate::error::PhysicsError;
use crate::types::{Aabb, Vec3};
use crate::world::{BoxBody, KinematicWorld, Obstacle};

fn check_extents(half_extents: Vec3) -> Result<(), PhysicsError> {
    if half_extents.x > 0.0 && half_extents.y > 0.0 && half_extents.z > 0.0 {
        Ok(())
    } else {
        Err(PhysicsError::InvalidExtents(half_extents.to_array()))
    }
}

impl KinematicWorld {
    /// Add a pushable box at rest and return its index.
    ///
    /// # Errors
    ///
    /// Returns an error if any half extent is not positive.
    pub fn add_box(&mut self, pos: Vec3, half_extents: Vec3) -> Result<usize, PhysicsError> {
        check_extents(half_extents)?;
        self.boxes.push(BoxBody { pos, vel: Vec3::ZERO, half_extents, active: true });
        Ok(self.boxes.len() - 1)
    }

    /// Add a tagged static volume and return its index.
    ///
    /// # Errors
    ///
    /// Returns an error if any half extent is not positive.
    pub fn add_obstacle(&mut self, aabb: Aabb, tag: SurfaceTag) -> Result<usize, PhysicsError> {
        check_extents(aabb.half_extents)?;
        self.obstacles.push(Obstacle { aabb, tag });
        Ok(self.obstacles.len() - 1)
    }

    /// Add a wall-tagged static volume.
    ///
    /// # Errors
    ///
    /// Returns an error if any half extent is not positive.
    pub fn add_wall(&mut self, center: Vec3, half_extents: Vec3) -> Result<usize, PhysicsError> {
        self.add_obstacle(Aabb::new(center, half_extents), SurfaceTag::Wall)
    }

    /// Surround the rectangle `[min.x, max.x] x [min.z, max.z]` with four
    /// walls of the given thickness, centered vertically on `min.y..max.y`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rectangle or thickness is degenerate.
    pub fn enclose(&mut self, min: Vec3, max: Vec3, thickness: f32) -> Result<(), PhysicsError> {
        let half_t = thickness * 0.5;
        let cy = (min.y + max.y) * 0.5;
        let hy = (max.y - min.y) * 0.5;
        let cx = (min.x + max.x) * 0.5;
        let cz = (min.z + max.z) * 0.5;
        let hx = (max.x - min.x) * 0.5 + thickness;
        let hz = (max.z - min.z) * 0.5 + thickness;

        self.add_wall(Vec3::new(cx, cy, max.z + half_t), Vec3::new(hx, hy, half_t))?;
        self.add_wall(Vec3::new(cx, cy, min.z - half_t), Vec3::new(hx, hy, half_t))?;
        self.add_wall(Vec3::new(min.x - half_t, cy, cz), Vec3::new(half_t, hy, hz))?;
        self.add_wall(Vec3::new(max.x + half_t, cy, cz), Vec3::new(half_t, hy, hz))?;
        Ok(())
    }
}
