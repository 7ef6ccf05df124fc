//! # Kinematic World
//!
//! A minimal stand-in for a physics engine: one disc-shaped agent moved by
//! position commands, axis-aligned boxes that slide when the agent pushes
//! them, and static tagged obstacles. There is no gravity, no mass and no
//! rotation. Boxes move only while pushed and never penetrate walls or
//! each other.

use crate::collision::{cast_against, detect_disc_box_overlap, RayCaster, RayHit, SurfaceTag};
use crate::error::PhysicsError;
use crate::types::{Aabb, Vec3};

/// The pushing agent
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AgentBody {
    pub pos: Vec3,
    pub vel: Vec3,
    pub radius: f32,
}

/// A pushable box
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoxBody {
    pub pos: Vec3,
    pub vel: Vec3,
    pub half_extents: Vec3,
    /// Inactive boxes take no part in collisions or ray casts
    pub active: bool,
}

impl BoxBody {
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.half_extents)
    }
}

/// Static scenery
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Obstacle {
    pub aabb: Aabb,
    pub tag: SurfaceTag,
}

impl Obstacle {
    /// Floor-tagged scenery can be walked and slid over.
    #[must_use]
    pub fn blocks_movement(&self) -> bool {
        self.tag != SurfaceTag::Floor
    }
}

/// Container for every body in the puzzle room
#[derive(Clone, Debug)]
pub struct KinematicWorld {
    pub agent: AgentBody,
    pub boxes: Vec<BoxBody>,
    pub obstacles: Vec<Obstacle>,
    dt: f32,
}

impl KinematicWorld {
    /// Create an empty world with the agent at the origin.
    ///
    /// # Errors
    ///
    /// Returns an error if `dt` or `agent_radius` is not positive.
    pub fn new(dt: f32, agent_radius: f32) -> Result<Self, PhysicsError> {
        if dt.is_nan() || dt <= 0.0 {
            return Err(PhysicsError::InvalidTimeStep(dt));
        }
        if agent_radius.is_nan() || agent_radius <= 0.0 {
            return Err(PhysicsError::InvalidRadius(agent_radius));
        }
        Ok(Self {
            agent: AgentBody { pos: Vec3::ZERO, vel: Vec3::ZERO, radius: agent_radius },
            boxes: Vec::new(),
            obstacles: Vec::new(),
            dt,
        })
    }

    /// Advance one tick, moving the agent by `movement` in the ground plane.
    ///
    /// Boxes the agent runs into are displaced by the penetration depth. A
    /// box that would end up inside a wall or another box stays put and the
    /// agent is held back instead. Velocities are recomputed from the
    /// displacement over `dt`.
    pub fn step(&mut self, movement: Vec3) {
        let start = self.agent.pos;
        let box_starts: Vec<Vec3> = self.boxes.iter().map(|b| b.pos).collect();

        let mut target = start + Vec3::new(movement.x, 0.0, movement.z);

        for i in 0..self.boxes.len() {
            if !self.boxes[i].active {
                continue;
            }
            let Some(push) = detect_disc_box_overlap(target, self.agent.radius, &self.boxes[i].aabb()) else {
                continue;
            };
            let moved = self.boxes[i].aabb().translated(push);
            if self.is_blocked(&moved, Some(i)) {
                tracing::trace!(box_index = i, "push blocked");
                target -= push;
            } else {
                self.boxes[i].pos += push;
            }
        }

        for obstacle in self.obstacles.iter().filter(|o| o.blocks_movement()) {
            if let Some(pen) = detect_disc_box_overlap(target, self.agent.radius, &obstacle.aabb) {
                target -= pen;
            }
        }

        self.agent.pos = target;
        self.agent.vel = (target - start) / self.dt;
        for (body, before) in self.boxes.iter_mut().zip(box_starts) {
            body.vel = (body.pos - before) / self.dt;
        }
    }

    fn is_blocked(&self, candidate: &Aabb, skip: Option<usize>) -> bool {
        let hits_obstacle = self
            .obstacles
            .iter()
            .filter(|o| o.blocks_movement())
            .any(|o| o.aabb.overlaps_planar(candidate));
        let hits_box = self
            .boxes
            .iter()
            .enumerate()
            .filter(|(j, b)| Some(*j) != skip && b.active)
            .any(|(_, b)| b.aabb().overlaps_planar(candidate));
        hits_obstacle || hits_box
    }

    fn box_mut(&mut self, index: usize) -> Result<&mut BoxBody, PhysicsError> {
        let len = self.boxes.len();
        self.boxes.get_mut(index).ok_or(PhysicsError::BoxIndexOutOfRange { index, len })
    }

    pub fn set_agent_position(&mut self, pos: Vec3) {
        self.agent.pos = pos;
        self.agent.vel = Vec3::ZERO;
    }

    /// Teleport a box, clearing its velocity.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` does not name a box.
    pub fn set_box_position(&mut self, index: usize, pos: Vec3) -> Result<(), PhysicsError> {
        let body = self.box_mut(index)?;
        body.pos = pos;
        body.vel = Vec3::ZERO;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if `index` does not name a box.
    pub fn set_box_active(&mut self, index: usize, active: bool) -> Result<(), PhysicsError> {
        self.box_mut(index)?.active = active;
        Ok(())
    }
}

impl RayCaster for KinematicWorld {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let scenery = self.obstacles.iter().map(|o| (&o.aabb, o.tag));
        let boxes: Vec<Aabb> = self.boxes.iter().filter(|b| b.active).map(BoxBody::aabb).collect();
        let bodies = boxes.iter().map(|a| (a, SurfaceTag::Box));
        cast_against(origin, direction, max_distance, scenery.chain(bodies))
    }
}
