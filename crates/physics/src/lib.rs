#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Box-Push Physics
//!
//! The physics layer for the box-push puzzle. It provides the small set of
//! primitives the puzzle logic needs from a physics engine and nothing more.
//!
//! ## Key Components
//!
//! -   **Math:** [`Vec3`] and [`Aabb`] in the [`types`] module.
//! -   **Ray casts:** the [`RayCaster`] trait is the query interface the
//!     stuck-box detector consults. Hits carry a [`SurfaceTag`] so callers
//!     can tell walls, boxes and floor apart.
//! -   **World:** [`KinematicWorld`] is a kinematic stand-in for a real
//!     engine. The agent is moved by position commands and shoves any box it
//!     runs into, unless that box is wedged against a wall or another box.
//!
//! ## Usage
//!
//! ```rust
//! use physics::{KinematicWorld, RayCaster, SurfaceTag, Vec3};
//!
//! let mut world = KinematicWorld::new(0.02, 0.5)?;
//! world.add_wall(Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.5, 1.0, 5.0))?;
//! let hit = world.cast_ray(Vec3::ZERO, Vec3::RIGHT, 5.0);
//! assert_eq!(hit.map(|h| h.tag), Some(SurfaceTag::Wall));
//! # Ok::<(), physics::PhysicsError>(())
//! ```

pub mod builder;
pub mod collision;
pub mod error;
pub mod types;
pub mod world;

pub use collision::{cast_against, ray_aabb, RayCaster, RayHit, SurfaceTag};
pub use error::PhysicsError;
pub use types::{Aabb, Vec3};
pub use world::{AgentBody, BoxBody, KinematicWorld, Obstacle};
