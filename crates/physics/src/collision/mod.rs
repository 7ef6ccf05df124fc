//! # Collision Queries
//!
//! Ray casts against tagged volumes and the planar overlap tests used by the
//! kinematic world to push boxes around.

mod disc_box;
mod ray;

pub use disc_box::*;
pub use ray::*;
