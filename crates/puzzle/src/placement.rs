//! Random episode layouts.

use physics::Vec3;

use crate::config::LayoutConfig;

/// Attempts per body before accepting an overlapping spot
const MAX_ATTEMPTS: usize = 64;

/// Starting positions for one episode
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub agent: Vec3,
    pub boxes: Vec<Vec3>,
    pub goals: Vec<Vec3>,
}

/// Draws uniform-random layouts inside the configured spawn area.
///
/// Boxes are kept `min_separation` apart from each other and from the
/// agent in the ground plane when the area allows it. Goals are placed
/// freely since nothing collides with them.
pub struct Spawner {
    layout: LayoutConfig,
    min_separation: f32,
    rng: fastrand::Rng,
}

impl Spawner {
    /// A fixed `seed` makes the sequence of layouts reproducible.
    #[must_use]
    pub fn new(layout: LayoutConfig, min_separation: f32, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        Self { layout, min_separation, rng }
    }

    fn uniform(&self, [lo, hi]: [f32; 2]) -> f32 {
        lo + self.rng.f32() * (hi - lo)
    }

    fn planar_point(&self, height: f32) -> Vec3 {
        Vec3::new(self.uniform(self.layout.x_range), height, self.uniform(self.layout.z_range))
    }

    pub fn sample(&mut self) -> Placement {
        let agent = self.planar_point(self.layout.agent_height);

        let mut boxes: Vec<Vec3> = Vec::with_capacity(self.layout.box_count);
        for _ in 0..self.layout.box_count {
            let mut candidate = self.planar_point(self.layout.box_height);
            for _ in 1..MAX_ATTEMPTS {
                let clear = std::iter::once(&agent)
                    .chain(&boxes)
                    .all(|other| other.planar_distance(candidate) >= self.min_separation);
                if clear {
                    break;
                }
                candidate = self.planar_point(self.layout.box_height);
            }
            boxes.push(candidate);
        }

        let goals = (0..self.layout.goal_count)
            .map(|_| self.planar_point(self.layout.goal_height))
            .collect();

        Placement { agent, boxes, goals }
    }
}
