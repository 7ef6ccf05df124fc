//! Flat observation vector for the policy.
//!
//! Layout, with fixed slot counts so the vector length never changes:
//!
//! | part          | floats per slot | content                                  |
//! |---------------|-----------------|------------------------------------------|
//! | agent         | 6               | position, velocity                       |
//! | box slot x N  | 9               | position, position - agent, velocity     |
//! | goal slot x M | 6               | position, position - agent               |
//!
//! Slots past the scene's body count are zero-filled.

use physics::Vec3;

use crate::config::ObservationConfig;
use crate::scene::Scene;

const AGENT_FLOATS: usize = 6;
const BOX_FLOATS: usize = 9;
const GOAL_FLOATS: usize = 6;

#[must_use]
pub fn observation_size(config: &ObservationConfig) -> usize {
    AGENT_FLOATS + config.max_boxes * BOX_FLOATS + config.max_goals * GOAL_FLOATS
}

fn push(obs: &mut Vec<f32>, v: Vec3) {
    obs.extend_from_slice(&v.to_array());
}

#[must_use]
pub fn encode(scene: &Scene, config: &ObservationConfig) -> Vec<f32> {
    let mut obs = Vec::with_capacity(observation_size(config));
    let agent = scene.agent.position;
    push(&mut obs, agent);
    push(&mut obs, scene.agent.velocity);

    for i in 0..config.max_boxes {
        match scene.boxes().get(i) {
            Some(b) => {
                push(&mut obs, b.position);
                push(&mut obs, b.position - agent);
                push(&mut obs, b.velocity);
            }
            None => obs.resize(obs.len() + BOX_FLOATS, 0.0),
        }
    }

    for i in 0..config.max_goals {
        match scene.goals().get(i) {
            Some(g) => {
                push(&mut obs, g.position);
                push(&mut obs, g.position - agent);
            }
            None => obs.resize(obs.len() + GOAL_FLOATS, 0.0),
        }
    }
    obs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_size_is_66() {
        assert_eq!(observation_size(&ObservationConfig::default()), 66);
    }

    #[test]
    fn layout_and_padding() {
        let mut scene = Scene::new(
            Vec3::new(1.0, 2.0, 3.0),
            &[Vec3::new(4.0, 2.0, 3.0)],
            &[Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 5.0)],
        )
        .unwrap();
        scene.boxes_mut()[0].velocity = Vec3::new(0.5, 0.0, 0.0);
        let config = ObservationConfig { max_boxes: 2, max_goals: 3 };

        let obs = encode(&scene, &config);
        assert_eq!(obs.len(), observation_size(&config));
        assert_eq!(&obs[0..3], &[1.0, 2.0, 3.0]);
        // first box: position, relative position, velocity
        assert_eq!(&obs[6..15], &[4.0, 2.0, 3.0, 3.0, 0.0, 0.0, 0.5, 0.0, 0.0]);
        // second box slot is padding
        assert!(obs[15..24].iter().all(|&v| v == 0.0));
        // second goal relative position
        assert_eq!(&obs[30..36], &[0.0, 0.0, 5.0, -1.0, -2.0, 2.0]);
        // third goal slot is padding
        assert!(obs[36..42].iter().all(|&v| v == 0.0));
    }
}
