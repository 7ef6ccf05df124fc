use physics::{KinematicWorld, Vec3};
use serde::Serialize;

use crate::config::PuzzleConfig;
use crate::controller::{EpisodeController, StepOutcome};
use crate::error::PuzzleError;
use crate::observation::{encode, observation_size};
use crate::placement::{Placement, Spawner};
use crate::scene::{Agent, Scene};

/// Step/reset interface a training loop drives.
///
/// Observations are flat `f32` vectors of [`Env::obs_size`] values and
/// actions are slices of [`Env::action_size`] values. Both calls are
/// fallible so a malformed action or layout surfaces as a [`PuzzleError`]
/// instead of a panic.
pub trait Env {
    /// Advance the environment by one action.
    ///
    /// # Errors
    ///
    /// Returns an error if `action` does not have [`Env::action_size`] values.
    fn step(&mut self, action: &[f32]) -> Result<Transition, PuzzleError>;

    /// Start a new episode and return the initial observation vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the new layout cannot be applied.
    fn reset(&mut self) -> Result<Vec<f32>, PuzzleError>;

    /// Size of the observation vector.
    fn obs_size(&self) -> usize;

    /// Size of the action space.
    fn action_size(&self) -> usize;
}

/// What one [`Env::step`] produced
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Transition {
    pub obs: Vec<f32>,
    pub reward: f32,
    pub done: bool,
    pub success: bool,
    pub info: StepOutcome,
}

/// The box-push puzzle on top of a [`KinematicWorld`].
///
/// Actions are two floats, planar x and z, clamped to `[-1, 1]` and scaled
/// by `move_speed * dt`. The room is walled in just outside the spawn area.
pub struct BoxPushEnv {
    config: PuzzleConfig,
    world: KinematicWorld,
    scene: Scene,
    controller: EpisodeController,
    spawner: Spawner,
    steps: usize,
}

const ACTION_SIZE: usize = 2;

/// NaN and infinities become no movement.
fn axis_value(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

impl BoxPushEnv {
    /// Build the room and draw the first layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid.
    pub fn new(config: PuzzleConfig, seed: Option<u64>) -> Result<Self, PuzzleError> {
        config.validate()?;
        let m = &config.movement;
        let l = &config.layout;

        let mut world = KinematicWorld::new(m.dt, m.agent_radius)?;
        let heights = [l.agent_height, l.box_height, l.goal_height];
        let floor = heights.iter().copied().fold(f32::INFINITY, f32::min) - 1.0;
        let ceiling = heights.iter().copied().fold(f32::NEG_INFINITY, f32::max) + 1.0;
        world.enclose(
            Vec3::new(l.x_range[0] - l.wall_margin, floor, l.z_range[0] - l.wall_margin),
            Vec3::new(l.x_range[1] + l.wall_margin, ceiling, l.z_range[1] + l.wall_margin),
            l.wall_thickness,
        )?;

        let min_separation = 2.0 * m.box_half_extent + m.agent_radius;
        let mut spawner = Spawner::new(l.clone(), min_separation, seed);
        let placement = spawner.sample();

        let half = Vec3::new(m.box_half_extent, m.box_half_extent, m.box_half_extent);
        for &p in &placement.boxes {
            world.add_box(p, half)?;
        }
        world.set_agent_position(placement.agent);

        let scene = Scene::new(placement.agent, &placement.boxes, &placement.goals)?;
        let controller = EpisodeController::new(&config, &scene)?;
        tracing::debug!(
            boxes = placement.boxes.len(),
            goals = placement.goals.len(),
            "box-push environment created"
        );

        Ok(Self {
            config,
            world,
            scene,
            controller,
            spawner,
            steps: 0,
        })
    }

    /// Start a new episode from an explicit layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout's box or goal count differs from the
    /// environment's.
    pub fn reset_to(&mut self, placement: &Placement) -> Result<Vec<f32>, PuzzleError> {
        self.controller.reset(&mut self.scene, &placement.boxes, &placement.goals)?;
        self.scene.agent = Agent { position: placement.agent, velocity: Vec3::ZERO };

        self.world.set_agent_position(placement.agent);
        for (i, &p) in placement.boxes.iter().enumerate() {
            self.world.set_box_position(i, p)?;
            self.world.set_box_active(i, true)?;
        }
        self.steps = 0;
        Ok(encode(&self.scene, &self.config.observation))
    }

    /// Copy the agent and every still-active box out of the physics world.
    fn pull_from_world(&mut self) {
        self.scene.agent = Agent {
            position: self.world.agent.pos,
            velocity: self.world.agent.vel,
        };
        for (b, body) in self.scene.boxes_mut().iter_mut().zip(&self.world.boxes) {
            if b.is_active() {
                b.position = body.pos;
                b.velocity = body.vel;
            }
        }
    }

    fn transition(&self, info: StepOutcome) -> Transition {
        Transition {
            obs: encode(&self.scene, &self.config.observation),
            reward: info.reward,
            done: info.terminal,
            success: info.success,
            info,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn world(&self) -> &KinematicWorld {
        &self.world
    }

    #[must_use]
    pub fn controller(&self) -> &EpisodeController {
        &self.controller
    }

    /// Ticks since the last reset
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl Env for BoxPushEnv {
    fn step(&mut self, action: &[f32]) -> Result<Transition, PuzzleError> {
        let [ax, az] = <[f32; ACTION_SIZE]>::try_from(action).map_err(|_| PuzzleError::ActionSize {
            expected: ACTION_SIZE,
            actual: action.len(),
        })?;

        if !self.controller.is_running() {
            let info = self.controller.step(&mut self.scene, &self.world);
            return Ok(self.transition(info));
        }

        let scale = self.config.movement.move_speed * self.config.movement.dt;
        self.world.step(Vec3::new(axis_value(ax) * scale, 0.0, axis_value(az) * scale));
        self.pull_from_world();

        let tick = self.controller.begin_step(&mut self.scene);
        // Matched boxes leave the world before the stuck probes run.
        for pair in tick.matches() {
            let snapped = self.scene.boxes()[pair.box_index].position;
            self.world.set_box_position(pair.box_index, snapped)?;
            self.world.set_box_active(pair.box_index, false)?;
        }
        let info = self.controller.finish_step(tick, &self.scene, &self.world);
        self.steps += 1;
        Ok(self.transition(info))
    }

    fn reset(&mut self) -> Result<Vec<f32>, PuzzleError> {
        let placement = self.spawner.sample();
        tracing::debug!(previous_steps = self.steps, "resetting environment");
        self.reset_to(&placement)
    }

    fn obs_size(&self) -> usize {
        observation_size(&self.config.observation)
    }

    fn action_size(&self) -> usize {
        ACTION_SIZE
    }
}
