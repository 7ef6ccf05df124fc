//! Action sources for driving an [`Env`](crate::Env) without a trained
//! network.

/// Produces the two planar action values from an observation.
pub trait Policy {
    fn act(&mut self, obs: &[f32]) -> [f32; 2];
}

/// Never moves.
#[derive(Copy, Clone, Debug, Default)]
pub struct IdlePolicy;

impl Policy for IdlePolicy {
    fn act(&mut self, _obs: &[f32]) -> [f32; 2] {
        [0.0, 0.0]
    }
}

/// Uniform random actions in `[-1, 1]`.
pub struct RandomPolicy {
    rng: fastrand::Rng,
}

impl RandomPolicy {
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        Self { rng: seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed) }
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _obs: &[f32]) -> [f32; 2] {
        [self.rng.f32() * 2.0 - 1.0, self.rng.f32() * 2.0 - 1.0]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A human-facing input device exposing two analog axes.
pub trait AxisInput {
    fn axis(&self, axis: Axis) -> f32;
}

/// Fixed axis readings, e.g. a held key.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct HeldAxes {
    pub horizontal: f32,
    pub vertical: f32,
}

impl AxisInput for HeldAxes {
    fn axis(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.horizontal,
            Axis::Vertical => self.vertical,
        }
    }
}

/// Interactive mode: horizontal drives x, vertical drives z.
pub struct HeuristicPolicy<I> {
    input: I,
}

impl<I: AxisInput> HeuristicPolicy<I> {
    #[must_use]
    pub fn new(input: I) -> Self {
        Self { input }
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }
}

impl<I: AxisInput> Policy for HeuristicPolicy<I> {
    fn act(&mut self, _obs: &[f32]) -> [f32; 2] {
        [
            self.input.axis(Axis::Horizontal).clamp(-1.0, 1.0),
            self.input.axis(Axis::Vertical).clamp(-1.0, 1.0),
        ]
    }
}
