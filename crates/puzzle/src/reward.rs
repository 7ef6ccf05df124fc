//! Reward shaping terms.

use serde::Serialize;

use crate::config::{ProgressPolicy, RewardConfig};

/// Per-tick reward split by source. The terms are independent and the tick
/// reward is their plain sum.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct RewardBreakdown {
    pub step_penalty: f32,
    pub proximity: f32,
    pub progress: f32,
    pub matching: f32,
    pub completion: f32,
    pub failure: f32,
}

impl RewardBreakdown {
    /// A failed tick is worth exactly the failure penalty.
    #[must_use]
    pub fn failure(penalty: f32) -> Self {
        Self { failure: penalty, ..Self::default() }
    }

    #[must_use]
    pub fn total(&self) -> f32 {
        self.step_penalty + self.proximity + self.progress + self.matching + self.completion + self.failure
    }
}

/// Shaping for approaching the nearest unmatched box. Zero when every box
/// is matched.
#[must_use]
pub fn proximity_reward(nearest_box: Option<f32>, config: &RewardConfig) -> f32 {
    nearest_box.map_or(0.0, |d| {
        let closeness = 1.0 - (d / config.room_scale).clamp(0.0, 1.0);
        closeness * config.proximity_weight
    })
}

/// Shaping for one box moving from `last` to `now` units away from its goal.
#[must_use]
pub fn progress_reward(last: f32, now: f32, config: &RewardConfig) -> f32 {
    let delta = last - now;
    match config.progress {
        ProgressPolicy::RewardOnly => delta.max(0.0) * config.progress_weight,
        ProgressPolicy::PenalizeRegression { penalty } => {
            if delta > 0.0 {
                delta * config.progress_weight
            } else if delta < 0.0 {
                penalty
            } else {
                0.0
            }
        }
    }
}
