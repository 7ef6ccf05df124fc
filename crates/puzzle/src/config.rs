//! Puzzle configuration
//!
//! Every tunable constant of the puzzle lives here: match threshold and
//! assignment strategy, reward magnitudes, stuck detection, movement,
//! observation padding and spawn layout. Each section deserializes with
//! defaults, so a JSON file only needs the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PuzzleError;

/// How boxes are paired with goals once they are within range.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assignment {
    /// Boxes in input order each take the first free goal in range.
    #[default]
    ScanOrder,
    /// Closest in-range pairs are taken first.
    GreedyNearest,
}

/// How a change in box-to-goal distance is rewarded.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ProgressPolicy {
    /// Reward improvement, ignore regression.
    #[default]
    RewardOnly,
    /// Reward improvement, charge a fixed penalty for any regression.
    PenalizeRegression { penalty: f32 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchingConfig {
    /// Planar (x, z) distance under which a box matches a goal
    pub threshold: f32,
    pub assignment: Assignment,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            assignment: Assignment::ScanOrder,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewardConfig {
    /// Added every tick
    pub step_penalty: f32,
    /// Scale of the agent-to-nearest-box shaping term
    pub proximity_weight: f32,
    /// Distance at which proximity shaping reaches zero
    pub room_scale: f32,
    /// Scale applied to each box's distance improvement
    pub progress_weight: f32,
    pub progress: ProgressPolicy,
    pub match_bonus: f32,
    pub completion_bonus: f32,
    /// Replaces the whole tick reward on failure
    pub failure_penalty: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            step_penalty: -0.001,
            proximity_weight: 0.001,
            room_scale: 10.0, // room is roughly 10 units across
            progress_weight: 0.1,
            progress: ProgressPolicy::RewardOnly,
            match_bonus: 1.0,
            completion_bonus: 2.0,
            failure_penalty: -1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StuckConfig {
    pub enabled: bool,
    /// Length of each of the four probes cast from a box center
    pub probe_length: f32,
    /// Agent height below which the episode fails, if set
    pub fall_height: Option<f32>,
}

impl Default for StuckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            probe_length: 1.0,
            fall_height: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MovementConfig {
    /// Units per second at full action
    pub move_speed: f32,
    /// Seconds per tick
    pub dt: f32,
    pub agent_radius: f32,
    pub box_half_extent: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            dt: 0.02,
            agent_radius: 0.5,
            box_half_extent: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ObservationConfig {
    /// Box slots in the observation; unused slots are zero-padded
    pub max_boxes: usize,
    /// Goal slots in the observation; unused slots are zero-padded
    pub max_goals: usize,
}

impl Default for ObservationConfig {
    fn default() -> Self {
        Self { max_boxes: 4, max_goals: 4 }
    }
}

/// Spawn area and body counts. Positions are drawn uniformly from
/// `x_range` x `z_range`; each body kind sits at a fixed height.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub box_count: usize,
    pub goal_count: usize,
    pub x_range: [f32; 2],
    pub z_range: [f32; 2],
    pub agent_height: f32,
    pub box_height: f32,
    pub goal_height: f32,
    /// Distance between the spawn area and the enclosing walls
    pub wall_margin: f32,
    pub wall_thickness: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            box_count: 3,
            goal_count: 3,
            x_range: [-8.3, 5.0],
            z_range: [-11.65, 1.35],
            agent_height: 7.8,
            box_height: 7.5,
            goal_height: 6.77,
            wall_margin: 1.0,
            wall_thickness: 0.5,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PuzzleConfig {
    pub matching: MatchingConfig,
    pub reward: RewardConfig,
    pub stuck: StuckConfig,
    pub movement: MovementConfig,
    pub observation: ObservationConfig,
    pub layout: LayoutConfig,
}

fn positive(field: &'static str, value: f32) -> Result<(), PuzzleError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PuzzleError::invalid(field, format!("must be positive and finite, got {value}")))
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), PuzzleError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PuzzleError::invalid(field, format!("must be finite, got {value}")))
    }
}

fn range(field: &'static str, [lo, hi]: [f32; 2]) -> Result<(), PuzzleError> {
    if lo.is_finite() && hi.is_finite() && lo < hi {
        Ok(())
    } else {
        Err(PuzzleError::invalid(field, format!("expected min < max, got [{lo}, {hi}]")))
    }
}

impl PuzzleConfig {
    /// Parse a config from JSON and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON, unknown fields or invalid values.
    pub fn from_json_str(json: &str) -> Result<Self, PuzzleError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails to parse or validate.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PuzzleError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check the parts of the config the episode controller depends on.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::InvalidConfig`] naming the first bad field.
    pub fn validate_rules(&self) -> Result<(), PuzzleError> {
        positive("matching.threshold", self.matching.threshold)?;

        let r = &self.reward;
        finite("reward.step_penalty", r.step_penalty)?;
        finite("reward.proximity_weight", r.proximity_weight)?;
        positive("reward.room_scale", r.room_scale)?;
        finite("reward.progress_weight", r.progress_weight)?;
        if let ProgressPolicy::PenalizeRegression { penalty } = r.progress {
            finite("reward.progress.penalty", penalty)?;
        }
        finite("reward.match_bonus", r.match_bonus)?;
        finite("reward.completion_bonus", r.completion_bonus)?;
        finite("reward.failure_penalty", r.failure_penalty)?;

        positive("stuck.probe_length", self.stuck.probe_length)?;
        if let Some(h) = self.stuck.fall_height {
            finite("stuck.fall_height", h)?;
        }
        Ok(())
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), PuzzleError> {
        self.validate_rules()?;

        let m = &self.movement;
        positive("movement.move_speed", m.move_speed)?;
        positive("movement.dt", m.dt)?;
        positive("movement.agent_radius", m.agent_radius)?;
        positive("movement.box_half_extent", m.box_half_extent)?;

        let l = &self.layout;
        if l.box_count == 0 {
            return Err(PuzzleError::NoBoxes);
        }
        if l.goal_count == 0 {
            return Err(PuzzleError::NoGoals);
        }
        range("layout.x_range", l.x_range)?;
        range("layout.z_range", l.z_range)?;
        finite("layout.agent_height", l.agent_height)?;
        finite("layout.box_height", l.box_height)?;
        finite("layout.goal_height", l.goal_height)?;
        finite("layout.wall_margin", l.wall_margin)?;
        if l.wall_margin < 0.0 {
            return Err(PuzzleError::invalid("layout.wall_margin", "must not be negative"));
        }
        positive("layout.wall_thickness", l.wall_thickness)?;

        let o = &self.observation;
        if o.max_boxes < l.box_count {
            return Err(PuzzleError::invalid(
                "observation.max_boxes",
                format!("{} slots cannot hold {} boxes", o.max_boxes, l.box_count),
            ));
        }
        if o.max_goals < l.goal_count {
            return Err(PuzzleError::invalid(
                "observation.max_goals",
                format!("{} slots cannot hold {} goals", o.max_goals, l.goal_count),
            ));
        }
        Ok(())
    }
}
