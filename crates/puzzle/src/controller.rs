//! # Episode Controller
//!
//! Turns the per-tick scene snapshot into a shaped reward and a termination
//! decision. The controller is a flat two-state machine: it runs until the
//! puzzle is completed or a failure is detected, then stays terminated until
//! [`EpisodeController::reset`] is called.
//!
//! Each tick is evaluated in a fixed order:
//!
//! 1. step penalty, proximity shaping and progress shaping
//! 2. matching, which snaps and deactivates newly paired boxes
//! 3. completion, once `min(boxes, goals)` pairs exist
//! 4. failure, if an unmatched box is stuck or the agent has fallen
//!
//! A failed tick is worth exactly the failure penalty, whatever the shaping
//! terms would have been.

use physics::{RayCaster, Vec3};
use serde::Serialize;

use crate::config::{MatchingConfig, PuzzleConfig, RewardConfig, StuckConfig};
use crate::error::PuzzleError;
use crate::matching::{find_matches, nearest_unmatched_box, nearest_unmatched_goal};
use crate::reward::{progress_reward, proximity_reward, RewardBreakdown};
use crate::scene::Scene;
use crate::stuck::StuckDetector;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Running,
    Terminated { success: bool },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct MatchedPair {
    pub box_index: usize,
    pub goal_index: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCause {
    StuckBox { box_index: usize },
    AgentFell,
}

/// Result of one controller tick
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepOutcome {
    pub reward: f32,
    pub terminal: bool,
    pub success: bool,
    pub breakdown: RewardBreakdown,
    /// Pairs recorded during this tick
    pub matches: Vec<MatchedPair>,
    pub failure: Option<FailureCause>,
}

impl StepOutcome {
    fn new(breakdown: RewardBreakdown, phase: Phase, matches: Vec<MatchedPair>, failure: Option<FailureCause>) -> Self {
        let (terminal, success) = match phase {
            Phase::Running => (false, false),
            Phase::Terminated { success } => (true, success),
        };
        Self {
            reward: breakdown.total(),
            terminal,
            success,
            breakdown,
            matches,
            failure,
        }
    }
}

/// A tick that has been shaped and matched but not yet checked for
/// completion or failure.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct PendingTick {
    live: bool,
    breakdown: RewardBreakdown,
    matches: Vec<MatchedPair>,
}

impl PendingTick {
    /// Pairs recorded so far this tick
    #[must_use]
    pub fn matches(&self) -> &[MatchedPair] {
        &self.matches
    }
}

/// Everything the controller remembers within one episode.
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeState {
    matched: Vec<MatchedPair>,
    /// Distance from each unmatched box to its nearest unmatched goal at the
    /// end of the previous tick
    last_distances: Vec<Option<f32>>,
    last_total_distance: f32,
    phase: Phase,
}

impl EpisodeState {
    fn fresh(scene: &Scene) -> Self {
        let mut state = Self {
            matched: Vec::with_capacity(scene.required_matches()),
            last_distances: vec![None; scene.boxes().len()],
            last_total_distance: 0.0,
            phase: Phase::Running,
        };
        state.reseed(scene);
        state
    }

    /// Record the current box-to-goal distances as the progress baseline.
    fn reseed(&mut self, scene: &Scene) {
        let mut total = 0.0;
        for (slot, b) in self.last_distances.iter_mut().zip(scene.boxes()) {
            *slot = if b.is_active() {
                nearest_unmatched_goal(b.position, scene.goals()).map(|(_, d)| d)
            } else {
                None
            };
            total += slot.unwrap_or(0.0);
        }
        self.last_total_distance = total;
    }

    #[must_use]
    pub fn matched_pairs(&self) -> &[MatchedPair] {
        &self.matched
    }

    #[must_use]
    pub fn last_total_distance(&self) -> f32 {
        self.last_total_distance
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }
}

pub struct EpisodeController {
    matching: MatchingConfig,
    reward: RewardConfig,
    stuck: StuckConfig,
    detector: StuckDetector,
    state: EpisodeState,
}

impl EpisodeController {
    /// Create a controller for `scene`, starting in the running phase.
    ///
    /// # Errors
    ///
    /// Returns an error if the matching, reward or stuck settings are invalid.
    pub fn new(config: &PuzzleConfig, scene: &Scene) -> Result<Self, PuzzleError> {
        config.validate_rules()?;
        Ok(Self {
            matching: config.matching.clone(),
            reward: config.reward.clone(),
            stuck: config.stuck.clone(),
            detector: StuckDetector::new(config.stuck.probe_length),
            state: EpisodeState::fresh(scene),
        })
    }

    /// Start a new episode with boxes and goals at the given positions.
    ///
    /// All boxes and goals are reactivated and at rest, the matched set is
    /// emptied and the progress baseline is taken from the new layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the position lists do not match the scene.
    pub fn reset(&mut self, scene: &mut Scene, box_positions: &[Vec3], goal_positions: &[Vec3]) -> Result<(), PuzzleError> {
        scene.reposition(box_positions, goal_positions)?;
        self.state = EpisodeState::fresh(scene);
        tracing::debug!(
            boxes = scene.boxes().len(),
            goals = scene.goals().len(),
            baseline = self.state.last_total_distance,
            "episode reset"
        );
        Ok(())
    }

    /// Evaluate one tick. Newly matched boxes in `scene` are snapped onto
    /// their goal, stopped and deactivated; the caller is expected to mirror
    /// that into its physics provider.
    ///
    /// `caster` must already exclude boxes matched during this tick. A
    /// caller whose provider only learns about matches afterwards should use
    /// [`begin_step`](Self::begin_step) and [`finish_step`](Self::finish_step)
    /// and update the provider in between.
    pub fn step<R: RayCaster + ?Sized>(&mut self, scene: &mut Scene, caster: &R) -> StepOutcome {
        let tick = self.begin_step(scene);
        self.finish_step(tick, scene, caster)
    }

    /// Shaping and matching for one tick.
    pub fn begin_step(&mut self, scene: &mut Scene) -> PendingTick {
        if let Phase::Terminated { .. } = self.state.phase {
            return PendingTick {
                live: false,
                breakdown: RewardBreakdown::default(),
                matches: Vec::new(),
            };
        }

        let mut breakdown = RewardBreakdown {
            step_penalty: self.reward.step_penalty,
            ..RewardBreakdown::default()
        };

        let agent = scene.agent.position;
        breakdown.proximity = proximity_reward(nearest_unmatched_box(agent, scene.boxes()), &self.reward);
        breakdown.progress = self.track_progress(scene);

        let matches = self.apply_matches(scene);
        breakdown.matching = matches.iter().map(|_| self.reward.match_bonus).sum();

        PendingTick { live: true, breakdown, matches }
    }

    /// Completion and failure checks for a tick opened with
    /// [`begin_step`](Self::begin_step).
    pub fn finish_step<R: RayCaster + ?Sized>(&mut self, tick: PendingTick, scene: &Scene, caster: &R) -> StepOutcome {
        let PendingTick { live, mut breakdown, matches } = tick;
        if !live {
            return StepOutcome::new(breakdown, self.state.phase, matches, None);
        }

        if self.state.matched.len() >= scene.required_matches() {
            breakdown.completion = self.reward.completion_bonus;
            self.state.phase = Phase::Terminated { success: true };
            tracing::info!(matched = self.state.matched.len(), "puzzle complete");
            return StepOutcome::new(breakdown, self.state.phase, matches, None);
        }

        if let Some(cause) = self.detect_failure(scene, caster) {
            self.state.phase = Phase::Terminated { success: false };
            tracing::info!(?cause, "episode failed");
            return StepOutcome::new(
                RewardBreakdown::failure(self.reward.failure_penalty),
                self.state.phase,
                matches,
                Some(cause),
            );
        }

        tracing::trace!(reward = breakdown.total(), "tick");
        StepOutcome::new(breakdown, self.state.phase, matches, None)
    }

    /// Progress shaping summed over every unmatched box, updating the
    /// per-box baselines as it goes.
    fn track_progress(&mut self, scene: &Scene) -> f32 {
        let mut progress = 0.0;
        let mut total = 0.0;
        for (slot, b) in self.state.last_distances.iter_mut().zip(scene.boxes()) {
            if !b.is_active() {
                continue;
            }
            let Some((_, now)) = nearest_unmatched_goal(b.position, scene.goals()) else {
                continue;
            };
            if let Some(last) = *slot {
                progress += progress_reward(last, now, &self.reward);
            }
            *slot = Some(now);
            total += now;
        }
        self.state.last_total_distance = total;
        progress
    }

    fn apply_matches(&mut self, scene: &mut Scene) -> Vec<MatchedPair> {
        let pairs = find_matches(scene.boxes(), scene.goals(), self.matching.threshold, self.matching.assignment);
        if pairs.is_empty() {
            return Vec::new();
        }

        let mut recorded = Vec::with_capacity(pairs.len());
        for (box_index, goal_index) in pairs {
            let goal = scene.goals()[goal_index].position;
            let b = &mut scene.boxes_mut()[box_index];
            b.position.x = goal.x;
            b.position.z = goal.z;
            b.velocity = Vec3::ZERO;
            b.matched = true;
            scene.goals_mut()[goal_index].matched = true;

            let pair = MatchedPair { box_index, goal_index };
            tracing::debug!(box_index, goal_index, "box matched");
            self.state.matched.push(pair);
            recorded.push(pair);
        }

        // A matched goal is no longer a target; re-baseline so the jump in
        // nearest-goal distance is neither rewarded nor penalized.
        self.state.reseed(scene);
        recorded
    }

    fn detect_failure<R: RayCaster + ?Sized>(&self, scene: &Scene, caster: &R) -> Option<FailureCause> {
        if let Some(floor) = self.stuck.fall_height {
            if scene.agent.position.y < floor {
                return Some(FailureCause::AgentFell);
            }
        }
        if !self.stuck.enabled {
            return None;
        }
        scene
            .boxes()
            .iter()
            .position(|b| b.is_active() && self.detector.is_stuck(b.position, caster))
            .map(|box_index| FailureCause::StuckBox { box_index })
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.phase == Phase::Running
    }

    #[must_use]
    pub fn matched_pairs(&self) -> &[MatchedPair] {
        &self.state.matched
    }

    #[must_use]
    pub fn matched_count(&self) -> usize {
        self.state.matched.len()
    }

    #[must_use]
    pub fn state(&self) -> &EpisodeState {
        &self.state
    }
}
