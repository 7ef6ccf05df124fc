//! Tests for the episode controller state machine and reward composition

use physics::{RayHit, SurfaceTag, Vec3};
use puzzle::{
    Assignment, EpisodeController, FailureCause, MatchedPair, Phase, ProgressPolicy, PuzzleConfig,
    PuzzleError, Scene, StepOutcome,
};

fn open(_: Vec3, _: Vec3, _: f32) -> Option<RayHit> {
    None
}

fn walled(_: Vec3, _: Vec3, _: f32) -> Option<RayHit> {
    Some(RayHit { distance: 0.5, tag: SurfaceTag::Wall })
}

fn config_with_threshold(threshold: f32) -> PuzzleConfig {
    let mut config = PuzzleConfig::default();
    config.matching.threshold = threshold;
    config
}

fn assert_sums(outcome: &StepOutcome) {
    assert!(
        (outcome.breakdown.total() - outcome.reward).abs() < 1e-6,
        "breakdown {:?} does not add up to {}",
        outcome.breakdown,
        outcome.reward
    );
}

#[test]
fn test_reset_starts_running_with_no_matches() {
    println!("\n=== Testing Reset ===");

    let config = config_with_threshold(0.25);
    let mut scene = Scene::new(
        Vec3::new(0.0, 0.0, -5.0),
        &[Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0)],
        &[Vec3::new(0.1, 0.0, 0.0), Vec3::new(-3.0, 0.0, 0.0)],
    )
    .unwrap();
    let mut controller = EpisodeController::new(&config, &scene).unwrap();
    assert_eq!(controller.phase(), Phase::Running);
    assert_eq!(controller.matched_count(), 0);

    let outcome = controller.step(&mut scene, &open);
    assert_eq!(controller.matched_count(), 1);
    assert_sums(&outcome);

    controller
        .reset(
            &mut scene,
            &[Vec3::new(1.0, 0.0, 1.0), Vec3::new(2.0, 0.0, 2.0)],
            &[Vec3::new(-1.0, 0.0, -1.0), Vec3::new(-2.0, 0.0, -2.0)],
        )
        .unwrap();
    assert_eq!(controller.phase(), Phase::Running);
    assert_eq!(controller.matched_count(), 0);
    assert!(scene.boxes().iter().all(|b| b.is_active()));
    assert!(scene.goals().iter().all(|g| g.is_active()));
    assert_eq!(scene.boxes()[0].velocity, Vec3::ZERO);

    // Baseline is the sum of nearest-goal distances in the new layout
    let expected = Vec3::new(1.0, 0.0, 1.0).distance(Vec3::new(-1.0, 0.0, -1.0))
        + Vec3::new(2.0, 0.0, 2.0).distance(Vec3::new(-1.0, 0.0, -1.0));
    assert!((controller.state().last_total_distance() - expected).abs() < 1e-5);

    println!("✓ Reset clears matches and re-seeds distances");
}

#[test]
fn test_reset_rejects_wrong_placement_size() {
    let config = PuzzleConfig::default();
    let mut scene = Scene::new(Vec3::ZERO, &[Vec3::ZERO], &[Vec3::RIGHT]).unwrap();
    let mut controller = EpisodeController::new(&config, &scene).unwrap();

    let err = controller.reset(&mut scene, &[Vec3::ZERO], &[]).unwrap_err();
    assert!(matches!(err, PuzzleError::PlacementMismatch { kind: "goal", expected: 1, actual: 0 }));
}

#[test]
fn test_invalid_rules_rejected_at_construction() {
    let scene = Scene::new(Vec3::ZERO, &[Vec3::ZERO], &[Vec3::RIGHT]).unwrap();
    let config = config_with_threshold(-1.0);
    assert!(matches!(
        EpisodeController::new(&config, &scene),
        Err(PuzzleError::InvalidConfig { field: "matching.threshold", .. })
    ));
}

#[test]
fn test_box_within_threshold_matches() {
    println!("\n=== Testing Match Event ===");

    let config = config_with_threshold(0.25);
    let mut scene = Scene::new(
        Vec3::new(0.0, 0.0, -3.0),
        &[Vec3::ZERO, Vec3::new(5.0, 0.0, 5.0)],
        &[Vec3::new(0.2, 0.0, 0.0), Vec3::new(-5.0, 0.0, -5.0)],
    )
    .unwrap();
    scene.boxes_mut()[0].velocity = Vec3::new(1.0, 0.0, 0.0);
    let mut controller = EpisodeController::new(&config, &scene).unwrap();

    let outcome = controller.step(&mut scene, &open);

    assert_eq!(outcome.matches, vec![MatchedPair { box_index: 0, goal_index: 0 }]);
    assert!(!scene.boxes()[0].is_active(), "matched box must be deactivated");
    assert!(!scene.goals()[0].is_active());
    assert_eq!(scene.boxes()[0].position, Vec3::new(0.2, 0.0, 0.0), "box snapped onto goal");
    assert_eq!(scene.boxes()[0].velocity, Vec3::ZERO);
    assert_eq!(outcome.breakdown.matching, 1.0);
    assert!(outcome.reward > 0.99);
    assert!(!outcome.terminal);
    assert_sums(&outcome);

    println!("✓ Match recorded with bonus {}", outcome.breakdown.matching);
}

#[test]
fn test_snap_keeps_box_height() {
    let config = config_with_threshold(0.25);
    let mut scene = Scene::new(
        Vec3::ZERO,
        &[Vec3::new(1.0, 7.5, 1.0), Vec3::new(9.0, 7.5, 9.0)],
        &[Vec3::new(1.1, 6.77, 0.9), Vec3::new(-9.0, 6.77, -9.0)],
    )
    .unwrap();
    let mut controller = EpisodeController::new(&config, &scene).unwrap();
    controller.step(&mut scene, &open);
    assert_eq!(scene.boxes()[0].position, Vec3::new(1.1, 7.5, 0.9));
}

#[test]
fn test_stuck_box_fails_episode() {
    println!("\n=== Testing Stuck Failure ===");

    let config = PuzzleConfig::default();
    let mut scene = Scene::new(Vec3::new(0.0, 0.0, -2.0), &[Vec3::ZERO], &[Vec3::new(5.0, 0.0, 0.0)]).unwrap();
    let mut controller = EpisodeController::new(&config, &scene).unwrap();

    // Approach the box so shaping terms would be non-zero
    scene.agent.position = Vec3::new(0.0, 0.0, -1.0);
    let outcome = controller.step(&mut scene, &walled);

    assert!(outcome.terminal);
    assert!(!outcome.success);
    assert_eq!(outcome.failure, Some(FailureCause::StuckBox { box_index: 0 }));
    assert_eq!(outcome.reward, config.reward.failure_penalty);
    assert_eq!(outcome.breakdown.proximity, 0.0);
    assert_sums(&outcome);
    assert_eq!(controller.phase(), Phase::Terminated { success: false });

    println!("✓ Stuck box terminates with reward {}", outcome.reward);
}

#[test]
fn test_failure_overrides_match_bonus() {
    let config = config_with_threshold(0.25);
    let mut scene = Scene::new(
        Vec3::new(0.0, 0.0, -3.0),
        &[Vec3::ZERO, Vec3::new(5.0, 0.0, 5.0)],
        &[Vec3::new(0.1, 0.0, 0.0), Vec3::new(-5.0, 0.0, -5.0)],
    )
    .unwrap();
    let mut controller = EpisodeController::new(&config, &scene).unwrap();

    let outcome = controller.step(&mut scene, &walled);
    assert_eq!(outcome.matches.len(), 1, "match is still recorded");
    assert_eq!(outcome.failure, Some(FailureCause::StuckBox { box_index: 1 }));
    assert_eq!(outcome.reward, -1.0);
    assert_sums(&outcome);
}

#[test]
fn test_completion_fires_once_after_third_match() {
    println!("\n=== Testing Completion Across Ticks ===");

    let config = config_with_threshold(0.25);
    let goals = [Vec3::new(-4.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 4.0), Vec3::new(4.0, 0.0, 0.0)];
    let mut scene = Scene::new(
        Vec3::ZERO,
        &[Vec3::new(-2.0, 0.0, -2.0), Vec3::new(0.0, 0.0, -2.0), Vec3::new(2.0, 0.0, -2.0)],
        &goals,
    )
    .unwrap();
    let mut controller = EpisodeController::new(&config, &scene).unwrap();

    let mut completions = 0;
    for (tick, goal) in goals.iter().enumerate() {
        scene.boxes_mut()[tick].position = *goal + Vec3::new(0.1, 0.0, 0.0);
        let outcome = controller.step(&mut scene, &open);
        assert_sums(&outcome);
        assert_eq!(outcome.matches.len(), 1, "tick {tick}");
        if outcome.breakdown.completion > 0.0 {
            completions += 1;
        }
        if tick < 2 {
            assert!(!outcome.terminal, "tick {tick} must not terminate");
        } else {
            assert!(outcome.terminal && outcome.success);
            assert_eq!(outcome.breakdown.completion, 2.0);
            assert!(outcome.reward > 2.9);
        }
    }
    assert_eq!(completions, 1);

    // Terminated: nothing fires again
    let after = controller.step(&mut scene, &open);
    assert!(after.terminal && after.success);
    assert_eq!(after.reward, 0.0);
    assert!(after.matches.is_empty());
    assert_eq!(controller.matched_count(), 3);

    println!("✓ Completion fired exactly once");
}

#[test]
fn test_matches_are_monotonic() {
    let config = config_with_threshold(0.25);
    let mut scene = Scene::new(
        Vec3::ZERO,
        &[Vec3::new(1.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 3.0)],
        &[Vec3::new(1.1, 0.0, 0.0), Vec3::new(-3.0, 0.0, -3.0)],
    )
    .unwrap();
    let mut controller = EpisodeController::new(&config, &scene).unwrap();

    controller.step(&mut scene, &open);
    let first = controller.matched_pairs().to_vec();
    assert_eq!(first.len(), 1);

    // Moving the matched box away or another box onto the taken goal changes nothing
    scene.boxes_mut()[0].position = Vec3::new(8.0, 0.0, 8.0);
    scene.boxes_mut()[1].position = Vec3::new(1.1, 0.0, 0.0);
    for _ in 0..3 {
        let outcome = controller.step(&mut scene, &open);
        assert!(outcome.matches.is_empty());
        assert!(!outcome.terminal);
    }
    assert_eq!(controller.matched_pairs(), first.as_slice());
    assert!(scene.boxes()[0].matched);
}

#[test]
fn test_completion_wins_over_leftover_stuck_box() {
    let config = config_with_threshold(0.25);
    let mut scene = Scene::new(
        Vec3::ZERO,
        &[Vec3::new(1.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 5.0)],
        &[Vec3::new(1.0, 0.0, 0.1)],
    )
    .unwrap();
    let mut controller = EpisodeController::new(&config, &scene).unwrap();

    let outcome = controller.step(&mut scene, &walled);
    assert!(outcome.terminal && outcome.success);
    assert_eq!(outcome.failure, None);
    assert_eq!(outcome.breakdown.completion, 2.0);
}

#[test]
fn test_progress_rewards_only_improvement_by_default() {
    let config = PuzzleConfig::default();
    let mut scene = Scene::new(Vec3::new(0.0, 0.0, -50.0), &[Vec3::ZERO], &[Vec3::new(4.0, 0.0, 0.0)]).unwrap();
    let mut controller = EpisodeController::new(&config, &scene).unwrap();

    let still = controller.step(&mut scene, &open);
    assert_eq!(still.breakdown.progress, 0.0);
    assert_eq!(still.breakdown.proximity, 0.0, "agent is beyond room scale");
    assert!((still.reward - config.reward.step_penalty).abs() < 1e-7);

    scene.boxes_mut()[0].position = Vec3::new(1.0, 0.0, 0.0);
    let closer = controller.step(&mut scene, &open);
    assert!((closer.breakdown.progress - 0.1).abs() < 1e-6);
    assert!((controller.state().last_total_distance() - 3.0).abs() < 1e-6);

    scene.boxes_mut()[0].position = Vec3::ZERO;
    let away = controller.step(&mut scene, &open);
    assert_eq!(away.breakdown.progress, 0.0);
}

#[test]
fn test_progress_penalizes_regression_when_configured() {
    let mut config = PuzzleConfig::default();
    config.reward.progress = ProgressPolicy::PenalizeRegression { penalty: -0.05 };
    let mut scene = Scene::new(Vec3::new(0.0, 0.0, -50.0), &[Vec3::ZERO], &[Vec3::new(4.0, 0.0, 0.0)]).unwrap();
    let mut controller = EpisodeController::new(&config, &scene).unwrap();

    scene.boxes_mut()[0].position = Vec3::new(-1.0, 0.0, 0.0);
    let away = controller.step(&mut scene, &open);
    assert_eq!(away.breakdown.progress, -0.05);
    assert_sums(&away);
}

#[test]
fn test_goal_disappearing_is_not_regression() {
    let mut config = config_with_threshold(0.25);
    config.reward.progress = ProgressPolicy::PenalizeRegression { penalty: -0.05 };
    // Box 1 is nearest to goal 0, which box 0 takes this tick
    let mut scene = Scene::new(
        Vec3::new(0.0, 0.0, -50.0),
        &[Vec3::new(0.1, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)],
        &[Vec3::ZERO, Vec3::new(6.0, 0.0, 0.0)],
    )
    .unwrap();
    let mut controller = EpisodeController::new(&config, &scene).unwrap();

    let outcome = controller.step(&mut scene, &open);
    assert_eq!(outcome.matches.len(), 1);

    let next = controller.step(&mut scene, &open);
    assert_eq!(next.breakdown.progress, 0.0);
}

#[test]
fn test_proximity_targets_nearest_unmatched_box() {
    let config = config_with_threshold(0.25);
    let mut scene = Scene::new(
        Vec3::ZERO,
        &[Vec3::new(1.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0)],
        &[Vec3::new(1.0, 0.0, 0.1), Vec3::new(-8.0, 0.0, 0.0)],
    )
    .unwrap();
    let mut controller = EpisodeController::new(&config, &scene).unwrap();

    let first = controller.step(&mut scene, &open);
    assert!((first.breakdown.proximity - 0.0009).abs() < 1e-7);

    // Box 0 is matched now, so the agent is measured against box 1
    let second = controller.step(&mut scene, &open);
    assert!((second.breakdown.proximity - 0.0005).abs() < 1e-7);
}

#[test]
fn test_greedy_assignment_from_config() {
    let mut config = config_with_threshold(0.5);
    config.matching.assignment = Assignment::GreedyNearest;
    let mut scene = Scene::new(
        Vec3::new(0.0, 0.0, -5.0),
        &[Vec3::new(0.45, 0.0, 0.0), Vec3::ZERO, Vec3::new(9.0, 0.0, 9.0)],
        &[Vec3::ZERO, Vec3::new(0.8, 0.0, 0.0), Vec3::new(-9.0, 0.0, -9.0)],
    )
    .unwrap();
    let mut controller = EpisodeController::new(&config, &scene).unwrap();

    let outcome = controller.step(&mut scene, &open);
    assert_eq!(
        outcome.matches,
        vec![
            MatchedPair { box_index: 1, goal_index: 0 },
            MatchedPair { box_index: 0, goal_index: 1 },
        ]
    );
    assert_eq!(outcome.breakdown.matching, 2.0);
}

#[test]
fn test_disabled_stuck_check_and_fall_height() {
    let mut config = PuzzleConfig::default();
    config.stuck.enabled = false;
    let mut scene = Scene::new(Vec3::new(0.0, 7.8, 0.0), &[Vec3::new(3.0, 7.5, 0.0)], &[Vec3::new(-3.0, 6.77, 0.0)]).unwrap();
    let mut controller = EpisodeController::new(&config, &scene).unwrap();
    assert!(!controller.step(&mut scene, &walled).terminal);

    config.stuck.fall_height = Some(5.0);
    let mut controller = EpisodeController::new(&config, &scene).unwrap();
    assert!(!controller.step(&mut scene, &open).terminal);
    scene.agent.position.y = 4.0;
    let fell = controller.step(&mut scene, &open);
    assert!(fell.terminal && !fell.success);
    assert_eq!(fell.failure, Some(FailureCause::AgentFell));
    assert_eq!(fell.reward, -1.0);
}

#[test]
fn test_reset_after_termination_runs_again() {
    let config = PuzzleConfig::default();
    let mut scene = Scene::new(Vec3::ZERO, &[Vec3::ZERO], &[Vec3::new(5.0, 0.0, 0.0)]).unwrap();
    let mut controller = EpisodeController::new(&config, &scene).unwrap();
    assert!(controller.step(&mut scene, &walled).terminal);

    controller.reset(&mut scene, &[Vec3::new(1.0, 0.0, 1.0)], &[Vec3::new(4.0, 0.0, 4.0)]).unwrap();
    assert!(controller.is_running());
    let outcome = controller.step(&mut scene, &open);
    assert!(!outcome.terminal);
    assert_sums(&outcome);
}
