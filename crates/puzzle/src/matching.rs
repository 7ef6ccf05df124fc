//! Box-to-goal pairing.

use physics::Vec3;

use crate::config::Assignment;
use crate::scene::{Goal, PuzzleBox};

/// Pairs `(box index, goal index)` that come within `threshold` this tick.
///
/// Already-matched boxes and goals are skipped, and each pick removes both
/// sides from further consideration, so a box never takes two goals and a
/// goal never takes two boxes. Distances are measured in the ground plane.
#[must_use]
pub fn find_matches(
    boxes: &[PuzzleBox],
    goals: &[Goal],
    threshold: f32,
    assignment: Assignment,
) -> Vec<(usize, usize)> {
    match assignment {
        Assignment::ScanOrder => scan_order(boxes, goals, threshold),
        Assignment::GreedyNearest => greedy_nearest(boxes, goals, threshold),
    }
}

fn scan_order(boxes: &[PuzzleBox], goals: &[Goal], threshold: f32) -> Vec<(usize, usize)> {
    let mut goal_taken: Vec<bool> = goals.iter().map(|g| g.matched).collect();
    let mut pairs = Vec::new();

    for (bi, b) in boxes.iter().enumerate().filter(|(_, b)| b.is_active()) {
        let hit = goals.iter().enumerate().position(|(gi, g)| {
            !goal_taken[gi] && b.position.planar_distance(g.position) < threshold
        });
        if let Some(gi) = hit {
            goal_taken[gi] = true;
            pairs.push((bi, gi));
        }
    }
    pairs
}

fn greedy_nearest(boxes: &[PuzzleBox], goals: &[Goal], threshold: f32) -> Vec<(usize, usize)> {
    let mut candidates: Vec<(f32, usize, usize)> = Vec::new();
    for (bi, b) in boxes.iter().enumerate().filter(|(_, b)| b.is_active()) {
        for (gi, g) in goals.iter().enumerate().filter(|(_, g)| g.is_active()) {
            let d = b.position.planar_distance(g.position);
            if d < threshold {
                candidates.push((d, bi, gi));
            }
        }
    }
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    let mut box_taken = vec![false; boxes.len()];
    let mut goal_taken = vec![false; goals.len()];
    let mut pairs = Vec::new();
    for (_, bi, gi) in candidates {
        if box_taken[bi] || goal_taken[gi] {
            continue;
        }
        box_taken[bi] = true;
        goal_taken[gi] = true;
        pairs.push((bi, gi));
    }
    pairs
}

/// Index of and 3D distance to the closest unmatched goal.
#[must_use]
pub fn nearest_unmatched_goal(position: Vec3, goals: &[Goal]) -> Option<(usize, f32)> {
    goals
        .iter()
        .enumerate()
        .filter(|(_, g)| g.is_active())
        .map(|(i, g)| (i, position.distance(g.position)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// 3D distance from `position` to the closest unmatched box.
#[must_use]
pub fn nearest_unmatched_box(position: Vec3, boxes: &[PuzzleBox]) -> Option<f32> {
    boxes
        .iter()
        .filter(|b| b.is_active())
        .map(|b| position.distance(b.position))
        .min_by(f32::total_cmp)
}
