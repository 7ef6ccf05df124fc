//! Per-tick value snapshot of every body the puzzle logic looks at.
//!
//! The harness copies positions and velocities in from its physics provider
//! before each step and copies snapped boxes back out afterwards. List
//! lengths are fixed when the scene is built.

use physics::Vec3;

use crate::error::PuzzleError;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Agent {
    pub position: Vec3,
    pub velocity: Vec3,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PuzzleBox {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Set once the box is paired with a goal; never cleared until reset
    pub matched: bool,
}

impl PuzzleBox {
    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self { position, ..Self::default() }
    }

    /// Matched boxes are deactivated.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.matched
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Goal {
    pub position: Vec3,
    pub matched: bool,
}

impl Goal {
    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self { position, matched: false }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.matched
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub agent: Agent,
    boxes: Vec<PuzzleBox>,
    goals: Vec<Goal>,
}

impl Scene {
    /// Build a scene with everything at rest and unmatched.
    ///
    /// # Errors
    ///
    /// Returns an error if either list is empty.
    pub fn new(agent: Vec3, boxes: &[Vec3], goals: &[Vec3]) -> Result<Self, PuzzleError> {
        if boxes.is_empty() {
            return Err(PuzzleError::NoBoxes);
        }
        if goals.is_empty() {
            return Err(PuzzleError::NoGoals);
        }
        Ok(Self {
            agent: Agent { position: agent, velocity: Vec3::ZERO },
            boxes: boxes.iter().copied().map(PuzzleBox::at).collect(),
            goals: goals.iter().copied().map(Goal::at).collect(),
        })
    }

    #[must_use]
    pub fn boxes(&self) -> &[PuzzleBox] {
        &self.boxes
    }

    pub fn boxes_mut(&mut self) -> &mut [PuzzleBox] {
        &mut self.boxes
    }

    #[must_use]
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn goals_mut(&mut self) -> &mut [Goal] {
        &mut self.goals
    }

    /// Number of matches that completes the puzzle.
    #[must_use]
    pub fn required_matches(&self) -> usize {
        self.boxes.len().min(self.goals.len())
    }

    /// Move every box and goal to a fresh position, clear velocities and
    /// matched flags.
    pub(crate) fn reposition(&mut self, boxes: &[Vec3], goals: &[Vec3]) -> Result<(), PuzzleError> {
        if boxes.len() != self.boxes.len() {
            return Err(PuzzleError::PlacementMismatch {
                kind: "box",
                expected: self.boxes.len(),
                actual: boxes.len(),
            });
        }
        if goals.len() != self.goals.len() {
            return Err(PuzzleError::PlacementMismatch {
                kind: "goal",
                expected: self.goals.len(),
                actual: goals.len(),
            });
        }
        for (b, &p) in self.boxes.iter_mut().zip(boxes) {
            *b = PuzzleBox::at(p);
        }
        for (g, &p) in self.goals.iter_mut().zip(goals) {
            *g = Goal::at(p);
        }
        Ok(())
    }
}
