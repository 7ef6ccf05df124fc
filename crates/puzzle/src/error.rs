use physics::PhysicsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("a puzzle needs at least one box")]
    NoBoxes,
    #[error("a puzzle needs at least one goal")]
    NoGoals,
    #[error("expected {expected} {kind} positions, got {actual}")]
    PlacementMismatch {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("expected {expected} action values, got {actual}")]
    ActionSize { expected: usize, actual: usize },
    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

impl PuzzleError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig { field, reason: reason.into() }
    }
}
