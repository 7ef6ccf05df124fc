use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PhysicsError {
    #[error("half extents must be positive, got {0:?}")]
    InvalidExtents([f32; 3]),
    #[error("agent radius must be positive, got {0}")]
    InvalidRadius(f32),
    #[error("time step must be positive, got {0}")]
    InvalidTimeStep(f32),
    #[error("box index {index} out of range ({len} boxes)")]
    BoxIndexOutOfRange { index: usize, len: usize },
}
