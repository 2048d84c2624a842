//! Error types for field builds, path walks and cache construction.
use bevy::math::IVec2;
use thiserror::Error;

/// Why a flow field build produced no field.
///
/// These never leave a build task; they are logged and the target's registry slot is cleared.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("target {0} is outside the grid")]
    OutOfBounds(IVec2),
    #[error("target {0} is not walkable")]
    Unwalkable(IVec2),
    #[error("target {0} has no walkable neighbors")]
    Isolated(IVec2),
    #[error("build for target {0} was cancelled")]
    Cancelled(IVec2),
    #[error("build for target {target} panicked: {message}")]
    Panicked { target: IVec2, message: String },
}

/// Why a path could not be read from a flow field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("no completed flow field for target {0}")]
    NotReady(IVec2),
    #[error("start {0} is outside the grid")]
    StartOutOfBounds(IVec2),
    #[error("start {0} cannot reach the target")]
    StartUnreachable(IVec2),
    #[error("walk hit a dead end at {0}")]
    DeadEnd(IVec2),
    #[error("walk left the grid at {0}")]
    LeftGrid(IVec2),
    #[error("walk did not reach the target within {0} steps")]
    StepBudgetExceeded(usize),
}

/// Errors raised while constructing a [`crate::cache::FlowFieldCache`].
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to start the flow field build pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
