use glam::{IVec3, Vec3};

use crate::grid::GridSize;

/// Errors raised by grid construction, frame building, configuration and search
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("gravity direction {direction} has no usable component for a {size} grid")]
    DegenerateDirection { direction: Vec3, size: GridSize },

    #[error(
        "gravity frame covered {covered} of {expected} cells ({duplicates} visited more than once)"
    )]
    IncompleteCover {
        covered: usize,
        expected: usize,
        duplicates: usize,
    },

    #[error("invalid grid size {x}x{y}x{z}")]
    InvalidGridSize { x: i32, y: i32, z: i32 },

    #[error("position {position} is outside the {size} grid")]
    OutOfBounds { position: IVec3, size: GridSize },

    #[error("map line {line}: {reason}")]
    MapParse { line: usize, reason: String },

    #[error("no built-in level {index} (there are {available})")]
    UnknownLevel { index: usize, available: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("snapshot of a {snapshot} grid cannot be restored into a {grid} grid")]
    SnapshotMismatch { snapshot: GridSize, grid: GridSize },

    #[error("search has not been started")]
    SearchNotStarted,
}

pub type SimResult<T> = Result<T, SimError>;
