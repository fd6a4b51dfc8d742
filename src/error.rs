// src/error.rs

use thiserror::Error;

/// Every failure the generation pipeline can report.
#[derive(Debug, Error)]
pub enum MazeError {
    /// The configuration was rejected before anything was mutated.
    #[error("invalid maze configuration: {0}")]
    InvalidConfig(String),

    /// A grid access fell outside the allocated buffer. This is a logic error in the
    /// caller and is never clamped.
    #[error("cell ({x}, {z}) is outside the {width}x{depth} grid")]
    OutOfRange {
        x: usize,
        z: usize,
        width: usize,
        depth: usize,
    },

    /// The scene host refused to create, parent or destroy an object.
    #[error("scene host error: {0}")]
    Host(String),

    /// A cancellation token was tripped while the pass was suspended.
    #[error("maze generation was cancelled")]
    Cancelled,

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl MazeError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        MazeError::InvalidConfig(msg.into())
    }

    pub fn host(msg: impl Into<String>) -> Self {
        MazeError::Host(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, MazeError>;
