//! Engine error types

use thiserror::Error;

/// Errors surfaced by the playback engine and its collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Attempted to load a sequence with zero steps
    #[error("sequence has no steps, playback cannot start")]
    EmptySequence,

    /// Step lookup outside `[0, len)`
    #[error("step index {index} out of range for sequence of {len} steps")]
    IndexOutOfRange { index: usize, len: usize },

    /// The algorithm-execution service could not produce a sequence
    #[error("run request failed: {0}")]
    RunRequestFailed(String),

    /// The playback driver is no longer running
    #[error("playback driver has shut down")]
    PlayerClosed,
}

impl EngineError {
    /// Build a `RunRequestFailed` from any displayable cause.
    pub fn run_failed(cause: impl std::fmt::Display) -> Self {
        Self::RunRequestFailed(cause.to_string())
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
