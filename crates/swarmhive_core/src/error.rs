//! Error types for swarmhive_core.
//!
//! Geometric edge cases (zero-length directions, degenerate random ranges)
//! are not errors; they are absorbed inline with neutral values. What remains
//! here are construction-time rejections and faults that abort a run.

use swarmhive_data::EntityId;
use thiserror::Error;

/// Main error type for engine operations.
#[derive(Error, Debug)]
pub enum SimError {
    /// A queen descriptor names a worker behavior the engine does not know.
    #[error("Unknown worker behavior: {0}")]
    UnknownWorkerBehavior(String),

    /// An AdvancedWorker descriptor without a shouting radius.
    #[error("AdvancedWorker requires a shouting_radius")]
    MissingShoutingRadius,

    /// An id that should resolve in the registry did not.
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// Configuration rejected by the engine.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The scene loop thread panicked.
    #[error("Scene loop panicked: {0}")]
    LoopPanicked(String),

    /// The OS refused to start the scene loop thread.
    #[error("Failed to spawn scene loop: {0}")]
    SpawnFailed(#[from] std::io::Error),

    /// The registry views disagree with each other.
    #[error("Registry inconsistency: {0}")]
    Inconsistent(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<SimError>,
    },
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Creates a new inconsistency error.
    #[must_use]
    pub fn inconsistent<S: Into<String>>(msg: S) -> Self {
        Self::Inconsistent(msg.into())
    }

    /// Wraps an error with additional context.
    #[must_use]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}
