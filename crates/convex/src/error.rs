//! Error types for hull construction, simplification, and persistence.
//!
//! A failed build or removal never hands back partial data: callers see one
//! of these variants and decide whether to fall back (e.g. to an AABB).

use thiserror::Error;

/// Errors raised by the convex kernel.
#[derive(Debug, Error)]
pub enum ConvexError {
    /// Not enough distinct input points to span a face.
    #[error("too few points: {found} distinct (need at least {needed})")]
    TooFewPoints { found: usize, needed: usize },

    /// Degenerate input; the retry schedule was exhausted.
    #[error("degenerate input: {reason}")]
    Degenerate { reason: String },

    /// Topological inconsistency while removing a face.
    #[error("topology error: {reason}")]
    Topology { reason: String },

    /// Requested face count lies outside the recorded history.
    #[error("face count {requested} outside [{min}, {max}]")]
    FaceCount {
        requested: usize,
        min: usize,
        max: usize,
    },

    /// Underlying reader/writer failure.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed binary payload.
    #[error("bad format: {reason}")]
    Format { reason: String },
}

impl ConvexError {
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::Degenerate {
            reason: reason.into(),
        }
    }

    pub fn topology(reason: impl Into<String>) -> Self {
        Self::Topology {
            reason: reason.into(),
        }
    }

    pub fn format(reason: impl Into<String>) -> Self {
        Self::Format {
            reason: reason.into(),
        }
    }
}

/// Kernel result alias.
pub type Result<T> = std::result::Result<T, ConvexError>;
