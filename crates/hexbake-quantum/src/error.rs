//! Error types for hexbake-quantum.

use thiserror::Error;

use crate::MAX_LOOP_DEPTH;

/// Result type for cursor operations.
pub type Result<T> = std::result::Result<T, QuantumError>;

/// Errors raised while configuring or driving a [`LoopCursor`](crate::LoopCursor).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantumError {
    /// The configured maximum depth is beyond what the cursor supports.
    #[error("max loop depth {0} exceeds supported maximum {MAX_LOOP_DEPTH}")]
    UnsupportedMaxDepth(usize),

    /// A loop nest is deeper than the configured maximum.
    #[error("loop nest of depth {depth} exceeds configured maximum {max}")]
    DepthExceeded { depth: usize, max: usize },

    /// A quantum must be allowed to execute at least one iteration.
    #[error("quantum item limit must be at least 1")]
    ZeroItemLimit,

    /// The saved cursor and the loop nest disagree on the number of levels.
    #[error("cursor for `{stage}` holds {expected} levels, got {actual}")]
    ArityMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A loop level was requested that the cursor does not hold.
    #[error("depth {depth} out of range for `{stage}` with {arity} levels")]
    DepthOutOfRange {
        stage: &'static str,
        depth: usize,
        arity: usize,
    },
}

impl QuantumError {
    /// Whether the error comes from configuration rather than from a
    /// damaged cursor.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedMaxDepth(_) | Self::DepthExceeded { .. } | Self::ZeroItemLimit
        )
    }
}
