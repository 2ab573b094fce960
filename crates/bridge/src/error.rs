//! Error taxonomy for one bridge invocation.
//!
//! Every invocation resolves to exactly one terminal outcome: a success
//! value or one of these errors. The bridge never retries — user code
//! may have side effects, and a retry could duplicate them. Resolution
//! skips (unresolvable static references) are deliberately *not* errors;
//! they surface later inside the generated program if the reference is
//! actually used.

use std::time::Duration;

/// Error type for a bridge invocation.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The external runtime binary was not found on the search path.
    #[error("runtime binary not found on PATH: {0}")]
    RuntimeMissing(String),

    /// The process exceeded its wall-clock bound and was killed.
    #[error("execution timed out after {limit:?}")]
    Timeout {
        /// The configured bound.
        limit: Duration,
    },

    /// The process exited non-zero for any other reason (syntax error,
    /// thrown exception, explicit non-zero exit).
    #[error("execution failed (exit code {exit_code}): {stderr}")]
    ExecutionFailed { exit_code: i32, stderr: String },

    /// The process exited 0 but produced no parseable result file.
    #[error("no output produced: {stderr}")]
    NoOutput { stderr: String },

    /// I/O failure while preparing scratch storage or spawning.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure serializing the context bundle or input items.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure reported by the host's expression engine.
///
/// Consumed silently by the static resolver (the literal is skipped);
/// never propagated out of an invocation.
#[derive(Debug, thiserror::Error)]
#[error("expression evaluation failed: {0}")]
pub struct ExpressionError(pub String);

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
