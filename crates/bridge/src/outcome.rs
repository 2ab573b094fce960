//! Result normalizer for the process boundary.
//!
//! Turns a raw [`RunOutput`] plus the result file into the invocation's
//! single terminal outcome: the ordered item sequence with captured
//! diagnostic text, or one classified failure. Timeout kills are told
//! apart from ordinary non-zero exits by the termination signal.

use std::path::Path;
use std::time::Duration;

use outboard_core::Item;

use crate::error::ExecError;
use crate::runner::RunOutput;
use crate::ExecOutput;

/// Classify the finished run.
///
/// `timeout` is the effective (non-zero) bound that was enforced, if
/// any; it decides whether a SIGKILL termination reads as a timeout.
pub async fn interpret(
    run: RunOutput,
    timeout: Option<Duration>,
    result_path: &Path,
) -> Result<ExecOutput, ExecError> {
    if run.exit_code == 0 && run.signal.is_none() {
        let bytes = match tokio::fs::read(result_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(error = %e, "Result file unreadable");
                return Err(ExecError::NoOutput { stderr: run.stderr });
            }
        };
        return match serde_json::from_slice::<Vec<Item>>(&bytes) {
            Ok(items) => Ok(ExecOutput {
                items,
                stdout: run.stdout,
            }),
            Err(e) => {
                tracing::debug!(error = %e, "Result file unparseable");
                Err(ExecError::NoOutput { stderr: run.stderr })
            }
        };
    }

    if let (Some(signal), Some(limit)) = (run.signal, timeout) {
        if signal == libc::SIGKILL {
            return Err(ExecError::Timeout { limit });
        }
    }

    Err(ExecError::ExecutionFailed {
        exit_code: run.exit_code,
        stderr: run.stderr,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
