//! Process runner.
//!
//! Spawns the external runtime on a synthesized program file, captures
//! stdout/stderr incrementally, and enforces the optional wall-clock
//! bound by forced termination. The child has no stdin; everything it
//! needs is already on disk in the scratch directory.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use crate::error::ExecError;
use crate::BridgeConfig;

/// Raw observation of one finished (or killed) child process.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Complete stdout captured from the process.
    pub stdout: String,
    /// Complete stderr captured from the process.
    pub stderr: String,
    /// Process exit code (`-1` if terminated by a signal).
    pub exit_code: i32,
    /// Termination signal, if the process was killed by one.
    pub signal: Option<i32>,
}

/// Spawn the configured runtime with `program` as its single argument
/// and wait for it to finish, killing it if `timeout` expires first.
///
/// A `timeout` of `None` means unbounded; callers filter out zero
/// durations before reaching here. Output streams are drained in
/// spawned tasks, capped at the configured byte limit, so reads never
/// block exit detection.
pub async fn run_program(
    config: &BridgeConfig,
    program: &Path,
    timeout: Option<Duration>,
) -> Result<RunOutput, ExecError> {
    let mut cmd = Command::new(&config.runtime_bin);
    cmd.arg(program)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Environment is inherited; the module search path is the only
    // augmentation.
    if let Some(path) = &config.module_path {
        cmd.env("NODE_PATH", path);
    }

    let mut child = cmd.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ExecError::RuntimeMissing(config.runtime_bin.clone())
        } else {
            ExecError::Io(e)
        }
    })?;

    let cap = config.max_output_bytes;
    let stdout_handle = child.stdout.take();
    let stderr_handle = child.stderr.take();
    let stdout_task = tokio::spawn(async move { read_stream(stdout_handle, cap).await });
    let stderr_task = tokio::spawn(async move { read_stream(stderr_handle, cap).await });

    let status = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(waited) => waited?,
            Err(_elapsed) => {
                // The child cannot be asked to stop cooperatively.
                // Kill it outright and reap the real exit status so the
                // caller can classify the termination signal.
                tracing::warn!(limit = ?limit, "Execution timed out, killing child process");
                let _ = child.start_kill();
                child.wait().await?
            }
        },
        None => child.wait().await?,
    };

    let stdout_bytes = stdout_task.await.unwrap_or_default();
    let stderr_bytes = stderr_task.await.unwrap_or_default();

    Ok(RunOutput {
        stdout: String::from_utf8_lossy(&stdout_bytes).into_owned(),
        stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
        exit_code: status.code().unwrap_or(-1),
        signal: termination_signal(&status),
    })
}

#[cfg(unix)]
fn termination_signal(status: &std::process::ExitStatus) -> Option<i32> {
    std::os::unix::process::ExitStatusExt::signal(status)
}

#[cfg(not(unix))]
fn termination_signal(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}

/// Read an entire output stream into a byte buffer, capped at `cap`.
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>, cap: usize) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        let _ = (&mut h).take(cap as u64).read_to_end(&mut buf).await;
    }
    buf
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    /// Config pointing at bash so runner mechanics can be exercised
    /// without the real JavaScript runtime installed.
    fn bash_config() -> BridgeConfig {
        BridgeConfig {
            runtime_bin: "bash".to_string(),
            ..BridgeConfig::default()
        }
    }

    /// Write a temporary shell script standing in for a program file.
    fn write_temp_program(body: &str) -> tempfile::NamedTempFile {
        use std::io::Write;
        let mut f = tempfile::Builder::new()
            .suffix(".sh")
            .tempfile()
            .expect("create temp file");
        writeln!(f, "#!/bin/bash").expect("write shebang");
        write!(f, "{body}").expect("write body");
        f
    }

    #[tokio::test]
    async fn captures_streams_and_exit_code() {
        let program = write_temp_program("echo out-line\necho err-line >&2\n");
        let run = run_program(&bash_config(), program.path(), None)
            .await
            .expect("run");
        assert_eq!(run.exit_code, 0);
        assert!(run.signal.is_none());
        assert!(run.stdout.contains("out-line"));
        assert!(run.stderr.contains("err-line"));
    }

    #[tokio::test]
    async fn reports_nonzero_exit() {
        let program = write_temp_program("exit 42\n");
        let run = run_program(&bash_config(), program.path(), None)
            .await
            .expect("run");
        assert_eq!(run.exit_code, 42);
        assert!(run.signal.is_none());
    }

    #[tokio::test]
    async fn timeout_kills_and_reports_signal() {
        let program = write_temp_program("sleep 10\n");
        let run = run_program(
            &bash_config(),
            program.path(),
            Some(Duration::from_millis(200)),
        )
        .await
        .expect("run");
        assert_eq!(run.signal, Some(libc::SIGKILL));
        assert_eq!(run.exit_code, -1);
    }

    #[tokio::test]
    async fn fast_process_beats_generous_timeout() {
        let program = write_temp_program("echo quick\n");
        let run = run_program(
            &bash_config(),
            program.path(),
            Some(Duration::from_secs(30)),
        )
        .await
        .expect("run");
        assert_eq!(run.exit_code, 0);
        assert!(run.stdout.contains("quick"));
    }

    #[tokio::test]
    async fn missing_runtime_is_classified() {
        let config = BridgeConfig {
            runtime_bin: "outboard-no-such-runtime".to_string(),
            ..BridgeConfig::default()
        };
        let program = write_temp_program("true\n");
        let err = run_program(&config, program.path(), None)
            .await
            .expect_err("spawn should fail");
        assert_matches!(err, ExecError::RuntimeMissing(bin) if bin == "outboard-no-such-runtime");
    }
}
