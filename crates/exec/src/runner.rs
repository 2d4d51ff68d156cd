// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded synchronous command execution.
//!
//! Spawns a child, waits up to the timeout for natural exit, and classifies
//! the result. A timed-out child is killed and reaped — never left running.
//! Spawn failures surface as data; for a validated request this never raises.

use crate::env;
use drover_core::{ExecOutcome, ObservationBuffer};
use parking_lot::Mutex;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// How long to wait for pipe readers to flush once the child is gone.
/// Bounded so a grandchild holding the pipe open cannot stall the result.
const FLUSH_TIMEOUT: Duration = Duration::from_millis(250);

/// Runs a command to completion or timeout inside a workspace.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    timeout: Duration,
    tail_bytes: usize,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self { timeout: env::command_timeout(), tail_bytes: env::tail_bytes() }
    }
}

impl CommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run `program args..` in `workdir`, bounded by `timeout` (falling back
    /// to the runner's default). Always returns an outcome.
    pub async fn execute(
        &self,
        workdir: &Path,
        program: &str,
        args: &[String],
        timeout: Option<Duration>,
    ) -> ExecOutcome {
        let limit = timeout.unwrap_or(self.timeout);

        let mut cmd = Command::new(program);
        apply_common_env(&mut cmd);
        cmd.args(args)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(program, workdir = %workdir.display(), error = %e, "spawn failed");
                return ExecOutcome::spawn_error(format!("failed to spawn {program}: {e}"));
            }
        };
        let pid = child.id();

        // Drain both pipes concurrently so a chatty child cannot block on a
        // full pipe while we wait for it. Capture is bounded during
        // accumulation; only tails are reported.
        let cap = env::capture_cap_bytes();
        let stdout_buf = Arc::new(Mutex::new(ObservationBuffer::new(cap)));
        let stderr_buf = Arc::new(Mutex::new(ObservationBuffer::new(cap)));
        let stdout_task = capture(child.stdout.take(), stdout_buf.clone());
        let stderr_task = capture(child.stderr.take(), stderr_buf.clone());

        let waited = tokio::time::timeout(limit, child.wait()).await;

        let outcome = match waited {
            Ok(Ok(status)) => {
                flush(stdout_task, stderr_task).await;
                let code = status.code();
                let signal = unix_signal(&status);
                if status.success() {
                    ExecOutcome::succeeded("exited with code 0")
                } else {
                    ExecOutcome::failed_exit(match (code, signal) {
                        (Some(c), _) => format!("exited with code {c}"),
                        (None, Some(s)) => format!("killed by signal {s}"),
                        (None, None) => "exited abnormally".to_string(),
                    })
                }
                .exit_code(code)
                .signal(signal)
            }
            Ok(Err(e)) => ExecOutcome::spawn_error(format!("failed waiting on {program}: {e}")),
            Err(_) => {
                // Timed out: the result is TimedOut regardless of any
                // eventual exit code. Kill and reap before returning.
                let _ = child.start_kill();
                let _ = child.wait().await;
                flush(stdout_task, stderr_task).await;
                tracing::warn!(
                    program,
                    workdir = %workdir.display(),
                    timeout_ms = limit.as_millis() as u64,
                    "command timed out; child killed"
                );
                ExecOutcome::timed_out(format!(
                    "timed out after {}ms; process killed",
                    limit.as_millis()
                ))
            }
        };

        let outcome = outcome
            .stdout_tail(stdout_buf.lock().tail(self.tail_bytes))
            .stderr_tail(stderr_buf.lock().tail(self.tail_bytes));
        match pid {
            Some(pid) => outcome.pid(pid),
            None => outcome,
        }
    }
}

/// Disable ANSI color in the inherited environment so text classification
/// and captured tails stay deterministic.
pub(crate) fn apply_common_env(cmd: &mut Command) {
    cmd.env("NO_COLOR", "1").env("CLICOLOR", "0").env("FORCE_COLOR", "0");
}

/// Feed a pipe into a shared bounded buffer as data arrives.
pub(crate) fn capture(
    pipe: Option<impl tokio::io::AsyncRead + Unpin + Send + 'static>,
    buffer: Arc<Mutex<ObservationBuffer>>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let Some(mut pipe) = pipe else { return };
        let mut chunk = [0u8; 4096];
        loop {
            match pipe.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let text = String::from_utf8_lossy(&chunk[..n]);
                    buffer.lock().push(&text);
                }
            }
        }
    })
}

/// Wait briefly for the pipe readers to reach EOF so tails cover the last
/// output. Gives up after [`FLUSH_TIMEOUT`] rather than waiting on a
/// grandchild that inherited the pipe.
pub(crate) async fn flush(
    stdout_task: tokio::task::JoinHandle<()>,
    stderr_task: tokio::task::JoinHandle<()>,
) {
    let _ = tokio::time::timeout(FLUSH_TIMEOUT, async {
        let _ = stdout_task.await;
        let _ = stderr_task.await;
    })
    .await;
}

pub(crate) fn unix_signal(status: &std::process::ExitStatus) -> Option<i32> {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        status.signal()
    }
    #[cfg(not(unix))]
    {
        let _ = status;
        None
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
