// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Detached long-running process supervision.
//!
//! `start` retires any prior occupant of the workspace, spawns the child in
//! its own process group, and races a fixed observation window against the
//! child exiting. Resolution is exactly-once: an Observing → Resolved state
//! machine guarded by an atomic test-and-set shared with the exit-watcher
//! task. Whichever event arrives first performs the transition; the second
//! becomes a bookkeeping update, never a second resolution.
//!
//! An unconfirmed startup leaves the process running but unregistered:
//! killing a process that may still be initializing is unsafe, and silently
//! adopting an unrecognized process for later caller-directed termination is
//! equally unsafe.

use crate::registry::{ProcessRecord, ProcessRegistry};
use crate::runner::{apply_common_env, capture, flush, unix_signal};
use crate::terminate::TerminationService;
use crate::{classify, env};
use drover_core::{ExecOutcome, ObservationBuffer};
use parking_lot::Mutex;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::oneshot;

const OBSERVING: u8 = 0;
const RESOLVED: u8 = 1;

/// Spawns commands expected to run indefinitely and classifies their
/// startup from initial output.
#[derive(Debug, Clone)]
pub struct DetachedSupervisor {
    registry: ProcessRegistry,
    terminator: TerminationService,
    window: Duration,
    capture_cap: usize,
    tail_bytes: usize,
}

impl DetachedSupervisor {
    pub fn new(registry: ProcessRegistry) -> Self {
        let terminator = TerminationService::new(registry.clone());
        Self {
            registry,
            terminator,
            window: env::observe_window(),
            capture_cap: env::capture_cap_bytes(),
            tail_bytes: env::tail_bytes(),
        }
    }

    /// Override the observation window (tests use short windows).
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Start a long-running command in `workdir` and classify its startup.
    ///
    /// Resolves exactly once, within the observation window. The workload
    /// itself continues independently after resolution.
    pub async fn start(&self, workdir: &Path, program: &str, args: &[String]) -> ExecOutcome {
        // Preserve the single-occupant invariant before spawning. Signal
        // delivery is asynchronous, so the old and new processes may
        // transiently coexist; identity is tracked by pid.
        self.terminator.retire(workdir);

        let mut cmd = Command::new(program);
        apply_common_env(&mut cmd);
        cmd.args(args)
            .current_dir(workdir)
            .process_group(0)
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
        let Some(pid) = child.id() else {
            return ExecOutcome::spawn_error(format!("{program} exited before observation began"));
        };

        let command_line = command_line(program, args);
        tracing::info!(
            workdir = %workdir.display(),
            command = %command_line,
            pid,
            window_ms = self.window.as_millis() as u64,
            "observing detached process"
        );

        let buffer = Arc::new(Mutex::new(ObservationBuffer::new(self.capture_cap)));
        let stdout_task = capture(child.stdout.take(), buffer.clone());
        let stderr_task = capture(child.stderr.take(), buffer.clone());

        // Exactly-once resolution: the watcher task owns the child; whichever
        // of {exit, window} swaps the state first is the resolver.
        let state = Arc::new(AtomicU8::new(OBSERVING));
        let (exit_tx, mut exit_rx) = oneshot::channel::<std::io::Result<ExitStatus>>();
        {
            let state = state.clone();
            let registry = self.registry.clone();
            let key = workdir.to_path_buf();
            tokio::spawn(async move {
                let status = child.wait().await;
                if state.swap(RESOLVED, Ordering::AcqRel) == OBSERVING {
                    // Exit won the race; hand the status to the resolver.
                    let _ = exit_tx.send(status);
                } else {
                    // Late exit after resolution: bookkeeping only. Clear the
                    // entry unless a newer process has replaced it at this key.
                    if registry.remove_if_pid(&key, pid) {
                        tracing::info!(
                            key = %key.display(),
                            pid,
                            "tracked process exited on its own; entry cleared"
                        );
                    }
                }
            });
        }

        tokio::select! {
            status = &mut exit_rx => {
                self.resolve_early_exit(pid, status.ok(), &buffer, stdout_task, stderr_task).await
            }
            () = tokio::time::sleep(self.window) => {
                if state.swap(RESOLVED, Ordering::AcqRel) == OBSERVING {
                    self.resolve_classification(workdir, pid, &command_line, &buffer)
                } else {
                    // The child exited between the timer firing and our swap;
                    // the watcher already sent the status.
                    let status = exit_rx.try_recv().ok();
                    self.resolve_early_exit(pid, status, &buffer, stdout_task, stderr_task).await
                }
            }
        }
    }

    /// The child died before the window elapsed. Report its output; never
    /// register a record.
    async fn resolve_early_exit(
        &self,
        pid: u32,
        status: Option<std::io::Result<ExitStatus>>,
        buffer: &Arc<Mutex<ObservationBuffer>>,
        stdout_task: tokio::task::JoinHandle<()>,
        stderr_task: tokio::task::JoinHandle<()>,
    ) -> ExecOutcome {
        // Let the pipe readers reach EOF so the tail covers the last words.
        flush(stdout_task, stderr_task).await;

        let (code, signal) = match status {
            Some(Ok(status)) => (status.code(), unix_signal(&status)),
            _ => (None, None),
        };
        let note = match (code, signal) {
            (Some(c), _) => format!("exited with code {c} before the observation window elapsed"),
            (None, Some(s)) => format!("killed by signal {s} before the observation window elapsed"),
            (None, None) => "exited before the observation window elapsed".to_string(),
        };
        tracing::warn!(pid, code = ?code, "detached process exited early");
        ExecOutcome::early_exit(note)
            .exit_code(code)
            .signal(signal)
            .stdout_tail(buffer.lock().tail(self.tail_bytes))
            .pid(pid)
    }

    /// The window elapsed with the child still running. Scan the captured
    /// output; register the process only on a confirmed startup.
    fn resolve_classification(
        &self,
        workdir: &Path,
        pid: u32,
        command_line: &str,
        buffer: &Arc<Mutex<ObservationBuffer>>,
    ) -> ExecOutcome {
        let text = buffer.lock().contents().to_string();
        let phrase_match = classify::startup_confirmed(&text);
        let port = classify::detect_port(&text);

        if phrase_match || port.is_some() {
            self.registry.register(
                workdir,
                ProcessRecord { pid, command: command_line.to_string() },
            );
            tracing::info!(
                workdir = %workdir.display(),
                pid,
                port = ?port,
                "startup confirmed; process registered"
            );
            let note = match &port {
                Some(p) => format!("startup confirmed; listening on port {p}"),
                None => "startup confirmed by readiness output".to_string(),
            };
            ExecOutcome::startup_confirmed(note)
                .port(port)
                .stdout_tail(drover_core::tail(&text, self.tail_bytes))
                .pid(pid)
        } else {
            tracing::warn!(
                workdir = %workdir.display(),
                pid,
                "no readiness signal within the observation window; left running, unregistered"
            );
            ExecOutcome::startup_unconfirmed(format!(
                "no recognizable startup output within {}ms; process {pid} left running but not tracked",
                self.window.as_millis()
            ))
            .stdout_tail(drover_core::tail(&text, self.tail_bytes))
            .pid(pid)
        }
    }
}

fn command_line(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        return program.to_string();
    }
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

#[cfg(test)]
#[path = "supervise_tests.rs"]
mod tests;
