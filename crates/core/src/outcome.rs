// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Classified execution outcomes.
//!
//! Every run — bounded or detached — resolves to exactly one [`ExecOutcome`].
//! Process-level failures travel as data here, never as errors: the caller
//! has no actionable recovery beyond reading the classification and the
//! captured output tails.

use serde::{Deserialize, Serialize};

/// Outcome category assigned to one execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Bounded run exited with code 0 inside its budget.
    Succeeded,
    /// Bounded run exited non-zero inside its budget.
    FailedExit,
    /// Bounded run exceeded its budget; the child was killed.
    TimedOut,
    /// Detached child died before the observation window elapsed.
    EarlyExit,
    /// Detached child produced recognizable startup output; registered.
    StartupConfirmed,
    /// Detached child is alive but produced no recognizable startup output.
    /// Left running, deliberately unregistered.
    StartupUnconfirmed,
    /// The child could not be spawned at all.
    SpawnError,
}

crate::simple_display! {
    Classification {
        Succeeded => "succeeded",
        FailedExit => "failed_exit",
        TimedOut => "timed_out",
        EarlyExit => "early_exit",
        StartupConfirmed => "startup_confirmed",
        StartupUnconfirmed => "startup_unconfirmed",
        SpawnError => "spawn_error",
    }
}

/// Result of one execution attempt, forwarded unmodified to the dispatch
/// layer's own caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecOutcome {
    pub classification: Classification,
    /// Exit code, when the child exited and reported one.
    pub exit_code: Option<i32>,
    /// Terminating signal number, when the child was signal-killed.
    pub signal: Option<i32>,
    /// Fixed-length trailing portion of captured stdout.
    pub stdout_tail: String,
    /// Fixed-length trailing portion of captured stderr.
    pub stderr_tail: String,
    /// Bound network port detected in startup output (detached runs only).
    pub port: Option<String>,
    /// OS process id, when a child was spawned.
    pub pid: Option<u32>,
    /// Human-readable diagnostic note.
    pub note: String,
}

impl ExecOutcome {
    fn bare(classification: Classification, note: impl Into<String>) -> Self {
        Self {
            classification,
            exit_code: None,
            signal: None,
            stdout_tail: String::new(),
            stderr_tail: String::new(),
            port: None,
            pid: None,
            note: note.into(),
        }
    }

    /// The child could not be spawned; carries the OS error message.
    pub fn spawn_error(message: impl Into<String>) -> Self {
        Self::bare(Classification::SpawnError, message)
    }

    pub fn succeeded(note: impl Into<String>) -> Self {
        Self::bare(Classification::Succeeded, note)
    }

    pub fn failed_exit(note: impl Into<String>) -> Self {
        Self::bare(Classification::FailedExit, note)
    }

    pub fn timed_out(note: impl Into<String>) -> Self {
        Self::bare(Classification::TimedOut, note)
    }

    pub fn early_exit(note: impl Into<String>) -> Self {
        Self::bare(Classification::EarlyExit, note)
    }

    pub fn startup_confirmed(note: impl Into<String>) -> Self {
        Self::bare(Classification::StartupConfirmed, note)
    }

    pub fn startup_unconfirmed(note: impl Into<String>) -> Self {
        Self::bare(Classification::StartupUnconfirmed, note)
    }

    pub fn exit_code(mut self, code: Option<i32>) -> Self {
        self.exit_code = code;
        self
    }

    pub fn signal(mut self, signal: Option<i32>) -> Self {
        self.signal = signal;
        self
    }

    pub fn stdout_tail(mut self, tail: impl Into<String>) -> Self {
        self.stdout_tail = tail.into();
        self
    }

    pub fn stderr_tail(mut self, tail: impl Into<String>) -> Self {
        self.stderr_tail = tail.into();
        self
    }

    pub fn port(mut self, port: Option<String>) -> Self {
        self.port = port;
        self
    }

    pub fn pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    /// True exactly for the two healthy classifications.
    pub fn success(&self) -> bool {
        matches!(
            self.classification,
            Classification::Succeeded | Classification::StartupConfirmed
        )
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
