// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Graceful termination of tracked processes.
//!
//! Termination never raises: the caller has no actionable recovery beyond
//! visibility, so every delivery failure is absorbed and logged. The
//! registry entry is removed unconditionally — removal is cleanup, not
//! contingent on signal delivery succeeding.

use crate::registry::ProcessRegistry;
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::path::Path;

/// Looks up and gracefully signals a registered process, always clearing
/// its registry entry.
#[derive(Debug, Clone)]
pub struct TerminationService {
    registry: ProcessRegistry,
}

impl TerminationService {
    pub fn new(registry: ProcessRegistry) -> Self {
        Self { registry }
    }

    /// Retire the current occupant of `key`, if any.
    ///
    /// Absent key → no-op. A "no such process" delivery error means the
    /// process already exited independently and is benign. Returns false
    /// only when a non-absence delivery error occurred — used by
    /// [`Self::bulk_cleanup`] to count entries that could not be confirmed
    /// cleared.
    pub fn retire(&self, key: &Path) -> bool {
        let Some(record) = self.registry.remove(key) else {
            tracing::debug!(key = %key.display(), "retire: no tracked process");
            return true;
        };

        match kill(Pid::from_raw(record.pid as i32), Signal::SIGTERM) {
            Ok(()) => {
                tracing::info!(
                    key = %key.display(),
                    pid = record.pid,
                    command = %record.command,
                    "sent SIGTERM to tracked process"
                );
                true
            }
            Err(Errno::ESRCH) => {
                // Already exited independently.
                tracing::debug!(key = %key.display(), pid = record.pid, "process already gone");
                true
            }
            Err(e) => {
                tracing::warn!(
                    key = %key.display(),
                    pid = record.pid,
                    error = %e,
                    "signal delivery failed"
                );
                false
            }
        }
    }

    /// Retire every registered key. Returns how many could not be confirmed
    /// cleared. Used at process-wide shutdown.
    pub fn bulk_cleanup(&self) -> usize {
        let keys = self.registry.keys();
        let total = keys.len();
        let remaining = keys.iter().filter(|key| !self.retire(key)).count();
        tracing::info!(total, remaining, "bulk cleanup finished");
        remaining
    }
}

#[cfg(test)]
#[path = "terminate_tests.rs"]
mod tests;
