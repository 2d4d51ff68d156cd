// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single entry point for the dispatch layer.
//!
//! `execute` covers both synchronous and detached modes via the request's
//! long-running flag; `retire`/`bulk_cleanup` cover termination. Only
//! malformed input surfaces as an `Err` — every process-level failure is
//! data in the outcome, forwarded unmodified to the caller.

use crate::registry::ProcessRegistry;
use crate::runner::CommandRunner;
use crate::supervise::DetachedSupervisor;
use crate::terminate::TerminationService;
use drover_core::{ExecOutcome, ExecRequest, RequestError};
use std::path::Path;

/// Facade bundling the runner, the detached supervisor, and termination
/// over one shared registry.
#[derive(Debug, Clone)]
pub struct ExecService {
    registry: ProcessRegistry,
    runner: CommandRunner,
    supervisor: DetachedSupervisor,
    terminator: TerminationService,
}

impl Default for ExecService {
    fn default() -> Self {
        Self::with_registry(ProcessRegistry::new())
    }
}

impl ExecService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build over an injected registry (shared with other components or a
    /// test harness).
    pub fn with_registry(registry: ProcessRegistry) -> Self {
        Self {
            runner: CommandRunner::new(),
            supervisor: DetachedSupervisor::new(registry.clone()),
            terminator: TerminationService::new(registry.clone()),
            registry,
        }
    }

    /// Replace the supervisor (tests inject short observation windows).
    pub fn with_supervisor(mut self, supervisor: DetachedSupervisor) -> Self {
        self.supervisor = supervisor;
        self
    }

    /// Run one request to a classified outcome.
    pub async fn execute(&self, request: ExecRequest) -> Result<ExecOutcome, RequestError> {
        request.validate()?;

        tracing::info!(
            workdir = %request.workdir.display(),
            command = %request.command_line(),
            long_running = request.long_running,
            "executing request"
        );
        let start = std::time::Instant::now();

        let outcome = if request.long_running {
            self.supervisor.start(&request.workdir, &request.program, &request.args).await
        } else {
            self.runner
                .execute(&request.workdir, &request.program, &request.args, request.timeout)
                .await
        };

        tracing::info!(
            workdir = %request.workdir.display(),
            classification = %outcome.classification,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "request resolved"
        );
        Ok(outcome)
    }

    /// Retire the tracked process for `key`, if any. Never raises.
    pub fn retire(&self, key: &Path) {
        self.terminator.retire(key);
    }

    /// Retire every tracked process; returns how many could not be
    /// confirmed cleared.
    pub fn bulk_cleanup(&self) -> usize {
        self.terminator.bulk_cleanup()
    }

    pub fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
