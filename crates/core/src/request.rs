// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution request and up-front validation.
//!
//! An `ExecRequest` describes one command invocation inside a workspace.
//! It is built by the dispatch layer and consumed once; everything the
//! supervisor needs to know about the call is carried here.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Rejections raised before any process is spawned.
///
/// These are the only errors the supervisor surfaces synchronously; every
/// process-level failure is returned as data in an [`crate::ExecOutcome`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("program name is empty")]
    EmptyProgram,
    #[error("working directory is not absolute: {0}")]
    RelativeWorkdir(String),
}

/// One command invocation: working directory, program, arguments, and mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecRequest {
    /// Absolute path of the workspace the command runs in. Doubles as the
    /// registry key for long-running invocations.
    pub workdir: PathBuf,
    /// Program name, resolved against PATH by the spawn primitive.
    pub program: String,
    /// Ordered argument list, passed through verbatim.
    #[serde(default)]
    pub args: Vec<String>,
    /// When set, the command is expected to run indefinitely and is handled
    /// by the detached supervisor instead of the bounded runner.
    #[serde(default)]
    pub long_running: bool,
    /// Optional override of the bounded runner's timeout. Ignored for
    /// long-running invocations, whose observation window is fixed.
    #[serde(default)]
    pub timeout: Option<Duration>,
}

impl ExecRequest {
    pub fn new(workdir: impl Into<PathBuf>, program: impl Into<String>) -> Self {
        Self {
            workdir: workdir.into(),
            program: program.into(),
            args: Vec::new(),
            long_running: false,
            timeout: None,
        }
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn long_running(mut self, long_running: bool) -> Self {
        self.long_running = long_running;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reject malformed requests before anything is spawned.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.program.trim().is_empty() {
            return Err(RequestError::EmptyProgram);
        }
        if !self.workdir.is_absolute() {
            return Err(RequestError::RelativeWorkdir(self.workdir.display().to_string()));
        }
        Ok(())
    }

    /// Full command text for logging and registry records.
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            return self.program.clone();
        }
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
