// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-keyed table of live detached processes.
//!
//! Invariant: at most one record per key at any instant. The registry itself
//! does not enforce retire-before-register ordering — that is the
//! supervisor's job (see [`crate::supervise`]); `register` overwrites any
//! prior entry unconditionally. All mutation is serialized by the mutex.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One tracked detached process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// OS process id. Identity is tracked by pid, not mere liveness.
    pub pid: u32,
    /// Originating command text, for diagnostics.
    pub command: String,
}

/// Cloneable, injectable handle over the process table.
///
/// Mutation must route through [`crate::TerminationService`] and
/// [`crate::DetachedSupervisor`]; direct callers only look things up.
#[derive(Debug, Clone, Default)]
pub struct ProcessRegistry {
    inner: Arc<Mutex<HashMap<PathBuf, ProcessRecord>>>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record for `key`, overwriting any prior entry.
    pub fn register(&self, key: &Path, record: ProcessRecord) {
        self.inner.lock().insert(key.to_path_buf(), record);
    }

    /// Remove the record for `key`. Idempotent.
    pub fn remove(&self, key: &Path) -> Option<ProcessRecord> {
        self.inner.lock().remove(key)
    }

    /// Remove the record for `key` only if it still holds `pid`.
    ///
    /// Guards late-exit bookkeeping against deleting a different process
    /// that has since replaced the exited one at the same key.
    pub fn remove_if_pid(&self, key: &Path, pid: u32) -> bool {
        let mut table = self.inner.lock();
        if table.get(key).is_some_and(|r| r.pid == pid) {
            table.remove(key);
            return true;
        }
        false
    }

    pub fn get(&self, key: &Path) -> Option<ProcessRecord> {
        self.inner.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &Path) -> bool {
        self.inner.lock().contains_key(key)
    }

    /// Snapshot of all registered keys, for bulk cleanup.
    pub fn keys(&self) -> Vec<PathBuf> {
        self.inner.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
