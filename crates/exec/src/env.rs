// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the exec crate.

use std::time::Duration;

/// Default budget for a bounded synchronous run.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_millis(120_000);

/// Default observation window for detached startup classification.
pub const DEFAULT_OBSERVE_WINDOW: Duration = Duration::from_millis(30_000);

/// Default size of the stdout/stderr tails reported in outcomes.
pub const DEFAULT_TAIL_BYTES: usize = 4096;

/// Default cap on output captured during the observation window.
pub const DEFAULT_CAPTURE_CAP_BYTES: usize = 64 * 1024;

/// Bounded-run timeout (default 120s, configurable via `DROVER_COMMAND_TIMEOUT_MS`).
pub fn command_timeout() -> Duration {
    std::env::var("DROVER_COMMAND_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_COMMAND_TIMEOUT)
}

/// Observation window (default 30s, configurable via `DROVER_OBSERVE_WINDOW_MS`).
pub fn observe_window() -> Duration {
    std::env::var("DROVER_OBSERVE_WINDOW_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_OBSERVE_WINDOW)
}

/// Reported tail size override
pub fn tail_bytes() -> usize {
    std::env::var("DROVER_TAIL_BYTES")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_TAIL_BYTES)
}

/// Observation capture cap override
pub fn capture_cap_bytes() -> usize {
    std::env::var("DROVER_CAPTURE_CAP_BYTES")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_CAPTURE_CAP_BYTES)
}
