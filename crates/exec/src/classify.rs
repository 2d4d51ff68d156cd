// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup classification heuristics for detached runs.
//!
//! Two independent signals over captured output: a case-insensitive scan
//! for known readiness phrases, and port extraction from common address
//! shapes. Either one confirms startup. This is a best-effort heuristic
//! over text, not a readiness probe.

use regex::Regex;
use std::sync::LazyLock;

/// Phrases dev servers and build tools print once they are serving.
const READY_PHRASES: &[&str] = &[
    "listening on",
    "listening at",
    "compiled successfully",
    "server started",
    "server running",
    "server is running",
    "started server",
    "ready in",
    "ready on",
    "running at",
    "running on",
    "development server",
    "accepting connections",
    "serving on",
    "serving at",
    "bound to",
    "watching for file changes",
];

/// `host:port` shapes: `localhost:3000`, `127.0.0.1:8080`,
/// `http://0.0.0.0:4000`, `[::1]:9090`.
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static ADDR_PORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:https?://)?(?:localhost|\d{1,3}(?:\.\d{1,3}){3}|\[[0-9a-f:.]+\]):(\d{2,5})")
        .expect("constant regex pattern is valid")
});

/// Prose shape: "on port 4321".
#[allow(clippy::expect_used)]
static ON_PORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bon port\s+(\d{2,5})\b").expect("constant regex pattern is valid")
});

/// Case-insensitive readiness-phrase scan.
pub fn startup_confirmed(text: &str) -> bool {
    let lower = text.to_lowercase();
    READY_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Extract a bound port from startup output, if one is announced.
pub fn detect_port(text: &str) -> Option<String> {
    ON_PORT
        .captures(text)
        .or_else(|| ADDR_PORT.captures(text))
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
