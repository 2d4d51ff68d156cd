// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded output capture.
//!
//! Children under observation can be arbitrarily noisy; capture is bounded
//! during accumulation, not just at reporting time. The buffer trims from
//! the front so the most recent output — the part that matters for startup
//! classification — is always retained.

/// Return the trailing `max_bytes` of `text`, respecting char boundaries.
pub fn tail(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut start = text.len() - max_bytes;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    text[start..].to_string()
}

/// Recency-preserving accumulation buffer for one detached invocation.
///
/// Holds combined stdout/stderr text while classification is pending and is
/// discarded once the observation race resolves.
#[derive(Debug)]
pub struct ObservationBuffer {
    buf: String,
    cap: usize,
}

impl ObservationBuffer {
    pub fn new(cap: usize) -> Self {
        Self { buf: String::new(), cap }
    }

    /// Append a chunk, trimming the oldest bytes once over capacity.
    pub fn push(&mut self, chunk: &str) {
        self.buf.push_str(chunk);
        if self.buf.len() > self.cap {
            let mut cut = self.buf.len() - self.cap;
            while !self.buf.is_char_boundary(cut) {
                cut += 1;
            }
            self.buf.drain(..cut);
        }
    }

    pub fn contents(&self) -> &str {
        &self.buf
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Trailing portion for reporting, independent of the capture cap.
    pub fn tail(&self, max_bytes: usize) -> String {
        tail(&self.buf, max_bytes)
    }
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
