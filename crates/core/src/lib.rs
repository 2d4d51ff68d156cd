// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! drover-core: Shared data model for the drover process supervisor.
//!
//! Execution requests, classified outcomes, and the bounded output-capture
//! types shared between the command runner and the detached supervisor.

pub mod macros;

pub mod capture;
pub mod outcome;
pub mod request;

pub use capture::{tail, ObservationBuffer};
pub use outcome::{Classification, ExecOutcome};
pub use request::{ExecRequest, RequestError};
